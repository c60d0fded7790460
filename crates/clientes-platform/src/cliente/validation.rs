//! Create-payload validation
//!
//! Each field reports at most one violation, in declaration order.

use std::fmt;

use super::api::ClienteRequest;
use super::entity::Cliente;

pub const MUST_NOT_BE_EMPTY: &str = "must not be empty";
pub const MUST_NOT_BE_NULL: &str = "must not be null";
pub const MUST_NOT_BE_NEGATIVE: &str = "must be greater than or equal to 0";

/// A single invalid field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field {}: {}", self.field, self.message)
    }
}

fn not_empty(field: &'static str, value: &Option<String>, errors: &mut Vec<FieldError>) -> Option<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Some(text.clone()),
        _ => {
            errors.push(FieldError::new(field, MUST_NOT_BE_EMPTY));
            None
        }
    }
}

fn non_negative_int(field: &'static str, value: Option<i32>, errors: &mut Vec<FieldError>) -> Option<i32> {
    match value {
        Some(n) if n >= 0 => Some(n),
        Some(_) => {
            errors.push(FieldError::new(field, MUST_NOT_BE_NEGATIVE));
            None
        }
        None => {
            errors.push(FieldError::new(field, MUST_NOT_BE_NULL));
            None
        }
    }
}

fn non_negative_decimal(field: &'static str, value: Option<f64>, errors: &mut Vec<FieldError>) -> Option<f64> {
    match value {
        Some(x) if x.is_finite() && x >= 0.0 => Some(x),
        Some(_) => {
            errors.push(FieldError::new(field, MUST_NOT_BE_NEGATIVE));
            None
        }
        None => {
            errors.push(FieldError::new(field, MUST_NOT_BE_NULL));
            None
        }
    }
}

/// Check a create payload and build the unsaved cliente from it.
///
/// Any `id` in the payload is ignored; the store assigns one.
pub fn validate_new_cliente(req: &ClienteRequest) -> Result<Cliente, Vec<FieldError>> {
    let mut errors = Vec::new();

    let nombre = not_empty("nombre", &req.nombre, &mut errors);
    let apellido = not_empty("apellido", &req.apellido, &mut errors);
    let edad = non_negative_int("edad", req.edad, &mut errors);
    let sueldo = non_negative_decimal("sueldo", req.sueldo, &mut errors);

    match (nombre, apellido, edad, sueldo) {
        (Some(nombre), Some(apellido), Some(edad), Some(sueldo)) => {
            Ok(Cliente::new(nombre, apellido, edad, sueldo))
        }
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(nombre: Option<&str>, apellido: Option<&str>, edad: Option<i32>, sueldo: Option<f64>) -> ClienteRequest {
        ClienteRequest {
            id: None,
            nombre: nombre.map(String::from),
            apellido: apellido.map(String::from),
            edad,
            sueldo,
        }
    }

    fn messages(errors: Vec<FieldError>) -> Vec<String> {
        errors.into_iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_valid_payload() {
        let cliente = validate_new_cliente(&request(Some("Ana"), Some("Diaz"), Some(30), Some(1500.50))).unwrap();
        assert_eq!(cliente, Cliente::new("Ana", "Diaz", 30, 1500.50));
    }

    #[test]
    fn test_payload_id_is_dropped() {
        let mut req = request(Some("Ana"), Some("Diaz"), Some(0), Some(0.0));
        req.id = Some("client-chosen".to_string());
        assert!(validate_new_cliente(&req).unwrap().id.is_none());
    }

    #[test]
    fn test_empty_payload_reports_every_field() {
        let errors = validate_new_cliente(&request(None, None, None, None)).unwrap_err();
        assert_eq!(
            messages(errors),
            vec![
                "Field nombre: must not be empty",
                "Field apellido: must not be empty",
                "Field edad: must not be null",
                "Field sueldo: must not be null",
            ]
        );
    }

    #[test]
    fn test_blank_and_negative_values() {
        let errors = validate_new_cliente(&request(Some("   "), Some("Diaz"), Some(-1), Some(-0.5))).unwrap_err();
        assert_eq!(
            messages(errors),
            vec![
                "Field nombre: must not be empty",
                "Field edad: must be greater than or equal to 0",
                "Field sueldo: must be greater than or equal to 0",
            ]
        );
    }

    #[test]
    fn test_field_error_display() {
        assert_eq!(FieldError::new("body", "bad json").to_string(), "Field body: bad json");
    }
}
