//! Clientes API
//!
//! REST endpoints for the clientes resource.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::Cliente;
use super::repository::ClienteService;
use super::validation::{validate_new_cliente, FieldError};
use crate::shared::api_common::json_array_response;
use crate::shared::error::{ApiError, ValidationErrorResponse};

/// Mount point of the resource, also the base of `Location` headers
pub const CLIENTES_PATH: &str = "/api/clientes";

/// Fixed confirmation text of a successful create
pub const CREATED_MESSAGE: &str = "Cliente guardado con exito";

const ENTITY: &str = "Cliente";

/// Cliente payload for create and update.
///
/// Every field is optional on the wire: create validates presence,
/// update only overwrites the fields that are present.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ClienteRequest {
    /// Ignored; identifiers are assigned by the server
    pub id: Option<String>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub edad: Option<i32>,
    pub sueldo: Option<f64>,
}

/// Cliente as returned to callers
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClienteResponse {
    pub id: String,
    pub nombre: String,
    pub apellido: String,
    pub edad: i32,
    pub sueldo: f64,
}

impl From<Cliente> for ClienteResponse {
    fn from(c: Cliente) -> Self {
        Self {
            id: c.id.unwrap_or_default(),
            nombre: c.nombre,
            apellido: c.apellido,
            edad: c.edad,
            sueldo: c.sueldo,
        }
    }
}

/// Response view of a saved cliente; the store must have assigned an id
fn persisted(cliente: Cliente) -> Result<ClienteResponse, ApiError> {
    if !cliente.is_persisted() {
        return Err(ApiError::internal("store returned a cliente without id"));
    }
    Ok(cliente.into())
}

/// Body of a successful create
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedClienteResponse {
    pub cliente: ClienteResponse,
    pub mensaje: String,
    pub timestamp: DateTime<Utc>,
}

/// Clientes service state
#[derive(Clone)]
pub struct ClientesState {
    pub service: Arc<dyn ClienteService>,
    /// Status of a successful update
    pub update_status: StatusCode,
}

impl ClientesState {
    pub fn new(service: Arc<dyn ClienteService>) -> Self {
        Self {
            service,
            update_status: StatusCode::CREATED,
        }
    }

    pub fn with_update_status_created(mut self, created: bool) -> Self {
        self.update_status = if created { StatusCode::CREATED } else { StatusCode::OK };
        self
    }
}

pub fn cliente_location(id: &str) -> String {
    format!("{}/{}", CLIENTES_PATH, id)
}

fn body_error(rejection: JsonRejection) -> ApiError {
    ApiError::validation([FieldError::new("body", rejection.body_text()).to_string()])
}

/// List clientes
///
/// The array is streamed as the store yields documents.
#[utoipa::path(
    get,
    path = "/api/clientes",
    tag = "clientes",
    operation_id = "listarClientes",
    responses(
        (status = 200, description = "All clientes", body = [ClienteResponse])
    )
)]
pub async fn list_clientes(
    State(state): State<ClientesState>,
) -> Result<Response, ApiError> {
    let clientes = state.service.find_all().await?;
    Ok(json_array_response(clientes.map(|item| item.map(ClienteResponse::from))))
}

/// Get cliente by ID
#[utoipa::path(
    get,
    path = "/api/clientes/{id}",
    tag = "clientes",
    operation_id = "verDetallesCliente",
    params(
        ("id" = String, Path, description = "Cliente ID")
    ),
    responses(
        (status = 200, description = "Cliente found", body = ClienteResponse),
        (status = 404, description = "Cliente not found")
    )
)]
pub async fn get_cliente(
    State(state): State<ClientesState>,
    Path(id): Path<String>,
) -> Result<Json<ClienteResponse>, ApiError> {
    let cliente = state.service.find_by_id(&id).await?
        .ok_or_else(|| ApiError::not_found(ENTITY, &id))?;

    Ok(Json(cliente.into()))
}

/// Create a new cliente
#[utoipa::path(
    post,
    path = "/api/clientes",
    tag = "clientes",
    operation_id = "guardarCliente",
    request_body = ClienteRequest,
    responses(
        (status = 201, description = "Cliente created", body = CreatedClienteResponse,
            headers(("Location" = String, description = "Path of the new cliente"))),
        (status = 400, description = "Validation error", body = ValidationErrorResponse)
    )
)]
pub async fn create_cliente(
    State(state): State<ClientesState>,
    payload: Result<Json<ClienteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(body_error)?;

    let cliente = validate_new_cliente(&req)
        .map_err(|errors| ApiError::validation(errors.iter().map(ToString::to_string)))?;

    let saved = persisted(state.service.save(cliente).await?)?;
    tracing::info!(cliente_id = %saved.id, "Cliente created");

    let location = cliente_location(&saved.id);
    let body = CreatedClienteResponse {
        cliente: saved,
        mensaje: CREATED_MESSAGE.to_string(),
        timestamp: Utc::now(),
    };

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(body)).into_response())
}

/// Update cliente
///
/// Overwrites nombre, apellido, edad and sueldo with the values present in
/// the payload. The identifier never changes.
#[utoipa::path(
    put,
    path = "/api/clientes/{id}",
    tag = "clientes",
    operation_id = "editarCliente",
    params(
        ("id" = String, Path, description = "Cliente ID")
    ),
    request_body = ClienteRequest,
    responses(
        (status = 201, description = "Cliente updated", body = ClienteResponse,
            headers(("Location" = String, description = "Path of the cliente"))),
        (status = 404, description = "Cliente not found")
    )
)]
pub async fn update_cliente(
    State(state): State<ClientesState>,
    Path(id): Path<String>,
    payload: Result<Json<ClienteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(body_error)?;

    let mut cliente = state.service.find_by_id(&id).await?
        .ok_or_else(|| ApiError::not_found(ENTITY, &id))?;

    if let Some(nombre) = req.nombre {
        cliente.nombre = nombre;
    }
    if let Some(apellido) = req.apellido {
        cliente.apellido = apellido;
    }
    if let Some(edad) = req.edad {
        cliente.edad = edad;
    }
    if let Some(sueldo) = req.sueldo {
        cliente.sueldo = sueldo;
    }

    let saved = persisted(state.service.save(cliente).await?)?;
    tracing::info!(cliente_id = %saved.id, "Cliente updated");

    let location = cliente_location(&saved.id);
    Ok((state.update_status, [(header::LOCATION, location)], Json(saved)).into_response())
}

/// Delete cliente
#[utoipa::path(
    delete,
    path = "/api/clientes/{id}",
    tag = "clientes",
    operation_id = "eliminarCliente",
    params(
        ("id" = String, Path, description = "Cliente ID")
    ),
    responses(
        (status = 204, description = "Cliente deleted"),
        (status = 404, description = "Cliente not found")
    )
)]
pub async fn delete_cliente(
    State(state): State<ClientesState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let cliente = state.service.find_by_id(&id).await?
        .ok_or_else(|| ApiError::not_found(ENTITY, &id))?;

    state.service.delete(&cliente).await?;
    tracing::info!(cliente_id = %id, "Cliente deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Create clientes router
pub fn clientes_router(state: ClientesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_clientes, create_cliente))
        .routes(routes!(get_cliente, update_cliente, delete_cliente))
        .with_state(state)
}
