//! API Error Types
//!
//! Every failure a handler can produce is an `ApiError`; the mapping to an
//! HTTP response happens once, in `IntoResponse`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation failed: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(mongodb::error::Error),

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(mongodb::error::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Coarse classification of an `ApiError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    ValidationFailed,
    PersistenceUnavailable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ErrorKind::PersistenceUnavailable => "PERSISTENCE_UNAVAILABLE",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl ApiError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn validation<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Validation {
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Validation { .. } => ErrorKind::ValidationFailed,
            ApiError::PersistenceUnavailable(_) => ErrorKind::PersistenceUnavailable,
            ApiError::Serialization(_) | ApiError::Json(_) | ApiError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorKind::PersistenceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<mongodb::error::Error> for ApiError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind as MongoKind;

        match err.kind.as_ref() {
            MongoKind::BsonDeserialization(_) | MongoKind::BsonSerialization(_) => Self::Serialization(err),
            _ => Self::PersistenceUnavailable(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Body of a 400 answer to an invalid create payload
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub status: u16,
}

/// Body of every 5xx answer
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            // Not-found answers carry no body
            ApiError::NotFound { ref entity_type, ref id } => {
                tracing::debug!(entity_type = %entity_type, id = %id, "Entity not found");
                status.into_response()
            }
            ApiError::Validation { errors } => {
                tracing::info!(error_count = errors.len(), "Rejected invalid payload");
                let body = ValidationErrorResponse {
                    errors,
                    timestamp: Utc::now(),
                    status: status.as_u16(),
                };
                (status, Json(body)).into_response()
            }
            other => {
                tracing::error!(kind = other.kind().as_str(), error = %other, "Request failed");
                let body = ErrorResponse {
                    kind: other.kind(),
                    message: other.to_string(),
                    timestamp: Utc::now(),
                    status: status.as_u16(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::not_found("Cliente", "x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::validation(["Field nombre: must not be empty"]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::internal("boom").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_message_joins_errors() {
        let err = ApiError::validation(["a", "b"]);
        assert_eq!(err.to_string(), "Validation failed: a; b");
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn test_undecodable_document_is_internal() {
        let decode = bson::from_document::<crate::Cliente>(bson::doc! { "nombre": 5 }).unwrap_err();
        let err = ApiError::from(mongodb::error::Error::from(decode));

        assert!(matches!(err, ApiError::Serialization(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unencodable_document_is_internal() {
        let encode = bson::to_document(&[1, 2, 3]).unwrap_err();
        let err = ApiError::from(mongodb::error::Error::from(encode));

        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_io_failure_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ApiError::from(mongodb::error::Error::from(io));

        assert_eq!(err.kind(), ErrorKind::PersistenceUnavailable);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_kind_serialization() {
        let kind = serde_json::to_string(&ErrorKind::PersistenceUnavailable).unwrap();
        assert_eq!(kind, "\"PERSISTENCE_UNAVAILABLE\"");
        assert_eq!(ErrorKind::Internal.as_str(), "INTERNAL");
    }
}
