//! Shared Module
//!
//! Cross-cutting concerns used by the resource handlers.

pub mod error;
pub mod api_common;
pub mod health_api;

pub use error::{ApiError, ErrorKind, Result};
pub use api_common::json_array_response;
pub use health_api::{health_router, HealthState};
