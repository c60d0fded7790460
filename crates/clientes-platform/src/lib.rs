//! Clientes Platform
//!
//! A single REST resource, `/api/clientes`, over a document collection:
//! - List (streamed), get, create, update and delete
//! - Field validation of create payloads
//! - MongoDB and in-memory persistence services
//! - One error taxonomy mapped to responses in one place
//! - Health checks

pub mod cliente;
pub mod shared;

pub use cliente::{
    clientes_router, Cliente, ClienteService, ClientesState, InMemoryClienteService,
    MongoClienteService, CLIENTES_PATH,
};
pub use shared::error::{ApiError, ErrorKind, Result};
pub use shared::health_api::{health_router, HealthState};
