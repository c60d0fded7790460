//! Cliente Aggregate
//!
//! The clientes REST resource and its persistence service.

pub mod entity;
pub mod repository;
pub mod memory;
pub mod validation;
pub mod api;

// Re-export main types
pub use entity::Cliente;
pub use repository::{ClienteService, ClienteStream, MongoClienteService};
pub use memory::InMemoryClienteService;
pub use validation::FieldError;
pub use api::{clientes_router, ClientesState, CLIENTES_PATH};
