//! Clientes Common
//!
//! Cross-cutting helpers shared by the library crates and the server binary.

pub mod logging;

pub use logging::{init_logging, LogFormat};
