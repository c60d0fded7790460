//! Clientes API Configuration
//!
//! TOML-based configuration with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub mongodb: MongoConfig,
    pub storage: StorageConfig,
    pub api: ApiConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    /// Allowed CORS origins. `*` allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl HttpConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    /// Cursor batch size used when streaming the list endpoint
    pub batch_size: u32,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "webflux".to_string(),
            collection: "clientes".to_string(),
            batch_size: 100,
        }
    }
}

/// Which persistence backend serves the clientes collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mongodb,
    Memory,
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::Mongodb
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Self::Mongodb),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(ConfigError::ValidationError(format!(
                "unknown storage backend '{}'", other
            ))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// REST API behaviour switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Answer a successful PUT with 201 Created instead of 200 OK
    pub update_status_created: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            update_status_created: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::ValidationError("http.port must be non-zero".to_string()));
        }
        if self.storage.backend == StorageBackend::Mongodb {
            if self.mongodb.database.trim().is_empty() {
                return Err(ConfigError::ValidationError("mongodb.database must not be empty".to_string()));
            }
            if self.mongodb.collection.trim().is_empty() {
                return Err(ConfigError::ValidationError("mongodb.collection must not be empty".to_string()));
            }
            if self.mongodb.batch_size == 0 {
                return Err(ConfigError::ValidationError("mongodb.batch_size must be non-zero".to_string()));
            }
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Clientes API Configuration
# Environment variables (CLIENTES_*) override these settings

[http]
port = 8080
host = "0.0.0.0"
cors_origins = ["*"]

[mongodb]
uri = "mongodb://localhost:27017"
database = "webflux"
collection = "clientes"
batch_size = 100

[storage]
backend = "mongodb"  # mongodb or memory

[api]
update_status_created = true
"#
        .to_string()
    }
}
