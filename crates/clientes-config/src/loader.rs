//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "clientes.toml",
    "./config/config.toml",
    "./config/clientes.toml",
    "/etc/clientes/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("CLIENTES_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `CLIENTES_*` overrides read through `lookup`.
///
/// Unparseable numeric or boolean values are ignored; an unknown storage
/// backend is an error.
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(port) = lookup("CLIENTES_HTTP_PORT").and_then(|v| v.parse().ok()) {
        config.http.port = port;
    }
    if let Some(val) = lookup("CLIENTES_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("CLIENTES_CORS_ORIGINS") {
        config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
    }

    // MongoDB
    if let Some(val) = lookup("CLIENTES_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("CLIENTES_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }
    if let Some(val) = lookup("CLIENTES_MONGODB_COLLECTION") {
        config.mongodb.collection = val;
    }
    if let Some(size) = lookup("CLIENTES_MONGODB_BATCH_SIZE").and_then(|v| v.parse().ok()) {
        config.mongodb.batch_size = size;
    }

    // Storage
    if let Some(val) = lookup("CLIENTES_STORAGE_BACKEND") {
        config.storage.backend = val.parse()?;
    }

    // API
    if let Some(flag) = lookup("CLIENTES_UPDATE_STATUS_CREATED").and_then(|v| v.parse().ok()) {
        config.api.update_status_created = flag;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageBackend;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        let lookup = lookup_from(&[
            ("CLIENTES_HTTP_PORT", "9091"),
            ("CLIENTES_CORS_ORIGINS", "http://a.test, http://b.test"),
            ("CLIENTES_MONGODB_DATABASE", "clientes_db"),
            ("CLIENTES_STORAGE_BACKEND", "memory"),
            ("CLIENTES_UPDATE_STATUS_CREATED", "false"),
        ]);

        apply_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.http.port, 9091);
        assert_eq!(config.http.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.mongodb.database, "clientes_db");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(!config.api.update_status_created);
    }

    #[test]
    fn test_bad_numbers_ignored() {
        let mut config = AppConfig::default();
        apply_overrides(&mut config, lookup_from(&[("CLIENTES_HTTP_PORT", "eighty")])).unwrap();
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn test_batch_size_override() {
        let mut config = AppConfig::default();
        apply_overrides(&mut config, lookup_from(&[("CLIENTES_MONGODB_BATCH_SIZE", "25")])).unwrap();
        assert_eq!(config.mongodb.batch_size, 25);
    }

    #[test]
    fn test_bad_backend_is_error() {
        let mut config = AppConfig::default();
        let result = apply_overrides(&mut config, lookup_from(&[("CLIENTES_STORAGE_BACKEND", "sqlite")]));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clientes.toml");
        std::fs::write(&path, "[mongodb]\ncollection = \"customers\"\n").unwrap();

        let config = ConfigLoader::with_path(&path).load().unwrap();
        assert_eq!(config.mongodb.collection, "customers");
    }
}
