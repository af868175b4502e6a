//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Which persistence backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Single JSON document on disk
    File,
    /// PostgreSQL with store-enforced unique constraints
    Postgres,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Selected persistence backend
    pub backend: StoreBackend,

    /// Path of the JSON document (file backend)
    pub data_path: PathBuf,

    /// Database connection URL (postgres backend)
    pub database_url: Option<String>,

    /// Maximum database connections in pool
    pub database_max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "file".to_string())
            .as_str()
        {
            "file" => StoreBackend::File,
            "postgres" => StoreBackend::Postgres,
            _ => return Err(ConfigError::InvalidValue("STORE_BACKEND")),
        };

        let data_path = env::var("DATA_PATH")
            .unwrap_or_else(|_| "data/db.json".to_string())
            .into();

        let database_url = env::var("DATABASE_URL").ok();
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnv("DATABASE_URL"));
        }

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        Ok(Self {
            host,
            port,
            backend,
            data_path,
            database_url,
            database_max_connections,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
