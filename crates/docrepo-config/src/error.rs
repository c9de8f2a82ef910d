//! Configuration error types

use thiserror::Error;

/// Configuration result type
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to open backend: {0}")]
    Backend(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<docrepo_cache::CacheError> for ConfigError {
    fn from(err: docrepo_cache::CacheError) -> Self {
        ConfigError::Validation(err.to_string())
    }
}

impl From<docrepo_http::HttpError> for ConfigError {
    fn from(err: docrepo_http::HttpError) -> Self {
        ConfigError::Backend(err.to_string())
    }
}
