//! Storage error types

use thiserror::Error;

/// Result type for backend primitives
pub type Result<T> = std::result::Result<T, StorageError>;

/// Backend primitive failures
///
/// Absence is never an error: `read` and `key_exists` report it through
/// their return values.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Unexpected status {status} for '{key}': {message}")]
    Status {
        key: String,
        status: u16,
        message: String,
    },

    #[error("Request rejected for '{key}': {message}")]
    BadRequest { key: String, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Key already exists: {key}")]
    KeyExists { key: String },

    #[error("Invalid key: '{key}'")]
    InvalidKey { key: String },
}

impl StorageError {
    /// Wrap an IO error with the key it happened on
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }

    /// Create a key-exists error
    pub fn key_exists(key: impl Into<String>) -> Self {
        Self::KeyExists { key: key.into() }
    }

    /// Create an invalid key error
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into() }
    }
}
