//! Cache-related error types

use thiserror::Error;

/// Cache construction errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid cache capacity: {capacity} (must be at least 1)")]
    InvalidCapacity { capacity: usize },
}

/// Re-export commonly used Result type
pub type Result<T> = std::result::Result<T, CacheError>;
