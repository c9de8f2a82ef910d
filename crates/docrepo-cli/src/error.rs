// CLI error types

use docrepo_config::ConfigError;
use docrepo_core::RepositoryError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!("Invalid argument: {message}\n\nRun 'docrepo --help' for usage information.")
            }
            CliError::NotFound(what) => format!("{what} not found"),
            CliError::Io(e) => format!("File operation failed: {e}"),
            CliError::Config(e) => {
                format!("Configuration error: {e}\n\nRun 'docrepo config' to check the resolved configuration.")
            }
            CliError::Repository(e) if e.is_conflict() => format!("Refused: {e}"),
            CliError::Repository(e) => format!("Repository error: {e}"),
        }
    }

    /// Process exit code for this error
    ///
    /// Absent records and empty queues exit with 2 so scripts can tell them
    /// apart from failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound(_) => 2,
            CliError::Repository(e) if e.is_conflict() => 3,
            _ => 1,
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
