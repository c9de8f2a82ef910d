//! Repository error taxonomy
//!
//! Absence is not an error: `fetch` and `dequeue` return `None`. Lost dequeue
//! races never surface here either.

use std::fmt;

use docrepo_storage::StorageError;
use thiserror::Error;

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Resource family an operation acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Citation,
    Document,
    Type,
    Draft,
    Queue,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Citation => "citation",
            ResourceKind::Document => "document",
            ResourceKind::Type => "type",
            ResourceKind::Draft => "draft",
            ResourceKind::Queue => "queue",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the repository contract
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Write-once identifier is already taken
    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: ResourceKind, id: String },

    /// A committed document already uses the draft identifier
    #[error("draft '{id}' is already committed as a document")]
    AlreadyCommitted { id: String },

    /// Backend unreachable or failing
    #[error("{operation} {kind} '{id}' failed: {source}")]
    Transport {
        operation: &'static str,
        kind: ResourceKind,
        id: String,
        #[source]
        source: StorageError,
    },

    /// The request cannot be expressed against the backend
    #[error("malformed {kind} request for '{id}': {reason}")]
    MalformedRequest {
        kind: ResourceKind,
        id: String,
        reason: String,
    },

    /// The backend answered with something that cannot be interpreted
    #[error("malformed {kind} response for '{id}': {reason}")]
    MalformedResponse {
        kind: ResourceKind,
        id: String,
        reason: String,
    },
}

impl RepositoryError {
    /// Create an already-exists error
    pub fn already_exists(kind: ResourceKind, id: impl ToString) -> Self {
        Self::AlreadyExists {
            kind,
            id: id.to_string(),
        }
    }

    /// Create an already-committed error
    pub fn already_committed(id: impl ToString) -> Self {
        Self::AlreadyCommitted { id: id.to_string() }
    }

    /// Create a malformed-response error
    pub fn malformed_response(kind: ResourceKind, id: impl ToString, reason: impl ToString) -> Self {
        Self::MalformedResponse {
            kind,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Attach operation context to a backend failure
    ///
    /// Invalid keys and rejected requests become [`Self::MalformedRequest`],
    /// unreadable responses [`Self::MalformedResponse`], everything else
    /// [`Self::Transport`].
    pub fn from_storage(
        operation: &'static str,
        kind: ResourceKind,
        id: impl ToString,
        source: StorageError,
    ) -> Self {
        let id = id.to_string();
        match source {
            StorageError::InvalidKey { key } => Self::MalformedRequest {
                kind,
                id,
                reason: format!("invalid key '{key}'"),
            },
            StorageError::BadRequest { message, .. } => Self::MalformedRequest {
                kind,
                id,
                reason: message,
            },
            StorageError::MalformedResponse(reason) => Self::MalformedResponse { kind, id, reason },
            source => Self::Transport {
                operation,
                kind,
                id,
                source,
            },
        }
    }

    /// Whether the caller can recover by choosing another identifier
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. } | Self::AlreadyCommitted { .. })
    }
}
