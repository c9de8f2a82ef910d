//! Credentials attached to remote repository requests

use async_trait::async_trait;

use crate::Result;

/// Header carrying the repository credential
pub const CREDENTIAL_HEADER: &str = "x-repository-credential";

/// Source of the credential sent with every remote request
///
/// Asked once per request so rotating tokens are picked up without
/// rebuilding the backend.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credential(&self) -> Result<String>;
}

/// A credential fixed at construction time
#[derive(Clone)]
pub struct StaticCredential {
    value: String,
}

impl StaticCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredential")
            .field("value", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn credential(&self) -> Result<String> {
        Ok(self.value.clone())
    }
}
