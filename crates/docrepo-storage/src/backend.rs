//! The storage backend trait

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Write permission hint attached to every stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMode {
    /// Write-once records: citations, documents, types
    ReadOnly,
    /// Records that may be overwritten or removed: drafts, queue messages
    Updatable,
}

impl AccessMode {
    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "read-only",
            AccessMode::Updatable => "updatable",
        }
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive key operations every backend exposes
///
/// Keys are opaque `/`-separated strings produced by [`crate::keys`].
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Check whether a value is stored under `key`
    async fn key_exists(&self, key: &str) -> Result<bool>;

    /// Read the value stored under `key`, `None` when absent
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `bytes` under `key`
    ///
    /// Backends that enforce [`AccessMode::ReadOnly`] refuse to replace an
    /// existing value and report [`crate::StorageError::KeyExists`]. Others
    /// may ignore the hint.
    async fn write(&self, key: &str, bytes: &[u8], mode: AccessMode) -> Result<()>;

    /// Remove the value under `key`
    ///
    /// Returns `true` only for the caller that actually removed a present
    /// value. Among concurrent deleters of one key at most one sees `true`.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// List the keys currently stored under `prefix`
    ///
    /// Values still being written are never listed.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn key_exists(&self, key: &str) -> Result<bool> {
        (**self).key_exists(key).await
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, bytes: &[u8], mode: AccessMode) -> Result<()> {
        (**self).write(key, bytes, mode).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).list(prefix).await
    }
}
