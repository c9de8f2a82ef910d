//! In-memory storage backend
//!
//! Process-local backend for tests and ephemeral repositories.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{AccessMode, Result, StorageBackend, StorageError};

#[derive(Debug, Clone)]
struct StoredValue {
    bytes: Vec<u8>,
    mode: AccessMode,
}

/// Thread-safe in-memory implementation of [`StorageBackend`]
///
/// Uses an ordered map behind a RwLock so prefix listing is a range scan.
/// Read-only values are never replaced; the existence check and the insert
/// happen under one write lock.
///
/// # Example
///
/// ```ignore
/// use docrepo_storage::{MemoryBackend, StorageBackend, AccessMode};
///
/// let backend = MemoryBackend::new();
/// backend.write("drafts/a/1.json", b"hi\n", AccessMode::Updatable).await?;
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, StoredValue>>,
}

impl MemoryBackend {
    /// Create a new empty backend
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored keys (for testing)
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is stored (for testing)
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Access mode a key was written with (for testing)
    pub fn mode_of(&self, key: &str) -> Option<AccessMode> {
        self.entries.read().get(key).map(|value| value.mode)
    }

    /// Drop every stored key (for testing)
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn key_exists(&self, key: &str) -> Result<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).map(|value| value.bytes.clone()))
    }

    async fn write(&self, key: &str, bytes: &[u8], mode: AccessMode) -> Result<()> {
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(key) {
            if mode == AccessMode::ReadOnly || existing.mode == AccessMode::ReadOnly {
                return Err(StorageError::key_exists(key));
            }
        }
        entries.insert(
            key.to_string(),
            StoredValue {
                bytes: bytes.to_vec(),
                mode,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.read();
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
