//! Object-store storage backend
//!
//! Maps backend keys onto object names inside a bucket. The SDK specifics
//! live behind [`ObjectClient`].

use async_trait::async_trait;

use crate::{AccessMode, Result, StorageBackend};

/// Minimal object-store client
///
/// Implementations wrap a concrete SDK. `delete` must be conditional on the
/// object still existing (e.g. an `If-Match` on the current ETag) so that at
/// most one concurrent caller observes `true`.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Whether the object exists
    async fn head(&self, object: &str) -> Result<bool>;

    /// Object body, `None` when the object does not exist
    async fn get(&self, object: &str) -> Result<Option<Vec<u8>>>;

    /// Upload an object
    ///
    /// With `create_only` the upload must fail with
    /// [`crate::StorageError::KeyExists`] when the object is already present.
    async fn put(&self, object: &str, body: Vec<u8>, create_only: bool) -> Result<()>;

    /// Remove the object, returning whether this call removed it
    async fn delete(&self, object: &str) -> Result<bool>;

    /// Names of the objects starting with `prefix`
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// [`StorageBackend`] over an [`ObjectClient`]
///
/// Every key is stored under an optional name prefix, which lets several
/// repositories share one bucket.
pub struct ObjectStoreBackend<C> {
    client: C,
    prefix: String,
}

impl<C: ObjectClient> ObjectStoreBackend<C> {
    /// Store keys at the top level of the bucket
    pub fn new(client: C) -> Self {
        Self {
            client,
            prefix: String::new(),
        }
    }

    /// Store keys under `prefix`
    pub fn with_prefix(client: C, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { client, prefix }
    }

    /// Underlying client
    pub fn client(&self) -> &C {
        &self.client
    }

    fn object_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl<C: ObjectClient> StorageBackend for ObjectStoreBackend<C> {
    fn name(&self) -> &'static str {
        "object-store"
    }

    async fn key_exists(&self, key: &str) -> Result<bool> {
        self.client.head(&self.object_name(key)).await
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.client.get(&self.object_name(key)).await
    }

    async fn write(&self, key: &str, bytes: &[u8], mode: AccessMode) -> Result<()> {
        self.client
            .put(&self.object_name(key), bytes.to_vec(), mode == AccessMode::ReadOnly)
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.client.delete(&self.object_name(key)).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let objects = self.client.list(&self.object_name(prefix)).await?;
        Ok(objects
            .into_iter()
            .filter_map(|name| name.strip_prefix(&self.prefix).map(str::to_string))
            .collect())
    }
}
