//! The repository contract over any storage backend

use async_trait::async_trait;
use docrepo_storage::keys::{self, decode_record, encode_record, validate_key, validate_segment};
use docrepo_storage::{AccessMode, StorageBackend, StorageError};
use tracing::debug;
use uuid::Uuid;

use crate::error::{RepositoryError, ResourceKind, Result};
use crate::model::{Citation, CitationName, DocumentId, QueueName};
use crate::queue::{self, Dequeued};
use crate::repository::{
    CitationRepository, DocumentRepository, DraftRepository, QueueRepository, TypeRepository,
};

/// Implements every resource family on top of a [`StorageBackend`]
///
/// Identifiers are mapped to keys with [`docrepo_storage::keys`], so any two
/// repositories over the same backend see the same records. No locks are
/// taken here; atomicity comes from the backend primitives.
///
/// # Example
///
/// ```ignore
/// use docrepo_core::StorageRepository;
/// use docrepo_storage::MemoryBackend;
///
/// let repo = StorageRepository::new(MemoryBackend::new());
/// repo.create_document(&DocumentId::new("report", "v1"), "{}").await?;
/// ```
#[derive(Debug)]
pub struct StorageRepository<B> {
    backend: B,
}

impl<B: StorageBackend> StorageRepository<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Backend this repository writes to
    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn exists_at(&self, kind: ResourceKind, id: &str, key: &str) -> Result<bool> {
        checked(kind, id, key)?;
        self.backend
            .key_exists(key)
            .await
            .map_err(|e| RepositoryError::from_storage("exists", kind, id, e))
    }

    async fn load(&self, kind: ResourceKind, id: &str, key: &str) -> Result<Option<String>> {
        checked(kind, id, key)?;
        let Some(bytes) = self
            .backend
            .read(key)
            .await
            .map_err(|e| RepositoryError::from_storage("fetch", kind, id, e))?
        else {
            return Ok(None);
        };

        decode_record(bytes)
            .map(Some)
            .map_err(|e| RepositoryError::malformed_response(kind, id, e))
    }

    async fn store(
        &self,
        operation: &'static str,
        kind: ResourceKind,
        id: &str,
        key: &str,
        payload: &str,
        mode: AccessMode,
    ) -> Result<()> {
        match self.backend.write(key, &encode_record(payload), mode).await {
            Ok(()) => Ok(()),
            Err(StorageError::KeyExists { .. }) => Err(RepositoryError::already_exists(kind, id)),
            Err(e) => Err(RepositoryError::from_storage(operation, kind, id, e)),
        }
    }

    async fn create_record(&self, kind: ResourceKind, id: &str, key: &str, payload: &str) -> Result<()> {
        if self.exists_at(kind, id, key).await? {
            return Err(RepositoryError::already_exists(kind, id));
        }
        self.store("create", kind, id, key, payload, AccessMode::ReadOnly)
            .await?;
        debug!("Created {} {} on {}", kind, id, self.backend.name());
        Ok(())
    }
}

fn checked(kind: ResourceKind, id: &str, key: &str) -> Result<()> {
    validate_key(key).map_err(|e| RepositoryError::from_storage("validate", kind, id, e))
}

/// Display form of `id` once tag and version are each a single key segment
fn versioned_id(kind: ResourceKind, id: &DocumentId) -> Result<String> {
    let display = id.to_string();
    for part in [&id.tag, &id.version] {
        validate_segment(part)
            .map_err(|e| RepositoryError::from_storage("validate", kind, &display, e))?;
    }
    Ok(display)
}

fn queue_segment(queue: &QueueName) -> Result<()> {
    validate_segment(queue.as_str()).map_err(|e| {
        RepositoryError::from_storage("validate", ResourceKind::Queue, queue.as_str(), e)
    })
}

#[async_trait]
impl<B: StorageBackend> CitationRepository for StorageRepository<B> {
    async fn citation_exists(&self, name: &CitationName) -> Result<bool> {
        let key = keys::citation_key(name.as_str());
        self.exists_at(ResourceKind::Citation, name.as_str(), &key).await
    }

    async fn fetch_citation(&self, name: &CitationName) -> Result<Option<Citation>> {
        let key = keys::citation_key(name.as_str());
        let Some(record) = self.load(ResourceKind::Citation, name.as_str(), &key).await? else {
            return Ok(None);
        };

        serde_json::from_str(&record)
            .map(Some)
            .map_err(|e| RepositoryError::malformed_response(ResourceKind::Citation, name, e))
    }

    async fn create_citation(&self, citation: &Citation) -> Result<()> {
        let name = citation.name.as_str();
        let record = serde_json::to_string(citation).map_err(|e| RepositoryError::MalformedRequest {
            kind: ResourceKind::Citation,
            id: name.to_string(),
            reason: e.to_string(),
        })?;
        let key = keys::citation_key(name);
        self.create_record(ResourceKind::Citation, name, &key, &record)
            .await
    }
}

#[async_trait]
impl<B: StorageBackend> DocumentRepository for StorageRepository<B> {
    async fn document_exists(&self, id: &DocumentId) -> Result<bool> {
        let name = versioned_id(ResourceKind::Document, id)?;
        let key = keys::document_key(&id.tag, &id.version);
        self.exists_at(ResourceKind::Document, &name, &key).await
    }

    async fn fetch_document(&self, id: &DocumentId) -> Result<Option<String>> {
        let name = versioned_id(ResourceKind::Document, id)?;
        let key = keys::document_key(&id.tag, &id.version);
        self.load(ResourceKind::Document, &name, &key).await
    }

    async fn create_document(&self, id: &DocumentId, content: &str) -> Result<()> {
        let name = versioned_id(ResourceKind::Document, id)?;
        let key = keys::document_key(&id.tag, &id.version);
        self.create_record(ResourceKind::Document, &name, &key, content)
            .await
    }
}

#[async_trait]
impl<B: StorageBackend> TypeRepository for StorageRepository<B> {
    async fn type_exists(&self, id: &DocumentId) -> Result<bool> {
        let name = versioned_id(ResourceKind::Type, id)?;
        let key = keys::type_key(&id.tag, &id.version);
        self.exists_at(ResourceKind::Type, &name, &key).await
    }

    async fn fetch_type(&self, id: &DocumentId) -> Result<Option<String>> {
        let name = versioned_id(ResourceKind::Type, id)?;
        let key = keys::type_key(&id.tag, &id.version);
        self.load(ResourceKind::Type, &name, &key).await
    }

    async fn create_type(&self, id: &DocumentId, definition: &str) -> Result<()> {
        let name = versioned_id(ResourceKind::Type, id)?;
        let key = keys::type_key(&id.tag, &id.version);
        self.create_record(ResourceKind::Type, &name, &key, definition)
            .await
    }
}

#[async_trait]
impl<B: StorageBackend> DraftRepository for StorageRepository<B> {
    async fn draft_exists(&self, id: &DocumentId) -> Result<bool> {
        let name = versioned_id(ResourceKind::Draft, id)?;
        let key = keys::draft_key(&id.tag, &id.version);
        self.exists_at(ResourceKind::Draft, &name, &key).await
    }

    async fn fetch_draft(&self, id: &DocumentId) -> Result<Option<String>> {
        let name = versioned_id(ResourceKind::Draft, id)?;
        let key = keys::draft_key(&id.tag, &id.version);
        self.load(ResourceKind::Draft, &name, &key).await
    }

    async fn save_draft(&self, id: &DocumentId, content: &str) -> Result<()> {
        let draft_id = versioned_id(ResourceKind::Draft, id)?;
        let key = keys::draft_key(&id.tag, &id.version);
        checked(ResourceKind::Draft, &draft_id, &key)?;

        if self.document_exists(id).await? {
            return Err(RepositoryError::already_committed(&draft_id));
        }

        self.store("save", ResourceKind::Draft, &draft_id, &key, content, AccessMode::Updatable)
            .await
    }

    async fn delete_draft(&self, id: &DocumentId) -> Result<()> {
        let draft_id = versioned_id(ResourceKind::Draft, id)?;
        let key = keys::draft_key(&id.tag, &id.version);
        checked(ResourceKind::Draft, &draft_id, &key)?;

        let removed = self
            .backend
            .delete(&key)
            .await
            .map_err(|e| RepositoryError::from_storage("delete", ResourceKind::Draft, &draft_id, e))?;
        if !removed {
            debug!("Draft {} already absent", draft_id);
        }
        Ok(())
    }
}

#[async_trait]
impl<B: StorageBackend> QueueRepository for StorageRepository<B> {
    async fn enqueue(&self, queue: &QueueName, payload: &str) -> Result<String> {
        queue_segment(queue)?;
        let message_id = Uuid::new_v4().to_string();
        let key = keys::message_key(queue.as_str(), &message_id);
        checked(ResourceKind::Queue, queue.as_str(), &key)?;

        self.store("enqueue", ResourceKind::Queue, queue.as_str(), &key, payload, AccessMode::Updatable)
            .await?;
        Ok(message_id)
    }

    async fn dequeue(&self, queue: &QueueName) -> Result<Option<String>> {
        // an empty, dotted or nested name would widen the prefix to other queues
        queue_segment(queue)?;
        let prefix = keys::queue_prefix(queue.as_str());

        let dequeued = queue::dequeue(&self.backend, &prefix)
            .await
            .map_err(|e| RepositoryError::from_storage("dequeue", ResourceKind::Queue, queue, e))?;

        match dequeued {
            Dequeued::Message { key, value } => decode_record(value)
                .map(Some)
                .map_err(|e| RepositoryError::malformed_response(ResourceKind::Queue, key, e)),
            Dequeued::Empty => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use docrepo_storage::MemoryBackend;

    use super::*;

    fn repo() -> StorageRepository<MemoryBackend> {
        StorageRepository::new(MemoryBackend::new())
    }

    #[tokio::test]
    async fn test_citation_write_once() {
        let repo = repo();
        let name = CitationName::new("smith/2020");
        let first = Citation::new("smith/2020", "paper", "1", "h1");
        let second = Citation::new("smith/2020", "paper", "2", "h2");

        assert!(!repo.citation_exists(&name).await.unwrap());
        assert!(repo.fetch_citation(&name).await.unwrap().is_none());

        repo.create_citation(&first).await.unwrap();
        let err = repo.create_citation(&second).await.unwrap_err();

        assert!(matches!(err, RepositoryError::AlreadyExists { kind: ResourceKind::Citation, .. }));
        assert_eq!(repo.fetch_citation(&name).await.unwrap(), Some(first));
        assert!(repo.backend().key_exists("citations/smith_2020.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_document_and_type_are_independent_namespaces() {
        let repo = repo();
        let id = DocumentId::new("schema", "1");

        repo.create_document(&id, "doc body").await.unwrap();
        repo.create_type(&id, "type body").await.unwrap();

        assert_eq!(repo.fetch_document(&id).await.unwrap().as_deref(), Some("doc body"));
        assert_eq!(repo.fetch_type(&id).await.unwrap().as_deref(), Some("type body"));
        assert!(repo.create_type(&id, "again").await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_records_are_newline_framed_and_read_only() {
        let repo = repo();
        let id = DocumentId::new("t", "1");
        repo.create_document(&id, "body").await.unwrap();

        let raw = repo.backend().read("documents/t/1.json").await.unwrap().unwrap();
        assert_eq!(raw, b"body\n".to_vec());
        assert_eq!(repo.backend().mode_of("documents/t/1.json"), Some(AccessMode::ReadOnly));
    }

    #[tokio::test]
    async fn test_backend_no_clobber_maps_to_already_exists() {
        let repo = repo();
        // another process won the race between our existence check and our write
        repo.backend()
            .write("types/t/1.json", b"theirs\n", AccessMode::ReadOnly)
            .await
            .unwrap();
        let err = repo
            .store("create", ResourceKind::Type, "t/1", "types/t/1.json", "ours", AccessMode::ReadOnly)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_draft_round_trip() {
        let repo = repo();
        let id = DocumentId::new("notes", "wip");

        repo.save_draft(&id, "v1").await.unwrap();
        repo.save_draft(&id, "v2").await.unwrap();
        assert_eq!(repo.fetch_draft(&id).await.unwrap().as_deref(), Some("v2"));
        assert_eq!(repo.backend().mode_of("drafts/notes/wip.json"), Some(AccessMode::Updatable));

        repo.delete_draft(&id).await.unwrap();
        assert!(repo.fetch_draft(&id).await.unwrap().is_none());
        repo.delete_draft(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_draft_cannot_shadow_document() {
        let repo = repo();
        let id = DocumentId::new("report", "final");
        repo.create_document(&id, "committed").await.unwrap();

        let err = repo.save_draft(&id, "edit").await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyCommitted { .. }));
        assert!(!repo.draft_exists(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_identifiers_rejected() {
        let repo = repo();
        let err = repo
            .create_document(&DocumentId::new("", "1"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MalformedRequest { .. }));

        let err = repo.fetch_type(&DocumentId::new("..", "1")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::MalformedRequest { .. }));
    }

    #[tokio::test]
    async fn test_tag_and_version_cannot_alias_each_other() {
        let repo = repo();
        repo.create_document(&DocumentId::new("a", "b"), "one")
            .await
            .unwrap();

        for id in [DocumentId::new("a", "b/c"), DocumentId::new("a/b", "c")] {
            let err = repo.create_document(&id, "two").await.unwrap_err();
            assert!(matches!(err, RepositoryError::MalformedRequest { .. }), "{id}");
            assert!(matches!(
                repo.fetch_document(&id).await,
                Err(RepositoryError::MalformedRequest { .. })
            ));
            assert!(repo.save_draft(&id, "d").await.is_err());
            assert!(repo.type_exists(&id).await.is_err());
        }
        assert_eq!(repo.backend().len(), 1);
    }

    #[tokio::test]
    async fn test_nested_queue_names_rejected() {
        let repo = repo();
        let outer = QueueName::new("jobs");
        let nested = QueueName::new("jobs/urgent");

        let err = repo.enqueue(&nested, "urgent-only").await.unwrap_err();
        assert!(matches!(err, RepositoryError::MalformedRequest { .. }));
        let err = repo.dequeue(&nested).await.unwrap_err();
        assert!(matches!(err, RepositoryError::MalformedRequest { .. }));
        assert!(repo.dequeue(&QueueName::new("")).await.is_err());

        repo.enqueue(&outer, "outer").await.unwrap();
        assert_eq!(repo.dequeue(&outer).await.unwrap().as_deref(), Some("outer"));
        assert_eq!(repo.dequeue(&outer).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_citation_is_malformed_response() {
        let repo = repo();
        repo.backend()
            .write("citations/broken.json", b"not json\n", AccessMode::ReadOnly)
            .await
            .unwrap();

        let err = repo.fetch_citation(&CitationName::new("broken")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_queue_drain() {
        let repo = repo();
        let queue = QueueName::new("jobs");

        let first = repo.enqueue(&queue, "x").await.unwrap();
        let second = repo.enqueue(&queue, "y").await.unwrap();
        assert_ne!(first, second);

        let mut drained = vec![
            repo.dequeue(&queue).await.unwrap().unwrap(),
            repo.dequeue(&queue).await.unwrap().unwrap(),
        ];
        drained.sort();
        assert_eq!(drained, vec!["x", "y"]);
        assert!(repo.dequeue(&queue).await.unwrap().is_none());
    }
}
