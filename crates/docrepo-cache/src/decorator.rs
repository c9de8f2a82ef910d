//! Read-through caching decorator for repositories
//!
//! Only write-once families are cached. A cached citation, document or type
//! can never go stale because it cannot change after creation, so entries
//! are never invalidated and eviction is purely about memory. Drafts and
//! queue messages change or disappear behind the cache's back and always go
//! to the wrapped repository.
//!
//! The cache may not know about records another process created, so `exists`
//! and `create` consult the wrapped repository on every cache miss.

use async_trait::async_trait;
use docrepo_core::{
    Citation, CitationName, CitationRepository, DocumentId, DocumentRepository, DraftRepository,
    QueueName, QueueRepository, Repository, RepositoryError, ResourceKind, TypeRepository,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{BoundedCache, CacheConfig};
use crate::error::Result;
use crate::metrics::CacheStats;

/// Per-family cache statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachingStats {
    pub citations: CacheStats,
    pub documents: CacheStats,
    pub types: CacheStats,
}

/// Wraps any [`Repository`] with bounded caches for citations, documents and types
///
/// # Example
///
/// ```ignore
/// use docrepo_cache::{CacheConfig, CachingRepository};
/// use docrepo_core::StorageRepository;
/// use docrepo_storage::MemoryBackend;
///
/// let repo = CachingRepository::new(
///     StorageRepository::new(MemoryBackend::new()),
///     CacheConfig::with_capacity(256),
/// )?;
/// ```
pub struct CachingRepository<R> {
    inner: R,
    citations: BoundedCache<CitationName, Citation>,
    documents: BoundedCache<DocumentId, String>,
    types: BoundedCache<DocumentId, String>,
}

impl<R: Repository> CachingRepository<R> {
    /// Wrap `inner`; every family gets its own cache of `config.capacity` entries
    pub fn new(inner: R, config: CacheConfig) -> Result<Self> {
        let capacity = config.validated_capacity()?;
        Ok(Self {
            inner,
            citations: BoundedCache::new(capacity),
            documents: BoundedCache::new(capacity),
            types: BoundedCache::new(capacity),
        })
    }

    /// Wrapped repository
    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn stats(&self) -> CachingStats {
        CachingStats {
            citations: self.citations.stats(),
            documents: self.documents.stats(),
            types: self.types.stats(),
        }
    }

    /// Start a new measurement window without dropping cached entries
    pub fn reset_stats(&self) {
        self.citations.reset_stats();
        self.documents.reset_stats();
        self.types.reset_stats();
    }

    pub fn citation_cache(&self) -> &BoundedCache<CitationName, Citation> {
        &self.citations
    }

    pub fn document_cache(&self) -> &BoundedCache<DocumentId, String> {
        &self.documents
    }

    pub fn type_cache(&self) -> &BoundedCache<DocumentId, String> {
        &self.types
    }
}

fn remember<K, V>(cache: &BoundedCache<K, V>, kind: ResourceKind, key: K, value: V)
where
    K: std::hash::Hash + Eq + Clone + std::fmt::Display,
    V: Clone,
{
    if let Some(evicted) = cache.insert(key, value) {
        debug!("Evicted {} {} from cache", kind, evicted);
    }
}

#[async_trait]
impl<R: Repository> CitationRepository for CachingRepository<R> {
    async fn citation_exists(&self, name: &CitationName) -> docrepo_core::Result<bool> {
        if self.citations.contains(name) {
            return Ok(true);
        }
        self.inner.citation_exists(name).await
    }

    async fn fetch_citation(&self, name: &CitationName) -> docrepo_core::Result<Option<Citation>> {
        if let Some(citation) = self.citations.get(name) {
            return Ok(Some(citation));
        }

        let fetched = self.inner.fetch_citation(name).await?;
        if let Some(citation) = &fetched {
            remember(&self.citations, ResourceKind::Citation, name.clone(), citation.clone());
        }
        Ok(fetched)
    }

    async fn create_citation(&self, citation: &Citation) -> docrepo_core::Result<()> {
        if self.citation_exists(&citation.name).await? {
            return Err(RepositoryError::already_exists(ResourceKind::Citation, &citation.name));
        }

        self.inner.create_citation(citation).await?;
        remember(
            &self.citations,
            ResourceKind::Citation,
            citation.name.clone(),
            citation.clone(),
        );
        Ok(())
    }
}

#[async_trait]
impl<R: Repository> DocumentRepository for CachingRepository<R> {
    async fn document_exists(&self, id: &DocumentId) -> docrepo_core::Result<bool> {
        if self.documents.contains(id) {
            return Ok(true);
        }
        self.inner.document_exists(id).await
    }

    async fn fetch_document(&self, id: &DocumentId) -> docrepo_core::Result<Option<String>> {
        if let Some(content) = self.documents.get(id) {
            return Ok(Some(content));
        }

        let fetched = self.inner.fetch_document(id).await?;
        if let Some(content) = &fetched {
            remember(&self.documents, ResourceKind::Document, id.clone(), content.clone());
        }
        Ok(fetched)
    }

    async fn create_document(&self, id: &DocumentId, content: &str) -> docrepo_core::Result<()> {
        if self.document_exists(id).await? {
            return Err(RepositoryError::already_exists(ResourceKind::Document, id));
        }

        self.inner.create_document(id, content).await?;
        remember(&self.documents, ResourceKind::Document, id.clone(), content.to_string());
        Ok(())
    }
}

#[async_trait]
impl<R: Repository> TypeRepository for CachingRepository<R> {
    async fn type_exists(&self, id: &DocumentId) -> docrepo_core::Result<bool> {
        if self.types.contains(id) {
            return Ok(true);
        }
        self.inner.type_exists(id).await
    }

    async fn fetch_type(&self, id: &DocumentId) -> docrepo_core::Result<Option<String>> {
        if let Some(definition) = self.types.get(id) {
            return Ok(Some(definition));
        }

        let fetched = self.inner.fetch_type(id).await?;
        if let Some(definition) = &fetched {
            remember(&self.types, ResourceKind::Type, id.clone(), definition.clone());
        }
        Ok(fetched)
    }

    async fn create_type(&self, id: &DocumentId, definition: &str) -> docrepo_core::Result<()> {
        if self.type_exists(id).await? {
            return Err(RepositoryError::already_exists(ResourceKind::Type, id));
        }

        self.inner.create_type(id, definition).await?;
        remember(&self.types, ResourceKind::Type, id.clone(), definition.to_string());
        Ok(())
    }
}

#[async_trait]
impl<R: Repository> DraftRepository for CachingRepository<R> {
    async fn draft_exists(&self, id: &DocumentId) -> docrepo_core::Result<bool> {
        self.inner.draft_exists(id).await
    }

    async fn fetch_draft(&self, id: &DocumentId) -> docrepo_core::Result<Option<String>> {
        self.inner.fetch_draft(id).await
    }

    async fn save_draft(&self, id: &DocumentId, content: &str) -> docrepo_core::Result<()> {
        self.inner.save_draft(id, content).await
    }

    async fn delete_draft(&self, id: &DocumentId) -> docrepo_core::Result<()> {
        self.inner.delete_draft(id).await
    }
}

#[async_trait]
impl<R: Repository> QueueRepository for CachingRepository<R> {
    async fn enqueue(&self, queue: &QueueName, payload: &str) -> docrepo_core::Result<String> {
        self.inner.enqueue(queue, payload).await
    }

    async fn dequeue(&self, queue: &QueueName) -> docrepo_core::Result<Option<String>> {
        self.inner.dequeue(queue).await
    }
}
