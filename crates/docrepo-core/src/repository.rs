//! Repository contract
//!
//! One trait per resource family, following the interface segregation the
//! backends also use. [`Repository`] is the composite every implementation
//! provides.
//!
//! ```text
//! citation / document / type : exists, fetch, create   (write-once)
//! draft                      : exists, fetch, save, delete
//! queue                      : enqueue, dequeue        (unordered)
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Citation, CitationName, DocumentId, QueueName};

/// Write-once citations
#[async_trait]
pub trait CitationRepository: Send + Sync {
    async fn citation_exists(&self, name: &CitationName) -> Result<bool>;

    async fn fetch_citation(&self, name: &CitationName) -> Result<Option<Citation>>;

    /// Fails with `AlreadyExists` when the name is taken
    async fn create_citation(&self, citation: &Citation) -> Result<()>;
}

/// Write-once committed documents
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn document_exists(&self, id: &DocumentId) -> Result<bool>;

    async fn fetch_document(&self, id: &DocumentId) -> Result<Option<String>>;

    /// Fails with `AlreadyExists` when the identifier is taken
    async fn create_document(&self, id: &DocumentId, content: &str) -> Result<()>;
}

/// Write-once type definitions
#[async_trait]
pub trait TypeRepository: Send + Sync {
    async fn type_exists(&self, id: &DocumentId) -> Result<bool>;

    async fn fetch_type(&self, id: &DocumentId) -> Result<Option<String>>;

    /// Fails with `AlreadyExists` when the identifier is taken
    async fn create_type(&self, id: &DocumentId, definition: &str) -> Result<()>;
}

/// Mutable drafts
#[async_trait]
pub trait DraftRepository: Send + Sync {
    async fn draft_exists(&self, id: &DocumentId) -> Result<bool>;

    async fn fetch_draft(&self, id: &DocumentId) -> Result<Option<String>>;

    /// Store or overwrite a draft
    ///
    /// Fails with `AlreadyCommitted` when a committed document already uses `id`.
    async fn save_draft(&self, id: &DocumentId, content: &str) -> Result<()>;

    /// Remove a draft; removing an absent draft is not an error
    async fn delete_draft(&self, id: &DocumentId) -> Result<()>;
}

/// Unordered message queues
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Store a message under a fresh unique id and return that id
    async fn enqueue(&self, queue: &QueueName, payload: &str) -> Result<String>;

    /// Take one message, `None` when the queue is empty
    ///
    /// Each message is returned by at most one call. No ordering is implied
    /// and no deadline is applied; wrap in `tokio::time::timeout` if needed.
    async fn dequeue(&self, queue: &QueueName) -> Result<Option<String>>;
}

/// Full repository contract
pub trait Repository:
    CitationRepository + DocumentRepository + TypeRepository + DraftRepository + QueueRepository
{
}

impl<T> Repository for T where
    T: CitationRepository + DocumentRepository + TypeRepository + DraftRepository + QueueRepository
{
}

#[async_trait]
impl<T: CitationRepository + ?Sized> CitationRepository for Arc<T> {
    async fn citation_exists(&self, name: &CitationName) -> Result<bool> {
        (**self).citation_exists(name).await
    }

    async fn fetch_citation(&self, name: &CitationName) -> Result<Option<Citation>> {
        (**self).fetch_citation(name).await
    }

    async fn create_citation(&self, citation: &Citation) -> Result<()> {
        (**self).create_citation(citation).await
    }
}

#[async_trait]
impl<T: DocumentRepository + ?Sized> DocumentRepository for Arc<T> {
    async fn document_exists(&self, id: &DocumentId) -> Result<bool> {
        (**self).document_exists(id).await
    }

    async fn fetch_document(&self, id: &DocumentId) -> Result<Option<String>> {
        (**self).fetch_document(id).await
    }

    async fn create_document(&self, id: &DocumentId, content: &str) -> Result<()> {
        (**self).create_document(id, content).await
    }
}

#[async_trait]
impl<T: TypeRepository + ?Sized> TypeRepository for Arc<T> {
    async fn type_exists(&self, id: &DocumentId) -> Result<bool> {
        (**self).type_exists(id).await
    }

    async fn fetch_type(&self, id: &DocumentId) -> Result<Option<String>> {
        (**self).fetch_type(id).await
    }

    async fn create_type(&self, id: &DocumentId, definition: &str) -> Result<()> {
        (**self).create_type(id, definition).await
    }
}

#[async_trait]
impl<T: DraftRepository + ?Sized> DraftRepository for Arc<T> {
    async fn draft_exists(&self, id: &DocumentId) -> Result<bool> {
        (**self).draft_exists(id).await
    }

    async fn fetch_draft(&self, id: &DocumentId) -> Result<Option<String>> {
        (**self).fetch_draft(id).await
    }

    async fn save_draft(&self, id: &DocumentId, content: &str) -> Result<()> {
        (**self).save_draft(id, content).await
    }

    async fn delete_draft(&self, id: &DocumentId) -> Result<()> {
        (**self).delete_draft(id).await
    }
}

#[async_trait]
impl<T: QueueRepository + ?Sized> QueueRepository for Arc<T> {
    async fn enqueue(&self, queue: &QueueName, payload: &str) -> Result<String> {
        (**self).enqueue(queue, payload).await
    }

    async fn dequeue(&self, queue: &QueueName) -> Result<Option<String>> {
        (**self).dequeue(queue).await
    }
}
