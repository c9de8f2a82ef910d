//! docrepo Core
//!
//! Repository contract for citations, documents, types, drafts and message
//! queues, independent of where records are stored.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Repository (CitationRepository + DocumentRepository +      │
//! │              TypeRepository + DraftRepository +             │
//! │              QueueRepository)                               │
//! └──────────────────────────────────────────────────────────────┘
//!                │ implemented by
//!                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StorageRepository<B: StorageBackend>                        │
//! │  memory │ filesystem │ object store │ remote HTTP            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Citations, documents and types are write-once. Drafts can be overwritten
//! and deleted but never shadow a committed document. Queues are unordered;
//! see [`queue`] for how concurrent consumers share them without locks.

pub mod error;
pub mod model;
pub mod queue;
pub mod repository;
pub mod storage_repository;

pub use error::{RepositoryError, ResourceKind, Result};
pub use model::{Citation, CitationName, DocumentId, QueueName};
pub use queue::{dequeue, Dequeued};
pub use repository::{
    CitationRepository, DocumentRepository, DraftRepository, QueueRepository, Repository,
    TypeRepository,
};
pub use storage_repository::StorageRepository;
