//! # docrepo Cache
//!
//! Bounded read-through caching for docrepo repositories.
//!
//! ## Features
//!
//! - **Write-once families only**: citations, documents and types are cached;
//!   drafts and queues always reach the wrapped repository
//! - **Bounded**: each family holds at most `capacity` entries and evicts the
//!   oldest insert first
//! - **No false negatives**: existence checks fall back to the wrapped
//!   repository on every miss
//! - **Metrics**: per-family hit, miss, insert and eviction counters

pub mod cache;
pub mod decorator;
pub mod error;
pub mod metrics;

pub use cache::{BoundedCache, CacheConfig};
pub use decorator::{CachingRepository, CachingStats};
pub use error::CacheError;
pub use metrics::{CacheMetrics, CacheStats};

/// Re-export commonly used types
pub type Result<T> = std::result::Result<T, CacheError>;
