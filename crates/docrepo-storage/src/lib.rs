//! # docrepo storage
//!
//! Raw key operations over an opaque byte payload, shared by every docrepo
//! backend.
//!
//! ## Backends
//!
//! - **Memory**: [`MemoryBackend`], a lock-guarded ordered map
//! - **Filesystem**: [`FileSystemBackend`], one file per key under a root directory
//! - **Object store**: [`ObjectStoreBackend`], an adapter over any [`ObjectClient`]
//!
//! The remote HTTP backend lives in `docrepo-http` and implements the same
//! [`StorageBackend`] trait.
//!
//! ## Keys
//!
//! The [`keys`] module owns the name-to-key layout. Every backend stores records
//! under exactly those keys so repositories can move between backends.

pub mod backend;
pub mod error;
pub mod filesystem;
pub mod keys;
pub mod memory;
pub mod object_store;

pub use backend::{AccessMode, StorageBackend};
pub use error::{Result, StorageError};
pub use filesystem::FileSystemBackend;
pub use memory::MemoryBackend;
pub use object_store::{ObjectClient, ObjectStoreBackend};
