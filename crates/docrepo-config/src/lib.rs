//! Configuration for docrepo
//!
//! Loads a [`RepositoryConfig`] from TOML and the environment and turns it
//! into a ready-to-use repository with [`open_repository`].
//!
//! ```toml
//! [backend]
//! kind = "file-system"
//! root = "/var/lib/docrepo"
//!
//! [cache]
//! capacity = 1024
//! ```

pub mod error;
pub mod factory;
pub mod loader;
pub mod types;

pub use error::{ConfigError, Result};
pub use factory::open_repository;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use types::{BackendConfig, RepositoryConfig};
