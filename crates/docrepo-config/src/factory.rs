//! Repository construction from configuration

use std::sync::Arc;

use docrepo_cache::{CacheConfig, CachingRepository};
use docrepo_core::{Repository, StorageRepository};
use docrepo_http::RemoteBackend;
use docrepo_storage::{FileSystemBackend, MemoryBackend, StorageBackend};
use tracing::info;

use crate::{
    error::Result,
    types::{BackendConfig, RepositoryConfig},
};

/// Open the repository described by `config`
///
/// The filesystem root is created when missing. Remote backends are not
/// contacted until the first operation.
pub fn open_repository(config: &RepositoryConfig) -> Result<Arc<dyn Repository>> {
    config.validate()?;

    match &config.backend {
        BackendConfig::Memory => {
            info!("Opening in-memory repository");
            wrap(MemoryBackend::new(), config.cache)
        }
        BackendConfig::FileSystem { root } => {
            info!("Opening filesystem repository at {}", root.display());
            std::fs::create_dir_all(root)?;
            wrap(FileSystemBackend::new(root), config.cache)
        }
        BackendConfig::Remote {
            base_url,
            credential,
            http,
        } => {
            info!("Opening remote repository at {base_url}");
            let backend = RemoteBackend::from_config(base_url, credential.clone(), http.clone())?;
            wrap(backend, config.cache)
        }
    }
}

fn wrap<B>(backend: B, cache: Option<CacheConfig>) -> Result<Arc<dyn Repository>>
where
    B: StorageBackend + 'static,
{
    let repository = StorageRepository::new(backend);
    match cache {
        Some(cache) => Ok(Arc::new(CachingRepository::new(repository, cache)?)),
        None => Ok(Arc::new(repository)),
    }
}
