//! Repository configuration types

use std::path::PathBuf;

use docrepo_cache::CacheConfig;
use docrepo_http::HttpConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Everything needed to open a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub backend: BackendConfig,

    /// Read-through cache; absent means every call reaches the backend
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

/// Which storage backend records live in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BackendConfig {
    /// Process-local map, lost on exit
    Memory,
    /// One file per record under `root`
    FileSystem { root: PathBuf },
    /// Remote record service
    Remote {
        base_url: String,
        #[serde(default)]
        credential: String,
        #[serde(default)]
        http: HttpConfig,
    },
}

impl RepositoryConfig {
    pub fn new(backend: BackendConfig) -> Self {
        Self {
            backend,
            cache: None,
        }
    }

    /// Filesystem repository rooted at `root`
    pub fn file_system(root: impl Into<PathBuf>) -> Self {
        Self::new(BackendConfig::FileSystem { root: root.into() })
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Check values serde cannot reject on its own
    pub fn validate(&self) -> Result<()> {
        if let Some(cache) = &self.cache {
            cache.validated_capacity()?;
        }

        match &self.backend {
            BackendConfig::Memory => {}
            BackendConfig::FileSystem { root } => {
                if root.as_os_str().is_empty() {
                    return Err(ConfigError::Validation(
                        "Filesystem root must not be empty".to_string(),
                    ));
                }
            }
            BackendConfig::Remote { base_url, .. } => {
                url::Url::parse(base_url).map_err(|e| {
                    ConfigError::Validation(format!("Invalid base URL '{base_url}': {e}"))
                })?;
            }
        }
        Ok(())
    }

    /// Render as TOML, the format [`crate::ConfigLoader`] reads
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}
