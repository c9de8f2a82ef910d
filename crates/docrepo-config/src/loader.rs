//! Configuration loading from TOML files and the environment

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use tracing::debug;

use crate::{
    error::{ConfigError, Result},
    types::RepositoryConfig,
};

/// Default environment prefix, as in `DOCREPO_BACKEND__ROOT`
pub const DEFAULT_ENV_PREFIX: &str = "DOCREPO";

/// Builds a [`RepositoryConfig`] from an optional TOML file plus environment
/// overrides
///
/// Nested keys use `__` in variable names: `DOCREPO_CACHE__CAPACITY=64`
/// sets `cache.capacity`.
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader reading only the environment
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Loader reading `path`, which must exist
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load, merge and validate
    pub fn load(&self) -> Result<RepositoryConfig> {
        let mut builder = Config::builder();

        if let Some(path) = &self.config_path {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path.clone()).format(FileFormat::Toml));
        }

        let builder = builder.add_source(self.environment());
        let config: RepositoryConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML text, still honoring environment overrides
    pub fn load_str(&self, toml: &str) -> Result<RepositoryConfig> {
        let config: RepositoryConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(self.environment())
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Write `config` to `path` as TOML, creating parent directories
    pub fn save(&self, config: &RepositoryConfig, path: &Path) -> Result<()> {
        let toml = config.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml)?;
        Ok(())
    }

    fn environment(&self) -> Environment {
        Environment::with_prefix(&self.env_prefix)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
