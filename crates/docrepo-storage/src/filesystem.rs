//! Filesystem storage backend
//!
//! One file per key under a root directory. Writes are staged in a hidden
//! file next to the target and published with a single link or rename, so
//! readers and listings never see a half-written record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::keys::{validate_key, RECORD_SUFFIX};
use crate::{AccessMode, Result, StorageBackend, StorageError};

const STAGING_SUFFIX: &str = ".staging";

/// Filesystem implementation of [`StorageBackend`]
///
/// [`AccessMode::ReadOnly`] records are published with a hard link, which
/// fails if the target already exists, and get read-only permissions.
/// [`AccessMode::Updatable`] records are published with a rename.
#[derive(Debug, Clone)]
pub struct FileSystemBackend {
    root: PathBuf,
}

impl FileSystemBackend {
    /// Create a backend rooted at `root`
    ///
    /// The directory is created lazily on first write.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory of this backend
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, segment| path.join(segment)))
    }

    fn staging_path(target: &Path) -> PathBuf {
        let file_name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        target.with_file_name(format!(".{file_name}.{}{STAGING_SUFFIX}", Uuid::new_v4().simple()))
    }

    async fn publish(&self, key: &str, staging: &Path, target: &Path, mode: AccessMode) -> Result<()> {
        match mode {
            AccessMode::ReadOnly => {
                let mut permissions = fs::metadata(staging)
                    .await
                    .map_err(|e| StorageError::io(key, e))?
                    .permissions();
                permissions.set_readonly(true);
                fs::set_permissions(staging, permissions)
                    .await
                    .map_err(|e| StorageError::io(key, e))?;

                match fs::hard_link(staging, target).await {
                    Ok(()) => {
                        remove_quietly(staging).await;
                        Ok(())
                    }
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StorageError::key_exists(key)),
                    Err(e) => Err(StorageError::io(key, e)),
                }
            }
            AccessMode::Updatable => fs::rename(staging, target)
                .await
                .map_err(|e| StorageError::io(key, e)),
        }
    }

    async fn collect_keys(&self, dir: PathBuf, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![dir];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::io(prefix, e)),
            };

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::io(prefix, e))?
            {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with('.') {
                    continue;
                }

                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StorageError::io(prefix, e))?;
                let path = entry.path();

                if file_type.is_dir() {
                    pending.push(path);
                } else if name.ends_with(RECORD_SUFFIX) {
                    if let Some(key) = self.key_for(&path) {
                        if key.starts_with(prefix) {
                            keys.push(key);
                        }
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<String> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(segments.join("/"))
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove staging file {}: {}", path.display(), e);
        }
    }
}

#[async_trait]
impl StorageBackend for FileSystemBackend {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    async fn key_exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    async fn write(&self, key: &str, bytes: &[u8], mode: AccessMode) -> Result<()> {
        let target = self.path_for(key)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(key, e))?;
        }

        let staging = Self::staging_path(&target);
        fs::write(&staging, bytes)
            .await
            .map_err(|e| StorageError::io(key, e))?;

        let published = self.publish(key, &staging, &target, mode).await;
        match &published {
            Ok(()) => debug!("Wrote {} ({}, {} bytes)", key, mode, bytes.len()),
            Err(_) => remove_quietly(&staging).await,
        }
        published
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        // Walk only the deepest directory the prefix names fully.
        let dir_part = match prefix.rfind('/') {
            Some(index) => &prefix[..index],
            None => "",
        };
        let start = if dir_part.is_empty() {
            self.root.clone()
        } else {
            self.path_for(dir_part)?
        };
        self.collect_keys(start, prefix).await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_filesystem_basic_operations() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp_dir.path());

        assert!(!backend.key_exists("drafts/a/1.json").await.unwrap());
        assert!(backend.read("drafts/a/1.json").await.unwrap().is_none());

        backend
            .write("drafts/a/1.json", b"draft\n", AccessMode::Updatable)
            .await
            .unwrap();

        assert!(backend.key_exists("drafts/a/1.json").await.unwrap());
        assert_eq!(
            backend.read("drafts/a/1.json").await.unwrap(),
            Some(b"draft\n".to_vec())
        );
        assert!(temp_dir.path().join("drafts").join("a").join("1.json").is_file());
    }

    #[tokio::test]
    async fn test_read_only_write_is_no_clobber() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp_dir.path());

        backend
            .write("documents/a/1.json", b"first\n", AccessMode::ReadOnly)
            .await
            .unwrap();
        let second = backend
            .write("documents/a/1.json", b"second\n", AccessMode::ReadOnly)
            .await;

        assert!(matches!(second, Err(StorageError::KeyExists { .. })));
        assert_eq!(
            backend.read("documents/a/1.json").await.unwrap(),
            Some(b"first\n".to_vec())
        );

        let permissions = std::fs::metadata(temp_dir.path().join("documents/a/1.json"))
            .unwrap()
            .permissions();
        assert!(permissions.readonly());
    }

    #[tokio::test]
    async fn test_updatable_write_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp_dir.path());

        backend.write("drafts/a/1.json", b"1\n", AccessMode::Updatable).await.unwrap();
        backend.write("drafts/a/1.json", b"2\n", AccessMode::Updatable).await.unwrap();

        assert_eq!(
            backend.read("drafts/a/1.json").await.unwrap(),
            Some(b"2\n".to_vec())
        );
        assert!(!std::fs::metadata(temp_dir.path().join("drafts/a/1.json"))
            .unwrap()
            .permissions()
            .readonly());
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp_dir.path());

        backend.write("queues/q/m.json", b"x\n", AccessMode::Updatable).await.unwrap();
        assert!(backend.delete("queues/q/m.json").await.unwrap());
        assert!(!backend.delete("queues/q/m.json").await.unwrap());
        assert!(!backend.key_exists("queues/q/m.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_skips_staging_and_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp_dir.path());

        backend.write("queues/jobs/a.json", b"a\n", AccessMode::Updatable).await.unwrap();
        backend.write("queues/jobs/b.json", b"b\n", AccessMode::Updatable).await.unwrap();
        backend.write("queues/other/c.json", b"c\n", AccessMode::Updatable).await.unwrap();

        let jobs_dir = temp_dir.path().join("queues").join("jobs");
        std::fs::write(jobs_dir.join(".c.json.1234.staging"), b"partial").unwrap();
        std::fs::write(jobs_dir.join("notes.txt"), b"ignored").unwrap();

        let keys = backend.list("queues/jobs/").await.unwrap();
        assert_eq!(keys, vec!["queues/jobs/a.json", "queues/jobs/b.json"]);

        let all = backend.list("queues/").await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp_dir.path().join("never-created"));
        assert!(backend.list("queues/jobs/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_staging_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp_dir.path());

        backend.write("types/t/1.json", b"t\n", AccessMode::ReadOnly).await.unwrap();
        let _ = backend.write("types/t/1.json", b"t\n", AccessMode::ReadOnly).await;

        let names: Vec<String> = std::fs::read_dir(temp_dir.path().join("types").join("t"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["1.json"]);
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp_dir.path());

        let result = backend.read("../outside.json").await;
        assert!(matches!(result, Err(StorageError::InvalidKey { .. })));
    }
}
