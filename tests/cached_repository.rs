//! Caching decorator over shared filesystem storage

use docrepo_cache::{CacheConfig, CachingRepository};
use docrepo_core::{DocumentId, DocumentRepository, StorageRepository, TypeRepository};
use docrepo_storage::FileSystemBackend;
use tempfile::TempDir;

fn cached(dir: &TempDir, capacity: usize) -> CachingRepository<StorageRepository<FileSystemBackend>> {
    CachingRepository::new(
        StorageRepository::new(FileSystemBackend::new(dir.path())),
        CacheConfig::with_capacity(capacity),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fifo_eviction_keeps_latest_inserts() {
    let dir = TempDir::new().unwrap();
    let repo = cached(&dir, 2);

    for tag in ["a", "b", "c"] {
        repo.create_document(&DocumentId::new(tag, "1"), tag).await.unwrap();
    }

    let keys = repo.document_cache().keys();
    assert_eq!(
        keys,
        vec![DocumentId::new("b", "1"), DocumentId::new("c", "1")]
    );

    let before = repo.stats().documents;
    assert_eq!(
        repo.fetch_document(&DocumentId::new("a", "1")).await.unwrap().as_deref(),
        Some("a")
    );
    let after = repo.stats().documents;
    assert_eq!(after.misses, before.misses + 1);
}

#[tokio::test]
async fn test_sees_records_written_by_another_instance() {
    let dir = TempDir::new().unwrap();
    let ours = cached(&dir, 8);
    let theirs = cached(&dir, 8);
    let id = DocumentId::new("shared", "1");

    assert!(!ours.type_exists(&id).await.unwrap());
    theirs.create_type(&id, "schema").await.unwrap();

    assert!(ours.type_exists(&id).await.unwrap());
    assert!(ours.create_type(&id, "mine").await.is_err());
    assert_eq!(ours.fetch_type(&id).await.unwrap().as_deref(), Some("schema"));
}
