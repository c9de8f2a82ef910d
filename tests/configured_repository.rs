//! Repositories opened from configuration

use docrepo_config::{open_repository, BackendConfig, ConfigLoader, RepositoryConfig};
use docrepo_core::{DocumentId, DocumentRepository, QueueName, QueueRepository};
use tempfile::TempDir;

#[tokio::test]
async fn test_toml_file_opens_cached_filesystem_repository() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("records");
    let config_path = dir.path().join("docrepo.toml");
    std::fs::write(
        &config_path,
        format!(
            "[backend]\nkind = \"file-system\"\nroot = {:?}\n\n[cache]\ncapacity = 16\n",
            root.to_str().unwrap()
        ),
    )
    .unwrap();

    let config = ConfigLoader::with_path(&config_path).load().unwrap();
    let repo = open_repository(&config).unwrap();

    let id = DocumentId::new("manual", "3");
    repo.create_document(&id, "contents").await.unwrap();
    assert_eq!(repo.fetch_document(&id).await.unwrap().as_deref(), Some("contents"));

    let queue = QueueName::new("index");
    repo.enqueue(&queue, "manual/3").await.unwrap();
    assert_eq!(repo.dequeue(&queue).await.unwrap().as_deref(), Some("manual/3"));

    assert!(root.join("documents").join("manual").join("3.json").is_file());
}

#[tokio::test]
async fn test_memory_repositories_do_not_share_state() {
    let config = RepositoryConfig::new(BackendConfig::Memory);
    let first = open_repository(&config).unwrap();
    let second = open_repository(&config).unwrap();

    let id = DocumentId::new("a", "1");
    first.create_document(&id, "x").await.unwrap();
    assert!(!second.document_exists(&id).await.unwrap());
}
