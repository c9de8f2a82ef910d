use clap::Parser;
use docrepo_cli::{commands, router::Cli, CliError};

async fn run(root: &std::path::Path, args: &[&str]) -> Result<String, CliError> {
    let mut argv = vec!["docrepo", "--root", root.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();

    let mut out = Vec::new();
    commands::run(cli, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_document_create_get_exists() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    assert_eq!(run(root, &["document", "exists", "handbook", "1"]).await.unwrap(), "false\n");
    run(root, &["document", "create", "handbook", "1", "--value", "body"])
        .await
        .unwrap();
    assert_eq!(run(root, &["document", "get", "handbook", "1"]).await.unwrap(), "body\n");
    assert_eq!(run(root, &["document", "exists", "handbook", "1"]).await.unwrap(), "true\n");

    let err = run(root, &["document", "create", "handbook", "1", "--value", "other"])
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_missing_records_exit_with_not_found() {
    let dir = tempfile::tempdir().unwrap();

    let err = run(dir.path(), &["type", "get", "t", "1"]).await.unwrap_err();
    assert!(matches!(err, CliError::NotFound(_)));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_citation_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    run(root, &["citation", "create", "paper/one", "handbook", "1", "--hash", "abc"])
        .await
        .unwrap();
    let json = run(root, &["citation", "get", "paper/one"]).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["hash"], "abc");
    assert_eq!(value["tag"], "handbook");

    assert!(root.join("citations").join("paper_one.json").is_file());
}

#[tokio::test]
async fn test_draft_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    run(root, &["draft", "save", "a", "1", "--value", "v1"]).await.unwrap();
    run(root, &["draft", "save", "a", "1", "--value", "v2"]).await.unwrap();
    assert_eq!(run(root, &["draft", "get", "a", "1"]).await.unwrap(), "v2\n");

    run(root, &["draft", "delete", "a", "1"]).await.unwrap();
    run(root, &["draft", "delete", "a", "1"]).await.unwrap();
    assert!(run(root, &["draft", "get", "a", "1"]).await.is_err());
}

#[tokio::test]
async fn test_queue_push_pop() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let id = run(root, &["queue", "push", "jobs", "--value", "job-x"]).await.unwrap();
    assert_eq!(id.trim().len(), 36);

    assert_eq!(run(root, &["queue", "pop", "jobs"]).await.unwrap(), "job-x\n");
    let err = run(root, &["queue", "pop", "jobs", "--timeout-ms", "50"])
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_config_command_prints_toml() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["--cache-capacity", "8", "config"]).await.unwrap();

    assert!(out.contains("kind = \"file-system\""));
    assert!(out.contains("capacity = 8"));
}

#[tokio::test]
async fn test_config_file_is_required_without_root() {
    let cli = Cli::try_parse_from(["docrepo", "document", "get", "a", "1"]).unwrap();
    let mut out = Vec::new();
    let err = commands::run(cli, &mut out).await.unwrap_err();
    assert!(matches!(err, CliError::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_config_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let repo_root = dir.path().join("repo");
    let config_path = dir.path().join("docrepo.toml");
    std::fs::write(
        &config_path,
        format!(
            "[backend]\nkind = \"file-system\"\nroot = {:?}\n\n[cache]\ncapacity = 4\n",
            repo_root.to_str().unwrap()
        ),
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "docrepo",
        "--config",
        config_path.to_str().unwrap(),
        "type",
        "create",
        "t",
        "1",
        "--value",
        "{}",
    ])
    .unwrap();
    let mut out = Vec::new();
    commands::run(cli, &mut out).await.unwrap();

    assert!(repo_root.join("types").join("t").join("1.json").is_file());
}
