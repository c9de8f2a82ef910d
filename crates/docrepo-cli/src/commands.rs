// Command execution against a repository

use std::io::{Read, Write};
use std::time::Duration;

use docrepo_cache::CacheConfig;
use docrepo_config::{open_repository, ConfigLoader, RepositoryConfig};
use docrepo_core::{Citation, CitationName, DocumentId, QueueName, Repository};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::{
    error::{CliError, CliResult},
    router::{
        CitationCommand, Cli, Commands, DraftCommand, QueueCommand, RecordCommand, RecordId,
        ValueArg,
    },
};

/// Delay between dequeue attempts while `queue pop --timeout-ms` waits
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Resolve configuration, open the repository and run the command
pub async fn run<W: Write>(cli: Cli, out: &mut W) -> CliResult<()> {
    let config = resolve_config(&cli)?;
    if let Commands::Config = cli.command {
        write!(out, "{}", config.to_toml()?)?;
        return Ok(());
    }

    let repo = open_repository(&config)?;
    execute(cli.command, repo.as_ref(), out).await
}

/// Build the repository configuration from `--root` or `--config`
pub fn resolve_config(cli: &Cli) -> CliResult<RepositoryConfig> {
    match (&cli.root, &cli.config) {
        (Some(root), _) => {
            let config = RepositoryConfig::file_system(root);
            Ok(match cli.cache_capacity {
                Some(capacity) => config.with_cache(CacheConfig::with_capacity(capacity)),
                None => config,
            })
        }
        (None, Some(_)) if cli.cache_capacity.is_some() => Err(CliError::InvalidArgument {
            message: "--cache-capacity only applies with --root; set [cache] in the config file"
                .to_string(),
        }),
        (None, Some(path)) => Ok(ConfigLoader::with_path(path).load()?),
        (None, None) => Err(CliError::InvalidArgument {
            message: "pass --config <PATH> or --root <DIR>".to_string(),
        }),
    }
}

/// Run a repository command, writing results to `out`
pub async fn execute<W: Write>(
    command: Commands,
    repo: &dyn Repository,
    out: &mut W,
) -> CliResult<()> {
    match command {
        Commands::Citation(command) => citation(command, repo, out).await,
        Commands::Document(command) => document(command, repo, out).await,
        Commands::Type(command) => type_definition(command, repo, out).await,
        Commands::Draft(command) => draft(command, repo, out).await,
        Commands::Queue(command) => queue(command, repo, out).await,
        Commands::Config => Err(CliError::InvalidArgument {
            message: "config does not operate on a repository".to_string(),
        }),
    }
}

async fn citation<W: Write>(
    command: CitationCommand,
    repo: &dyn Repository,
    out: &mut W,
) -> CliResult<()> {
    match command {
        CitationCommand::Get { name } => {
            let citation = repo
                .fetch_citation(&CitationName::new(name.as_str()))
                .await?
                .ok_or_else(|| CliError::NotFound(format!("citation '{name}'")))?;
            let json = serde_json::to_string_pretty(&citation).map_err(std::io::Error::from)?;
            writeln!(out, "{json}")?;
        }
        CitationCommand::Exists { name } => {
            let exists = repo.citation_exists(&CitationName::new(name)).await?;
            writeln!(out, "{exists}")?;
        }
        CitationCommand::Create {
            name,
            tag,
            version,
            hash,
        } => {
            repo.create_citation(&Citation::new(name.as_str(), tag, version, hash))
                .await?;
            info!("Created citation '{name}'");
        }
    }
    Ok(())
}

async fn document<W: Write>(
    command: RecordCommand,
    repo: &dyn Repository,
    out: &mut W,
) -> CliResult<()> {
    match command {
        RecordCommand::Get(id) => {
            let id = document_id(id);
            let content = repo
                .fetch_document(&id)
                .await?
                .ok_or_else(|| CliError::NotFound(format!("document {id}")))?;
            writeln!(out, "{content}")?;
        }
        RecordCommand::Exists(id) => {
            writeln!(out, "{}", repo.document_exists(&document_id(id)).await?)?;
        }
        RecordCommand::Create { id, value } => {
            let id = document_id(id);
            repo.create_document(&id, &payload(value)?).await?;
            info!("Created document {id}");
        }
    }
    Ok(())
}

async fn type_definition<W: Write>(
    command: RecordCommand,
    repo: &dyn Repository,
    out: &mut W,
) -> CliResult<()> {
    match command {
        RecordCommand::Get(id) => {
            let id = document_id(id);
            let definition = repo
                .fetch_type(&id)
                .await?
                .ok_or_else(|| CliError::NotFound(format!("type {id}")))?;
            writeln!(out, "{definition}")?;
        }
        RecordCommand::Exists(id) => {
            writeln!(out, "{}", repo.type_exists(&document_id(id)).await?)?;
        }
        RecordCommand::Create { id, value } => {
            let id = document_id(id);
            repo.create_type(&id, &payload(value)?).await?;
            info!("Created type {id}");
        }
    }
    Ok(())
}

async fn draft<W: Write>(command: DraftCommand, repo: &dyn Repository, out: &mut W) -> CliResult<()> {
    match command {
        DraftCommand::Get(id) => {
            let id = document_id(id);
            let content = repo
                .fetch_draft(&id)
                .await?
                .ok_or_else(|| CliError::NotFound(format!("draft {id}")))?;
            writeln!(out, "{content}")?;
        }
        DraftCommand::Save { id, value } => {
            let id = document_id(id);
            repo.save_draft(&id, &payload(value)?).await?;
            info!("Saved draft {id}");
        }
        DraftCommand::Delete(id) => {
            repo.delete_draft(&document_id(id)).await?;
        }
    }
    Ok(())
}

async fn queue<W: Write>(command: QueueCommand, repo: &dyn Repository, out: &mut W) -> CliResult<()> {
    match command {
        QueueCommand::Push { queue, value } => {
            let id = repo
                .enqueue(&QueueName::new(queue), &payload(value)?)
                .await?;
            writeln!(out, "{id}")?;
        }
        QueueCommand::Pop { queue, timeout_ms } => {
            let name = QueueName::new(queue.as_str());
            let deadline = timeout_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
            loop {
                if let Some(message) = repo.dequeue(&name).await? {
                    writeln!(out, "{message}")?;
                    break;
                }
                match deadline {
                    Some(deadline) if Instant::now() < deadline => {
                        debug!("Queue '{queue}' empty, polling again");
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        tokio::time::sleep(POLL_INTERVAL.min(remaining)).await;
                    }
                    _ => return Err(CliError::NotFound(format!("message in queue '{queue}'"))),
                }
            }
        }
    }
    Ok(())
}

fn document_id(id: RecordId) -> DocumentId {
    DocumentId::new(id.tag, id.version)
}

/// `--value`, or stdin with one trailing newline removed
fn payload(value: ValueArg) -> CliResult<String> {
    if let Some(value) = value.value {
        return Ok(value);
    }

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    if input.ends_with('\n') {
        input.pop();
        if input.ends_with('\r') {
            input.pop();
        }
    }
    Ok(input)
}
