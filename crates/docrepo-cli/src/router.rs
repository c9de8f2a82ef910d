// Command line definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// docrepo - write-once document, citation and queue repository
#[derive(Parser, Debug)]
#[command(name = "docrepo")]
#[command(bin_name = "docrepo")]
#[command(about = "Inspect and modify a docrepo repository")]
#[command(version)]
#[command(author = "docrepo Contributors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML configuration file, overridable with DOCREPO_* variables
    #[arg(short, long, global = true, value_name = "PATH", conflicts_with = "root")]
    pub config: Option<PathBuf>,

    /// Use a filesystem repository rooted at DIR
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Cache capacity for --root repositories
    #[arg(long, global = true, value_name = "N")]
    pub cache_capacity: Option<usize>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimize output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write-once citations
    #[command(subcommand)]
    Citation(CitationCommand),

    /// Committed documents
    #[command(subcommand)]
    Document(RecordCommand),

    /// Type definitions
    #[command(subcommand)]
    Type(RecordCommand),

    /// Mutable drafts
    #[command(subcommand)]
    Draft(DraftCommand),

    /// Unordered message queues
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Print the resolved configuration as TOML
    Config,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CitationCommand {
    /// Print a citation as JSON
    Get { name: String },
    /// Report whether a citation exists
    Exists { name: String },
    /// Create a citation; fails if the name is taken
    Create {
        name: String,
        /// Tag of the cited document
        tag: String,
        /// Version of the cited document
        version: String,
        #[arg(long)]
        hash: String,
    },
}

/// Actions shared by documents and types
#[derive(Subcommand, Debug, Clone)]
pub enum RecordCommand {
    /// Print the stored payload
    Get(RecordId),
    /// Report whether the record exists
    Exists(RecordId),
    /// Store a payload; fails if the record exists
    Create {
        #[command(flatten)]
        id: RecordId,
        #[command(flatten)]
        value: ValueArg,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum DraftCommand {
    /// Print a draft
    Get(RecordId),
    /// Create or overwrite a draft
    Save {
        #[command(flatten)]
        id: RecordId,
        #[command(flatten)]
        value: ValueArg,
    },
    /// Remove a draft if present
    Delete(RecordId),
}

#[derive(Subcommand, Debug, Clone)]
pub enum QueueCommand {
    /// Enqueue a message and print its id
    Push {
        queue: String,
        #[command(flatten)]
        value: ValueArg,
    },
    /// Take one message, waiting up to --timeout-ms for one to arrive
    Pop {
        queue: String,
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RecordId {
    pub tag: String,
    pub version: String,
}

#[derive(Args, Debug, Clone)]
pub struct ValueArg {
    /// Payload; read from stdin when omitted
    #[arg(long)]
    pub value: Option<String>,
}
