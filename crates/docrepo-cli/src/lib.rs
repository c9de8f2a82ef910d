//! docrepo command line interface
//!
//! The `docrepo` binary parses [`router::Cli`], resolves a repository
//! configuration and runs one command through [`commands::run`].

pub mod commands;
pub mod error;
pub mod logging;
pub mod router;

pub use error::{CliError, CliResult};
