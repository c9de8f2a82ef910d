// docrepo CLI entry point

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use docrepo_cli::{commands, logging, router::Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let mut stdout = std::io::stdout().lock();
    if let Err(err) = runtime.block_on(commands::run(cli, &mut stdout)) {
        stdout.flush().context("failed to flush output")?;
        eprintln!("{}", err.user_message());
        std::process::exit(err.exit_code());
    }

    stdout.flush().context("failed to flush output")?;
    Ok(())
}
