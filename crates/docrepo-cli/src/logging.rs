// Logging setup for the docrepo binary

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber
///
/// `--verbose` forces debug output for the docrepo crates and `--quiet`
/// limits output to errors. Otherwise `RUST_LOG` applies, defaulting to
/// warnings.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("warn,docrepo=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
