//! claimcheck binary entry point.

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use claimcheck::cli::{Cli, execute};

/// Installs the log subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` over `info`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = execute(&cli).await?;
    if !output.is_empty() {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", output.trim_end())?;
    }
    Ok(())
}
