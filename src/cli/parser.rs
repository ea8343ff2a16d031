//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// claimcheck: verify economic claims against official statistics.
#[derive(Parser, Debug)]
#[command(name = "claimcheck")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of the statistics tool server.
    #[arg(long, env = "MOSPI_MCP_URL", global = true)]
    pub mcp_url: Option<String>,

    /// Directory with prompt overrides.
    #[arg(long, env = "CLAIMCHECK_PROMPT_DIR", global = true)]
    pub prompt_dir: Option<PathBuf>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server.
    #[command(after_help = r#"Examples:
  claimcheck serve                       # Listen on 0.0.0.0:8000
  claimcheck serve --port 9000           # Custom port
  RUST_LOG=debug claimcheck serve        # Debug logging
"#)]
    Serve {
        /// Interface to bind.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind.
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Check one claim and print the response JSON.
    #[command(after_help = r#"Examples:
  claimcheck check "Unemployment in India fell below 4% in 2023"
  claimcheck check "Food inflation doubled last year" | jq .verdict
"#)]
    Check {
        /// Claim text.
        claim: String,
    },

    /// Write the default prompt files for customization.
    InitPrompts {
        /// Target directory (defaults to ~/.config/claimcheck/prompts).
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}
