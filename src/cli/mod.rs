//! CLI layer for claimcheck.
//!
//! Provides the command-line interface using clap: an HTTP server, a
//! one-shot claim check, and prompt scaffolding.

pub mod commands;
pub mod parser;

pub use commands::{build_checker, execute};
pub use parser::{Cli, Commands};
