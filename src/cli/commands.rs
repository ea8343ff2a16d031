//! CLI command implementations.

use std::fmt::Write as FmtWrite;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::agent::{AgentConfig, LlmCollaborators, PromptSet};
use crate::cli::parser::{Cli, Commands};
use crate::mcp::McpGateway;
use crate::pipeline::{ClaimChecker, DiscoveryCache, PipelineConfig};
use crate::server::{AppState, serve};

/// Executes the CLI command and returns what should be printed.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the command fails.
pub async fn execute(cli: &Cli) -> Result<String> {
    match &cli.command {
        Commands::Serve { host, port } => cmd_serve(cli, host, *port).await,
        Commands::Check { claim } => cmd_check(cli, claim).await,
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref()),
    }
}

/// Wires the production checker: MCP gateway, LLM collaborators and a
/// fresh discovery cache.
///
/// # Errors
///
/// Returns an error if either configuration is invalid.
pub fn build_checker(cli: &Cli) -> Result<ClaimChecker> {
    let mut pipeline = PipelineConfig::builder();
    if let Some(url) = &cli.mcp_url {
        pipeline = pipeline.mcp_url(url);
    }
    let pipeline = pipeline
        .from_env()
        .build()
        .context("invalid pipeline configuration")?;

    let mut agent = AgentConfig::builder();
    if let Some(dir) = &cli.prompt_dir {
        agent = agent.prompt_dir(dir);
    }
    let agent = agent
        .from_env()
        .build()
        .context("invalid model configuration")?;

    let collaborators = LlmCollaborators::from_config(&agent)?;
    let discovery = pipeline
        .discovery_ttl
        .map_or_else(DiscoveryCache::new, DiscoveryCache::with_ttl);

    Ok(ClaimChecker::new(
        Arc::new(McpGateway),
        Arc::new(collaborators),
        Arc::new(discovery),
        pipeline,
    ))
}

async fn cmd_serve(cli: &Cli, host: &str, port: u16) -> Result<String> {
    let checker = build_checker(cli)?;
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown requested");
        trigger.cancel();
    });

    serve(listener, AppState::from_checker(checker), shutdown).await?;
    Ok(String::new())
}

async fn cmd_check(cli: &Cli, claim: &str) -> Result<String> {
    let checker = build_checker(cli)?;
    let outcome = checker.check(claim).await;
    Ok(serde_json::to_string_pretty(&outcome.to_body())?)
}

fn cmd_init_prompts(dir: Option<&Path>) -> Result<String> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => PromptSet::default_dir().context("cannot determine home directory")?,
    };
    let written = PromptSet::write_defaults(&dir)
        .with_context(|| format!("cannot write prompts to {}", dir.display()))?;

    let mut output = String::new();
    if written.is_empty() {
        let _ = writeln!(output, "All prompt files already exist in {}", dir.display());
    }
    for path in written {
        let _ = writeln!(output, "Wrote {}", path.display());
    }
    Ok(output)
}
