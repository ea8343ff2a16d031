//! claimcheck: verifies natural-language economic claims against official
//! statistics.
//!
//! A claim is classified onto one of the MoSPI datasets, then walked through
//! the statistics server's four tools (discover, indicators, metadata, data)
//! over MCP. Model-backed collaborators pick parameters and filters at each
//! step and finally judge the claim against the fetched series.
//!
//! # Modules
//!
//! - [`core`]: shared vocabulary (datasets, filter sets, series, verdicts)
//! - [`mcp`]: tool gateway and the `rmcp` transport
//! - [`agent`]: LLM-backed collaborators
//! - [`pipeline`]: the claim checker and its leaves
//! - [`server`]: HTTP surface
//! - [`cli`]: command-line front end
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use claimcheck::agent::{AgentConfig, LlmCollaborators};
//! use claimcheck::mcp::McpGateway;
//! use claimcheck::pipeline::{ClaimChecker, DiscoveryCache, PipelineConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let agent = AgentConfig::from_env()?;
//! let checker = ClaimChecker::new(
//!     Arc::new(McpGateway),
//!     Arc::new(LlmCollaborators::from_config(&agent)?),
//!     Arc::new(DiscoveryCache::new()),
//!     PipelineConfig::from_env()?,
//! );
//! let outcome = checker.check("Unemployment fell below 4% in 2023").await;
//! println!("{}", outcome.to_body());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod error;
pub mod mcp;
pub mod pipeline;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AgentError, AttemptError, Error, Result, ToolError};
