//! Error types for claimcheck.
//!
//! Each layer owns its error enum: [`AgentError`] for the LLM-backed
//! collaborators, [`ToolError`] for remote tool calls, and [`AttemptError`]
//! for whatever aborted one `(endpoint, attempt)` of the pipeline. The
//! crate-level [`Error`] is what the binary and configuration code return.

use std::time::Duration;

use thiserror::Error;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Collaborator (LLM) failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Remote tool failure.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Invalid or missing configuration.
    #[error("configuration error: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the LLM-backed collaborators.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key configured.
    #[error("API key missing: set OPENAI_API_KEY")]
    ApiKeyMissing,

    /// Provider name not recognized.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Requested provider name.
        name: String,
    },

    /// The provider request failed.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Provider error text.
        message: String,
        /// HTTP status when known.
        status: Option<u16>,
    },

    /// The provider answered with no content.
    #[error("empty response from {agent}")]
    EmptyResponse {
        /// Agent that received the empty response.
        agent: &'static str,
    },

    /// The response could not be parsed into the expected shape.
    #[error("failed to parse response: {message}")]
    ResponseParse {
        /// Parse failure description.
        message: String,
        /// Raw response content.
        content: String,
    },
}

/// Errors raised by a remote tool session.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Opening the session failed.
    #[error("cannot connect to {endpoint}: {message}")]
    Connect {
        /// Endpoint URL.
        endpoint: String,
        /// Transport error text.
        message: String,
    },

    /// The call did not complete within its time bound.
    #[error("tool {tool} timed out after {after:?}")]
    Timeout {
        /// Tool name (or `"connect"`).
        tool: String,
        /// Bound that elapsed.
        after: Duration,
    },

    /// The session failed while the call was in flight.
    #[error("transport error calling {tool}: {message}")]
    Transport {
        /// Tool name.
        tool: String,
        /// Transport error text.
        message: String,
    },

    /// The tool ran but reported an error result.
    #[error("tool {tool} reported an error: {message}")]
    ToolFailed {
        /// Tool name.
        tool: String,
        /// Error text from the tool.
        message: String,
    },
}

/// Why one `(endpoint, attempt)` of the pipeline was abandoned.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// A tool call failed (connect, timeout, transport, tool error).
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// A collaborator failed mid-attempt.
    #[error("collaborator failed at {step}: {source}")]
    Collaborator {
        /// Pipeline step that invoked the collaborator.
        step: &'static str,
        /// Underlying failure.
        #[source]
        source: AgentError,
    },
}

impl AttemptError {
    /// Wraps a collaborator failure with the step it happened at.
    pub const fn collaborator(step: &'static str, source: AgentError) -> Self {
        Self::Collaborator { step, source }
    }

    /// Pipeline step or tool the failure happened at, for logs.
    pub fn step(&self) -> &str {
        match self {
            Self::Tool(
                ToolError::Timeout { tool, .. }
                | ToolError::Transport { tool, .. }
                | ToolError::ToolFailed { tool, .. },
            ) => tool,
            Self::Tool(ToolError::Connect { .. }) => "connect",
            Self::Collaborator { step, .. } => step,
        }
    }
}
