//! Tool gateway: one named remote tool call under a hard timeout.
//!
//! The gateway itself never retries. Retry and endpoint fallback belong to
//! the orchestrator, which sees every failure as a [`ToolError`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::ToolError;

/// Discover the datasets the server exposes.
pub const TOOL_DISCOVER: &str = "1_know_about_mospi_api";
/// List indicators for a dataset.
pub const TOOL_INDICATORS: &str = "2_get_indicators";
/// Retrieve filter metadata for a dataset.
pub const TOOL_METADATA: &str = "3_get_metadata";
/// Fetch data rows.
pub const TOOL_DATA: &str = "4_get_data";

/// Default per-call bound.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a tool call before payload resolution.
///
/// Mirrors the three places a tool result can carry its payload: the
/// structured field, the decoded data field, and the raw result itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawToolResult {
    /// Structured content, when the server sent one.
    pub structured: Option<Value>,
    /// Data decoded from the textual content.
    pub data: Option<Value>,
    /// The whole result as received.
    pub raw: Value,
}

impl RawToolResult {
    /// Resolves the payload: structured, else data, else raw.
    ///
    /// The first non-empty candidate wins.
    #[must_use]
    pub fn into_payload(self) -> Value {
        [self.structured, self.data]
            .into_iter()
            .flatten()
            .find(|v| !is_empty_value(v))
            .unwrap_or(self.raw)
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// An open session against one endpoint.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Invokes a named tool with JSON object arguments.
    async fn call(&self, tool: &str, arguments: Map<String, Value>)
    -> Result<RawToolResult, ToolError>;

    /// Closes the session. Failures are logged by the implementation.
    async fn close(self: Box<Self>);
}

/// Opens sessions against endpoints.
#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Connects to `endpoint`.
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn ToolSession>, ToolError>;
}

/// Connects under the given bound.
pub async fn connect(
    gateway: &dyn ToolGateway,
    endpoint: &str,
    timeout: Duration,
) -> Result<Box<dyn ToolSession>, ToolError> {
    tokio::time::timeout(timeout, gateway.connect(endpoint))
        .await
        .map_err(|_| ToolError::Timeout {
            tool: "connect".to_string(),
            after: timeout,
        })?
}

/// A resolved payload and how long the call took.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Resolved payload.
    pub payload: Value,
    /// Wall time of the call.
    pub elapsed: Duration,
}

/// Calls one tool under `timeout` and resolves its payload.
pub async fn call_tool(
    session: &dyn ToolSession,
    tool: &str,
    arguments: Map<String, Value>,
    timeout: Duration,
) -> Result<ToolOutput, ToolError> {
    let start = Instant::now();
    let result = tokio::time::timeout(timeout, session.call(tool, arguments))
        .await
        .map_err(|_| ToolError::Timeout {
            tool: tool.to_string(),
            after: timeout,
        })??;
    let elapsed = start.elapsed();
    info!(step = tool, duration = %format!("{:.2}s", elapsed.as_secs_f64()), "MCP step");

    let payload = result.into_payload();
    debug!(tool, kind = value_kind(&payload), "resolved tool payload");
    Ok(ToolOutput { payload, elapsed })
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Endpoints to try for a configured base URL, in order.
///
/// The base is trimmed of trailing slashes; a base already ending in `/mcp`
/// is the only candidate.
#[must_use]
pub fn candidate_endpoints(base_url: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/mcp") {
        vec![base.to_string()]
    } else {
        vec![base.to_string(), format!("{base}/mcp")]
    }
}
