//! MCP streamable HTTP client transport.
//!
//! Implements [`ToolGateway`] with `rmcp`: one client session per
//! `(endpoint, attempt)`, torn down when the attempt ends.

use async_trait::async_trait;
use rmcp::model::{CallToolRequestParams, CallToolResult, RawContent};
use rmcp::service::{Peer, RunningService};
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::{RoleClient, ServiceExt};
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::gateway::{RawToolResult, ToolGateway, ToolSession};
use crate::error::ToolError;

/// Gateway that speaks MCP over streamable HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct McpGateway;

#[async_trait]
impl ToolGateway for McpGateway {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn ToolSession>, ToolError> {
        debug!(endpoint, "opening MCP session");
        let transport = StreamableHttpClientTransport::from_uri(endpoint.to_string());
        let service = ().serve(transport).await.map_err(|e| ToolError::Connect {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        let peer = service.peer().clone();

        Ok(Box::new(McpSession {
            endpoint: endpoint.to_string(),
            peer,
            service: Mutex::new(Some(service)),
        }))
    }
}

struct McpSession {
    endpoint: String,
    peer: Peer<RoleClient>,
    service: Mutex<Option<RunningService<RoleClient, ()>>>,
}

#[async_trait]
impl ToolSession for McpSession {
    async fn call(
        &self,
        tool: &str,
        arguments: Map<String, Value>,
    ) -> Result<RawToolResult, ToolError> {
        let params: CallToolRequestParams =
            serde_json::from_value(json!({ "name": tool, "arguments": arguments })).map_err(
                |e| ToolError::Transport {
                    tool: tool.to_string(),
                    message: format!("invalid call parameters: {e}"),
                },
            )?;

        let result = self
            .peer
            .call_tool(params)
            .await
            .map_err(|e| ToolError::Transport {
                tool: tool.to_string(),
                message: e.to_string(),
            })?;

        if result.is_error == Some(true) {
            return Err(ToolError::ToolFailed {
                tool: tool.to_string(),
                message: joined_text(&result).unwrap_or_else(|| "no details".to_string()),
            });
        }

        Ok(into_raw_result(result))
    }

    async fn close(self: Box<Self>) {
        let Some(service) = self.service.lock().await.take() else {
            return;
        };
        if let Err(e) = service.cancel().await {
            warn!(endpoint = %self.endpoint, error = %e, "failed to close MCP session");
        }
    }
}

fn joined_text(result: &CallToolResult) -> Option<String> {
    let texts: Vec<&str> = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}

/// Splits a tool result into its three payload candidates.
fn into_raw_result(result: CallToolResult) -> RawToolResult {
    let data = joined_text(&result).map(|text| {
        serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text))
    });
    let raw = serde_json::to_value(&result).unwrap_or(Value::Null);

    RawToolResult {
        structured: result.structured_content,
        data,
        raw,
    }
}
