//! Remote tool protocol (MCP client side).
//!
//! The verification pipeline reaches the statistics server through four
//! named tools. [`gateway`] defines the seam the pipeline depends on;
//! [`transport`] is the `rmcp` implementation used in production.
//!
//! # Architecture
//!
//! ```text
//! Orchestrator
//!   ↓ connect(endpoint)            (bounded by the tool timeout)
//! ToolGateway ──► ToolSession
//!   ↓ call_tool(name, arguments)   (bounded by the tool timeout)
//! RawToolResult → payload (structured | data | raw)
//! ```

pub mod gateway;
pub mod transport;

pub use gateway::{
    DEFAULT_TOOL_TIMEOUT, RawToolResult, TOOL_DATA, TOOL_DISCOVER, TOOL_INDICATORS, TOOL_METADATA,
    ToolGateway, ToolOutput, ToolSession, call_tool, candidate_endpoints, connect,
};
pub use transport::McpGateway;
