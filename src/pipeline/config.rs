//! Pipeline configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use super::rate_limit::{DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW};
use crate::error::{Error, Result};
use crate::mcp::gateway::DEFAULT_TOOL_TIMEOUT;

/// Default upstream tool server.
pub const DEFAULT_MCP_URL: &str = "https://mcp.mospi.gov.in";

/// Delays applied before each attempt against one endpoint.
pub const DEFAULT_RETRY_DELAYS: [Duration; 3] = [
    Duration::ZERO,
    Duration::from_millis(500),
    Duration::from_secs(1),
];

/// Configuration for the verification pipeline and its HTTP front.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base URL of the tool server; `/mcp` is tried as a fallback.
    pub mcp_url: String,
    /// Bound on each connect and tool call.
    pub tool_timeout: Duration,
    /// One entry per attempt per endpoint; the delay precedes the attempt.
    pub retry_delays: Vec<Duration>,
    /// Requests admitted per client per window.
    pub rate_limit: u32,
    /// Rate-limit window.
    pub rate_window: Duration,
    /// Lifetime of the cached dataset overview; `None` keeps it forever.
    pub discovery_ttl: Option<Duration>,
    /// Bound on the whole endpoint/attempt loop of one request.
    pub request_deadline: Option<Duration>,
    /// Where raw payload dumps go; `None` disables them.
    pub debug_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mcp_url: DEFAULT_MCP_URL.to_string(),
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            retry_delays: DEFAULT_RETRY_DELAYS.to_vec(),
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window: DEFAULT_RATE_WINDOW,
            discovery_ttl: None,
            request_deadline: None,
            debug_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Creates a new builder for `PipelineConfig`.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the resulting values are unusable.
    pub fn from_env() -> Result<Self> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    mcp_url: Option<String>,
    tool_timeout: Option<Duration>,
    retry_delays: Option<Vec<Duration>>,
    rate_limit: Option<u32>,
    rate_window: Option<Duration>,
    discovery_ttl: Option<Duration>,
    request_deadline: Option<Duration>,
    debug_dir: Option<PathBuf>,
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

impl PipelineConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.mcp_url.is_none() {
            self.mcp_url = std::env::var("MOSPI_MCP_URL").ok();
        }
        if self.tool_timeout.is_none() {
            self.tool_timeout = env_secs("CLAIMCHECK_TOOL_TIMEOUT_SECS");
        }
        if self.rate_limit.is_none() {
            self.rate_limit = std::env::var("CLAIMCHECK_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.rate_window.is_none() {
            self.rate_window = env_secs("CLAIMCHECK_RATE_WINDOW_SECS");
        }
        if self.discovery_ttl.is_none() {
            self.discovery_ttl = env_secs("CLAIMCHECK_DISCOVERY_TTL_SECS");
        }
        if self.request_deadline.is_none() {
            self.request_deadline = env_secs("CLAIMCHECK_REQUEST_DEADLINE_SECS");
        }
        if self.debug_dir.is_none() {
            self.debug_dir = std::env::var("CLAIMCHECK_DEBUG_DIR")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("DEBUG_CLAIM_LOG")
                        .ok()
                        .filter(|v| v.eq_ignore_ascii_case("true"))
                        .map(|_| PathBuf::from("."))
                });
        }
        self
    }

    /// Sets the tool server base URL.
    #[must_use]
    pub fn mcp_url(mut self, url: impl Into<String>) -> Self {
        self.mcp_url = Some(url.into());
        self
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub const fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Sets the per-attempt delays (one attempt per entry).
    #[must_use]
    pub fn retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = Some(delays);
        self
    }

    /// Sets the per-client request limit.
    #[must_use]
    pub const fn rate_limit(mut self, limit: u32) -> Self {
        self.rate_limit = Some(limit);
        self
    }

    /// Sets the rate-limit window.
    #[must_use]
    pub const fn rate_window(mut self, window: Duration) -> Self {
        self.rate_window = Some(window);
        self
    }

    /// Expires the cached dataset overview after `ttl`.
    #[must_use]
    pub const fn discovery_ttl(mut self, ttl: Duration) -> Self {
        self.discovery_ttl = Some(ttl);
        self
    }

    /// Bounds the whole retry loop of one request.
    #[must_use]
    pub const fn request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = Some(deadline);
        self
    }

    /// Enables raw payload dumps into `dir`.
    #[must_use]
    pub fn debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    /// Builds the [`PipelineConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty URL, an empty delay list, a
    /// zero rate limit, or a zero timeout.
    pub fn build(self) -> Result<PipelineConfig> {
        let mcp_url = self
            .mcp_url
            .unwrap_or_else(|| DEFAULT_MCP_URL.to_string());
        if mcp_url.trim().is_empty() {
            return Err(config_error("MCP URL must not be empty"));
        }
        let retry_delays = self
            .retry_delays
            .unwrap_or_else(|| DEFAULT_RETRY_DELAYS.to_vec());
        if retry_delays.is_empty() {
            return Err(config_error("at least one attempt per endpoint is required"));
        }
        let rate_limit = self.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT);
        if rate_limit == 0 {
            return Err(config_error("rate limit must be positive"));
        }
        let tool_timeout = self.tool_timeout.unwrap_or(DEFAULT_TOOL_TIMEOUT);
        if tool_timeout.is_zero() {
            return Err(config_error("tool timeout must be positive"));
        }

        Ok(PipelineConfig {
            mcp_url,
            tool_timeout,
            retry_delays,
            rate_limit,
            rate_window: self.rate_window.unwrap_or(DEFAULT_RATE_WINDOW),
            discovery_ttl: self.discovery_ttl,
            request_deadline: self.request_deadline,
            debug_dir: self.debug_dir,
        })
    }
}

fn config_error(message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder()
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.mcp_url, DEFAULT_MCP_URL);
        assert_eq!(config.tool_timeout, Duration::from_secs(30));
        assert_eq!(config.retry_delays.len(), 3);
        assert_eq!(config.rate_limit, 20);
        assert_eq!(config.rate_window, Duration::from_secs(3600));
        assert!(config.discovery_ttl.is_none());
        assert!(config.debug_dir.is_none());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .mcp_url("http://127.0.0.1:9000")
            .retry_delays(vec![Duration::ZERO])
            .rate_limit(2)
            .request_deadline(Duration::from_secs(90))
            .debug_dir("/tmp/claims")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.mcp_url, "http://127.0.0.1:9000");
        assert_eq!(config.retry_delays, vec![Duration::ZERO]);
        assert_eq!(config.rate_limit, 2);
        assert_eq!(config.request_deadline, Some(Duration::from_secs(90)));
        assert_eq!(config.debug_dir, Some(PathBuf::from("/tmp/claims")));
    }

    #[test]
    fn test_builder_rejects_unusable_values() {
        assert!(PipelineConfig::builder().retry_delays(vec![]).build().is_err());
        assert!(PipelineConfig::builder().rate_limit(0).build().is_err());
        assert!(PipelineConfig::builder().mcp_url(" ").build().is_err());
        assert!(
            PipelineConfig::builder()
                .tool_timeout(Duration::ZERO)
                .build()
                .is_err()
        );
    }
}
