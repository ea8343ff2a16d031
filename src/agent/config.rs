//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default model for the classifier.
const DEFAULT_CLASSIFIER_MODEL: &str = "gpt-4.1-mini";
/// Default model for both selectors.
const DEFAULT_SELECTOR_MODEL: &str = "gpt-4.1-mini";
/// Default model for the interpreter.
const DEFAULT_INTERPRETER_MODEL: &str = "gpt-4.1";
/// Default response token cap.
const DEFAULT_MAX_TOKENS: u32 = 4096;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the LLM-backed collaborators.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for the claim classifier.
    pub classifier_model: String,
    /// Model for the indicator and filter selectors.
    pub selector_model: String,
    /// Model for the interpreter.
    pub interpreter_model: String,
    /// Maximum tokens per response.
    pub max_tokens: u32,
    /// Request timeout.
    pub timeout: Duration,
    /// Directory containing prompt template files.
    ///
    /// When set, system prompts are loaded from markdown files in this
    /// directory, falling back to compiled-in defaults for missing files.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    classifier_model: Option<String>,
    selector_model: Option<String>,
    interpreter_model: Option<String>,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("CLAIMCHECK_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL").ok();
        }
        if self.classifier_model.is_none() {
            self.classifier_model = std::env::var("CLAIMCHECK_CLASSIFIER_MODEL").ok();
        }
        if self.selector_model.is_none() {
            self.selector_model = std::env::var("CLAIMCHECK_SELECTOR_MODEL").ok();
        }
        if self.interpreter_model.is_none() {
            self.interpreter_model = std::env::var("CLAIMCHECK_INTERPRETER_MODEL").ok();
        }
        if self.max_tokens.is_none() {
            self.max_tokens = std::env::var("CLAIMCHECK_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.timeout.is_none() {
            self.timeout = std::env::var("CLAIMCHECK_LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("CLAIMCHECK_PROMPT_DIR")
                .ok()
                .map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the classifier model.
    #[must_use]
    pub fn classifier_model(mut self, model: impl Into<String>) -> Self {
        self.classifier_model = Some(model.into());
        self
    }

    /// Sets the selector model.
    #[must_use]
    pub fn selector_model(mut self, model: impl Into<String>) -> Self {
        self.selector_model = Some(model.into());
        self
    }

    /// Sets the interpreter model.
    #[must_use]
    pub fn interpreter_model(mut self, model: impl Into<String>) -> Self {
        self.interpreter_model = Some(model.into());
        self
    }

    /// Sets the response token cap.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            classifier_model: self
                .classifier_model
                .unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string()),
            selector_model: self
                .selector_model
                .unwrap_or_else(|| DEFAULT_SELECTOR_MODEL.to_string()),
            interpreter_model: self
                .interpreter_model
                .unwrap_or_else(|| DEFAULT_INTERPRETER_MODEL.to_string()),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
        })
    }
}
