//! Selector-B: data filters for the fetch step.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::prompt::build_selector_b_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, parse_json_response};
use crate::core::verdict::FilterSelection;
use crate::error::AgentError;
use crate::pipeline::FilterRequest;

/// Agent choosing primary and benchmark filters from filter metadata.
pub struct FilterAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl FilterAgent {
    /// Creates the agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.selector_model.clone(),
            max_tokens: config.max_tokens,
            system_prompt,
        }
    }

    /// Chooses filters; all values come back as strings.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on provider failure or unparseable output.
    pub async fn select(
        &self,
        provider: &dyn LlmProvider,
        request: &FilterRequest<'_>,
    ) -> Result<FilterSelection, AgentError> {
        let message = build_selector_b_prompt(
            request.claim,
            request.dataset,
            request.claim_type,
            request.metadata,
            request.indicator_params,
            request.pagination_hint,
        );
        let response = self.execute(provider, &message).await?;
        parse_json_response(&response)
    }
}

#[async_trait]
impl Agent for FilterAgent {
    fn name(&self) -> &'static str {
        "selector_b"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
