//! Claim classifier agent.
//!
//! Decides whether a claim is answerable from the datasets at all and, if
//! so, which dataset to query first.

use async_trait::async_trait;
use serde_json::Value;

use super::config::AgentConfig;
use super::prompt::build_classifier_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, parse_json_response};
use crate::core::verdict::Classification;
use crate::error::AgentError;

/// Agent that maps a claim onto datasets.
pub struct ClassifierAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl ClassifierAgent {
    /// Creates a classifier with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.classifier_model.clone(),
            max_tokens: config.max_tokens,
            system_prompt,
        }
    }

    /// Classifies `claim`, optionally guided by the cached dataset overview.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on provider failure or unparseable output.
    pub async fn classify(
        &self,
        provider: &dyn LlmProvider,
        claim: &str,
        overview: Option<&Value>,
    ) -> Result<Classification, AgentError> {
        let response = self
            .execute(provider, &build_classifier_prompt(claim, overview))
            .await?;
        parse_json_response(&response)
    }
}

#[async_trait]
impl Agent for ClassifierAgent {
    fn name(&self) -> &'static str {
        "classifier"
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
