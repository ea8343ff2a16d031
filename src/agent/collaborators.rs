//! Model-backed [`Collaborators`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::classifier::ClassifierAgent;
use super::client::create_provider;
use super::config::AgentConfig;
use super::filter::FilterAgent;
use super::indicator::IndicatorAgent;
use super::interpreter::InterpreterAgent;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use crate::core::dataset::Dataset;
use crate::core::verdict::{Classification, FilterSelection, IndicatorSelection, Interpretation};
use crate::error::AgentError;
use crate::pipeline::{Collaborators, FilterRequest, InterpretRequest};

/// The four agents sharing one provider.
pub struct LlmCollaborators {
    provider: Arc<dyn LlmProvider>,
    classifier: ClassifierAgent,
    indicator: IndicatorAgent,
    filter: FilterAgent,
    interpreter: InterpreterAgent,
}

impl LlmCollaborators {
    /// Builds the agents from configuration, loading prompts from
    /// `config.prompt_dir` when set.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnsupportedProvider`] for an unknown provider.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let provider = create_provider(config)?;
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Ok(Self::with_provider(provider, config, prompts))
    }

    /// Builds the agents around an existing provider.
    #[must_use]
    pub fn with_provider(
        provider: Arc<dyn LlmProvider>,
        config: &AgentConfig,
        prompts: PromptSet,
    ) -> Self {
        Self {
            provider,
            classifier: ClassifierAgent::new(config, prompts.classifier),
            indicator: IndicatorAgent::new(config, prompts.selector_a),
            filter: FilterAgent::new(config, prompts.selector_b),
            interpreter: InterpreterAgent::new(config, prompts.interpreter),
        }
    }
}

#[async_trait]
impl Collaborators for LlmCollaborators {
    async fn classify(
        &self,
        claim: &str,
        overview: Option<&Value>,
    ) -> Result<Classification, AgentError> {
        self.classifier
            .classify(self.provider.as_ref(), claim, overview)
            .await
    }

    async fn select_indicator(
        &self,
        claim: &str,
        dataset: Dataset,
        indicators: &Value,
    ) -> Result<IndicatorSelection, AgentError> {
        self.indicator
            .select(self.provider.as_ref(), claim, dataset, indicators)
            .await
    }

    async fn select_filters(
        &self,
        request: FilterRequest<'_>,
    ) -> Result<FilterSelection, AgentError> {
        self.filter.select(self.provider.as_ref(), &request).await
    }

    async fn interpret(
        &self,
        request: InterpretRequest<'_>,
    ) -> Result<Interpretation, AgentError> {
        self.interpreter
            .interpret(self.provider.as_ref(), &request)
            .await
    }
}
