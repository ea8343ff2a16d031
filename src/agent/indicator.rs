//! Selector-A: indicator parameters and claim shape.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::config::AgentConfig;
use super::prompt::build_selector_a_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, parse_json_response};
use crate::core::dataset::{ClaimType, Dataset};
use crate::core::filters::{FilterSet, deserialize_filter_set};
use crate::core::verdict::IndicatorSelection;
use crate::error::AgentError;

#[derive(Debug, Deserialize)]
struct RawSelection {
    #[serde(default, deserialize_with = "deserialize_filter_set")]
    params: FilterSet,
    #[serde(default)]
    claim_type: Option<ClaimType>,
}

/// Agent choosing the metadata-step parameters for a dataset.
pub struct IndicatorAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl IndicatorAgent {
    /// Creates the agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.selector_model.clone(),
            max_tokens: config.max_tokens,
            system_prompt,
        }
    }

    /// Picks indicator parameters from the indicator listing.
    ///
    /// A missing `claim_type` becomes [`ClaimType::Other`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on provider failure or unparseable output.
    pub async fn select(
        &self,
        provider: &dyn LlmProvider,
        claim: &str,
        dataset: Dataset,
        indicators: &Value,
    ) -> Result<IndicatorSelection, AgentError> {
        let response = self
            .execute(provider, &build_selector_a_prompt(claim, dataset, indicators))
            .await?;
        let raw: RawSelection = parse_json_response(&response)?;
        Ok(IndicatorSelection {
            params: normalize_params(dataset, raw.params),
            claim_type: raw.claim_type.unwrap_or(ClaimType::Other),
        })
    }
}

/// Reduces PLFS frequency labels such as `frequency_code_1_Annual` to their
/// code.
fn normalize_params(dataset: Dataset, params: FilterSet) -> FilterSet {
    params
        .into_iter()
        .map(|(key, value)| {
            if dataset == Dataset::Plfs
                && key == "frequency_code"
                && let Some(code) = value
                    .strip_prefix("frequency_code_")
                    .and_then(|rest| rest.split('_').next())
                    .filter(|code| !code.is_empty())
            {
                let code = code.to_string();
                return (key, code);
            }
            (key, value)
        })
        .collect()
}

#[async_trait]
impl Agent for IndicatorAgent {
    fn name(&self) -> &'static str {
        "selector_a"
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
