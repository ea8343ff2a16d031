//! Interpreter agent: turns normalized data into a verdict.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::prompt::build_interpreter_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, parse_json_response};
use crate::core::verdict::Interpretation;
use crate::error::AgentError;
use crate::pipeline::InterpretRequest;

/// Agent judging a claim against the fetched series.
pub struct InterpreterAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl InterpreterAgent {
    /// Creates the agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.interpreter_model.clone(),
            max_tokens: config.max_tokens,
            system_prompt,
        }
    }

    /// Produces a verdict, headline, explanation and chart data.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on provider failure or unparseable output.
    pub async fn interpret(
        &self,
        provider: &dyn LlmProvider,
        request: &InterpretRequest<'_>,
    ) -> Result<Interpretation, AgentError> {
        let message = build_interpreter_prompt(
            request.claim,
            request.dataset,
            request.indicator,
            request.filters,
            request.data,
            request.source_hint,
        );
        let response = self.execute(provider, &message).await?;
        parse_json_response(&response)
    }
}

#[async_trait]
impl Agent for InterpreterAgent {
    fn name(&self) -> &'static str {
        "interpreter"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        0.2
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::INTERPRETER_SYSTEM_PROMPT;
    use crate::core::dataset::Dataset;
    use crate::core::filters::FilterSet;
    use crate::core::series::{NormalizedResult, SeriesPoint};
    use crate::core::verdict::Verdict;
    use crate::test_support::StaticProvider;

    fn agent() -> InterpreterAgent {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        InterpreterAgent::new(&config, INTERPRETER_SYSTEM_PROMPT.to_string())
    }

    #[test]
    fn test_agent_properties() {
        let agent = agent();
        assert_eq!(agent.model(), "gpt-4.1");
        assert!((agent.temperature() - 0.2).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_interpret_parses_verdict() {
        let provider = StaticProvider::new(
            r#"{"verdict": "confirmed", "headlineStat": "5.4%", "explanation": "Inflation rose.",
                "chartData": [{"year": "2023", "value": 5.4}], "source": "CPI (MoSPI), 2023"}"#,
        );
        let filters = FilterSet::new();
        let data = NormalizedResult::Series(vec![SeriesPoint {
            period: "2023".to_string(),
            value: 5.4,
        }]);
        let request = InterpretRequest {
            claim: "inflation rose",
            dataset: Dataset::Cpi,
            indicator: "general index",
            filters: &filters,
            data: &data,
            source_hint: "CPI (MoSPI)",
        };

        let interpretation = agent()
            .interpret(&provider, &request)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(interpretation.verdict, Verdict::Confirmed);
        assert_eq!(interpretation.chart_data.len(), 1);
        let sent = provider.last_request().unwrap_or_default();
        assert!(sent.contains("data_rows"));
        assert!(sent.contains("CPI (MoSPI)"));
    }

    #[tokio::test]
    async fn test_interpret_rejects_unknown_verdict() {
        let provider = StaticProvider::new(
            r#"{"verdict": "maybe", "headlineStat": "", "explanation": "", "source": ""}"#,
        );
        let filters = FilterSet::new();
        let data = NormalizedResult::Series(Vec::new());
        let request = InterpretRequest {
            claim: "c",
            dataset: Dataset::Wpi,
            indicator: "c",
            filters: &filters,
            data: &data,
            source_hint: "WPI (MoSPI)",
        };
        let result = agent().interpret(&provider, &request).await;
        assert!(matches!(result, Err(AgentError::ResponseParse { .. })));
    }
}
