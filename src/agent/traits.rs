//! Agent trait definition.
//!
//! Every collaborator (classifier, selectors, interpreter) implements this
//! trait, which turns a role (prompt, model, temperature) into a chat
//! request against any [`LlmProvider`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::message::{ChatRequest, ChatResponse, TokenUsage, system_message, user_message};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Trait implemented by all collaborator agents.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        true
    }

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.1
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Executes the agent with the given user message.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures, or
    /// [`AgentError::EmptyResponse`] when the model returns no content.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        let request = ChatRequest {
            model: self.model().to_string(),
            messages: vec![system_message(self.system_prompt()), user_message(user_msg)],
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
            json_mode: self.json_mode(),
        };

        let response: ChatResponse = provider.chat(&request).await?;
        if response.content.trim().is_empty() {
            return Err(AgentError::EmptyResponse { agent: self.name() });
        }

        tracing::debug!(
            agent = self.name(),
            tokens = response.usage.total_tokens,
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "agent call complete"
        );

        Ok(AgentResponse {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }
}

/// Strips a surrounding markdown code fence, if any.
#[must_use]
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    }
}

/// Parses an agent's JSON answer into `T`.
///
/// # Errors
///
/// Returns [`AgentError::ResponseParse`] with a preview of the content when
/// the answer is not valid JSON of the expected shape.
pub fn parse_json_response<T: DeserializeOwned>(
    response: &AgentResponse,
) -> Result<T, AgentError> {
    let json_str = strip_code_fence(&response.content);
    serde_json::from_str(json_str).map_err(|e| {
        let preview: String = json_str.chars().take(200).collect();
        let truncated = response
            .finish_reason
            .as_deref()
            .is_some_and(|r| r == "length");
        let hint = if truncated { " (response truncated)" } else { "" };
        AgentError::ResponseParse {
            message: format!("invalid JSON{hint}: {e}; preview: {preview:?}"),
            content: response.content.clone(),
        }
    })
}
