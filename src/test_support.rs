//! Test doubles shared by unit tests.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::agent::message::{ChatRequest, ChatResponse, Role, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::error::AgentError;

/// Provider answering every request with the same content.
pub struct StaticProvider {
    content: String,
    last_user: Mutex<Option<String>>,
}

impl StaticProvider {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            last_user: Mutex::new(None),
        }
    }

    /// User message of the most recent request.
    pub fn last_request(&self) -> Option<String> {
        self.last_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LlmProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone());
        *self
            .last_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = user;
        Ok(ChatResponse {
            content: self.content.clone(),
            usage: TokenUsage::default(),
            finish_reason: Some("stop".to_string()),
        })
    }
}
