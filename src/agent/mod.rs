//! LLM-backed collaborators.
//!
//! Four single-shot agents make the pipeline's judgment calls. Each one
//! renders a JSON user message, sends it with its own system prompt through
//! a pluggable [`LlmProvider`], and parses a JSON answer.
//!
//! # Architecture
//!
//! ```text
//! ClaimChecker ─► Collaborators (trait, crate::pipeline)
//!                   └── LlmCollaborators
//!                         ├── ClassifierAgent   (claim → datasets)
//!                         ├── IndicatorAgent    (indicators → params, claim type)
//!                         ├── FilterAgent       (metadata → filters)
//!                         └── InterpreterAgent  (series → verdict)
//!                               ↓
//!                         LlmProvider (OpenAI-compatible)
//! ```

pub mod classifier;
pub mod client;
pub mod collaborators;
pub mod config;
pub mod filter;
pub mod indicator;
pub mod interpreter;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod traits;

pub use classifier::ClassifierAgent;
pub use collaborators::LlmCollaborators;
pub use config::AgentConfig;
pub use filter::FilterAgent;
pub use indicator::IndicatorAgent;
pub use interpreter::InterpreterAgent;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use traits::Agent;
