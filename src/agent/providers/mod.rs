//! Concrete [`LlmProvider`](super::provider::LlmProvider) backends.

mod openai;

pub use openai::OpenAiProvider;
