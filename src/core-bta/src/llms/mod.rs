pub mod openai;

#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

use async_trait::async_trait;

pub use openai::OpenAiProvider;

use crate::Error;

/// Interface to a hosted LLM that lets us complete a prompt and await a response.
///
/// `system` carries the persona of whoever is answering and `prompt` carries the task.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, Error>;
}
