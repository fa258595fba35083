pub mod gemini;

#[cfg(test)]
pub mod stub;

use crate::domain::error::Result;
use async_trait::async_trait;

pub use gemini::GeminiClient;

/// Text-generation capability. Clients carry their own model and credentials.
#[async_trait]
pub trait LLMClient {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
