//! LLM provider trait for text generation

use async_trait::async_trait;
use crate::error::Result;

/// Trait for prompt-in, text-out generation
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server (llama3.2, phi3, etc.)
/// - `GeminiClient`: Google Generative Language API (gemini-2.5-flash)
///
/// Failures (rate limits, network errors, malformed provider responses)
/// are reported as `Error::Generation`.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a fully composed prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
