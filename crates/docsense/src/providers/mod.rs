//! Provider abstractions for embeddings and LLM generation
//!
//! The core only talks to the two capability traits, so backends can be
//! switched between local (Ollama) and cloud (Gemini) through config.

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod ollama;
mod retry;

pub use embedding::{EmbeddingGateway, EmbeddingProvider};
pub use gemini::{GeminiClient, GeminiEmbedder};
pub use llm::LlmProvider;
pub use ollama::{OllamaEmbedder, OllamaLlm, OllamaProvider};
pub use retry::{AttemptError, RetryPolicy};
