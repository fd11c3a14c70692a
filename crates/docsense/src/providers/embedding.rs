//! Embedding capability and the gateway that guards it

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OllamaEmbedder`: Local Ollama server (nomic-embed-text)
/// - `GeminiEmbedder`: Google Generative Language API (text-embedding-004)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    ///
    /// Default implementation calls `embed` sequentially.
    /// Implementations should override for better performance.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensions reported by the model (0 if unknown)
    fn dimensions(&self) -> usize;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Validating front for an [`EmbeddingProvider`].
///
/// Every vector handed out has the same dimension, is finite and non-zero.
/// Any provider fault surfaces as [`Error::Embedding`]; the gateway never
/// substitutes a placeholder vector.
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
    dimensions: OnceLock<usize>,
    batch_size: usize,
}

impl EmbeddingGateway {
    /// Create a gateway. `dimensions == 0` takes the provider's reported
    /// dimension, or the first vector's length if the provider reports none.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, dimensions: usize, batch_size: usize) -> Self {
        let dims = OnceLock::new();
        let expected = if dimensions > 0 {
            dimensions
        } else {
            provider.dimensions()
        };
        if expected > 0 {
            let _ = dims.set(expected);
        }

        Self {
            provider,
            dimensions: dims,
            batch_size: batch_size.max(1),
        }
    }

    /// Create from the embeddings section of the config
    pub fn from_config(provider: Arc<dyn EmbeddingProvider>, config: &EmbeddingConfig) -> Self {
        Self::new(provider, config.dimensions, config.batch_size)
    }

    /// Dimension of produced vectors, once known
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions.get().copied()
    }

    /// Embed a single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self
            .provider
            .embed(text)
            .await
            .map_err(as_embedding_failure)?;
        self.check_vector(&vector)?;
        Ok(vector)
    }

    /// Embed many texts, preserving input order
    pub async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let embedded = self
                .provider
                .embed_batch(batch)
                .await
                .map_err(as_embedding_failure)?;

            if embedded.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "{} returned {} vectors for {} texts",
                    self.provider.name(),
                    embedded.len(),
                    batch.len()
                )));
            }

            for vector in &embedded {
                self.check_vector(vector)?;
            }
            vectors.extend(embedded);
        }

        tracing::debug!("Embedded {} texts via {}", texts.len(), self.provider.name());
        Ok(vectors)
    }

    fn check_vector(&self, vector: &[f32]) -> Result<()> {
        if vector.is_empty() {
            return Err(Error::embedding("provider returned an empty vector"));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::embedding("provider returned non-finite values"));
        }
        if vector.iter().all(|v| *v == 0.0) {
            return Err(Error::embedding("provider returned a zero vector"));
        }

        let expected = *self.dimensions.get_or_init(|| vector.len());
        if vector.len() != expected {
            return Err(Error::embedding(format!(
                "dimension mismatch: expected {}, got {}",
                expected,
                vector.len()
            )));
        }

        Ok(())
    }
}

fn as_embedding_failure(err: Error) -> Error {
    match err {
        Error::Embedding(_) => err,
        other => Error::embedding(other.to_string()),
    }
}
