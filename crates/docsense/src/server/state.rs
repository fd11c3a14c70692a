//! Application state for the HTTP server

use std::sync::Arc;

use crate::analysis::AnalysisEngine;
use crate::config::{BackendProvider, RagConfig};
use crate::error::{Error, Result};
use crate::providers::{
    EmbeddingGateway, EmbeddingProvider, GeminiClient, GeminiEmbedder, LlmProvider,
    OllamaProvider,
};
use crate::query::QueryEngine;
use crate::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Session registry
    store: Arc<SessionStore>,
    /// Retrieval-augmented query engine
    query: QueryEngine,
    /// Structured analysis engine
    analysis: AnalysisEngine,
    /// LLM provider (Ollama or Gemini)
    llm: Arc<dyn LlmProvider>,
}

impl AppState {
    /// Create state with the providers selected by `config.backend`
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing application state (backend: {})", config.backend.as_str());

        let (embedder, llm): (Arc<dyn EmbeddingProvider>, Arc<dyn LlmProvider>) = match config.backend {
            BackendProvider::Ollama => {
                let (embedder, llm) =
                    OllamaProvider::new(&config.llm, config.embeddings.dimensions)?.split();
                tracing::info!(
                    "Ollama at {} (embed: {}, generate: {})",
                    config.llm.base_url,
                    config.llm.embed_model,
                    config.llm.generate_model
                );
                (Arc::new(embedder), Arc::new(llm))
            }
            BackendProvider::Gemini => {
                tracing::info!(
                    "Gemini (embed: {}, generate: {})",
                    config.gemini.embedding_model,
                    config.gemini.generation_model
                );
                (
                    Arc::new(GeminiEmbedder::new(&config.gemini)?),
                    Arc::new(GeminiClient::new(&config.gemini)?),
                )
            }
        };

        Self::from_providers(config, embedder, llm)
    }

    /// Create state around explicit providers
    pub fn from_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let gateway = Arc::new(EmbeddingGateway::from_config(embedder, &config.embeddings));
        let store = Arc::new(SessionStore::from_config(gateway, &config)?);
        let query = QueryEngine::new(
            Arc::clone(&store),
            Arc::clone(&llm),
            config.retrieval.fallback_window,
        );
        let analysis = AnalysisEngine::new(Arc::clone(&llm));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                query,
                analysis,
                llm,
            }),
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.inner.store
    }

    pub fn query_engine(&self) -> &QueryEngine {
        &self.inner.query
    }

    pub fn analysis_engine(&self) -> &AnalysisEngine {
        &self.inner.analysis
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Text to analyze: the explicit text, else the session's primary document
    pub fn resolve_document_text(&self, document_text: Option<String>, session_id: &str) -> Result<String> {
        if let Some(text) = document_text.filter(|t| !t.trim().is_empty()) {
            return Ok(text);
        }

        self.inner
            .store
            .get_session(session_id)
            .and_then(|view| view.primary_document)
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "document_text is required (session {} has no primary document)",
                    session_id
                ))
            })
    }
}
