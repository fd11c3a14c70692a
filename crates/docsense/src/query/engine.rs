//! Retrieval-augmented question answering over a session

use serde::Serialize;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::LlmProvider;
use crate::session::{validate_session_id, SessionStore};

/// How an answer was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerMode {
    /// Answered from chunks retrieved out of the session index
    Retrieval { chunks_used: usize },
    /// Session had no index; answered from recent raw documents
    Fallback,
}

/// Answer text plus how it was obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnswer {
    /// Model output, or an error description when `failed`
    pub answer: String,
    pub mode: AnswerMode,
    /// Set when generation (or retrieval) failed and `answer` carries the error
    pub failed: bool,
}

/// Query engine
///
/// Always returns text for a well-formed question: retrieval and generation
/// failures become error-annotated answers instead of propagating.
pub struct QueryEngine {
    store: Arc<SessionStore>,
    llm: Arc<dyn LlmProvider>,
    fallback_window: usize,
}

impl QueryEngine {
    pub fn new(store: Arc<SessionStore>, llm: Arc<dyn LlmProvider>, fallback_window: usize) -> Self {
        Self {
            store,
            llm,
            fallback_window,
        }
    }

    /// Answer a question within a session
    pub async fn answer(
        &self,
        session_id: &str,
        question: &str,
        extra_context: Option<&str>,
    ) -> Result<QueryAnswer> {
        validate_session_id(session_id)?;
        if question.trim().is_empty() {
            return Err(Error::invalid_input("question must not be empty"));
        }

        let chain = self
            .store
            .get_session(session_id)
            .and_then(|view| view.chain().cloned());

        match chain {
            Some(chain) => {
                tracing::debug!("Answering from index for session {}", session_id);
                match chain.run(self.llm.as_ref(), question, extra_context).await {
                    Ok(output) => Ok(QueryAnswer {
                        answer: output.answer,
                        mode: AnswerMode::Retrieval {
                            chunks_used: output.chunks_used,
                        },
                        failed: false,
                    }),
                    Err(e) => {
                        tracing::error!("Error during query for session {}: {}", session_id, e);
                        Ok(QueryAnswer {
                            answer: format!("Error during query: {}", e),
                            mode: AnswerMode::Retrieval { chunks_used: 0 },
                            failed: true,
                        })
                    }
                }
            }
            None => {
                tracing::info!("Session {} has no index, using fallback prompt", session_id);
                Ok(self.fallback(question, extra_context).await)
            }
        }
    }

    async fn fallback(&self, question: &str, extra_context: Option<&str>) -> QueryAnswer {
        let documents = self.store.recent_documents(self.fallback_window);
        let prompt = PromptBuilder::fallback_prompt(&documents, extra_context, question);

        match self.llm.generate(&prompt).await {
            Ok(answer) => QueryAnswer {
                answer,
                mode: AnswerMode::Fallback,
                failed: false,
            },
            Err(e) => {
                tracing::error!("Error generating response: {}", e);
                QueryAnswer {
                    answer: format!("Error generating response: {}", e),
                    mode: AnswerMode::Fallback,
                    failed: true,
                }
            }
        }
    }
}
