//! Retriever and prompt template bound together for one session

use std::sync::Arc;

use crate::error::Result;
use crate::generation::{PromptBuilder, RAG_TEMPLATE};
use crate::providers::LlmProvider;

use super::index::VectorIndex;

/// Output of one chain run
#[derive(Debug, Clone)]
pub struct ChainOutput {
    /// Generated answer, verbatim
    pub answer: String,
    /// Number of chunks placed into the prompt
    pub chunks_used: usize,
}

/// Compiled retrieval pipeline: top-k retrieval followed by a grounded prompt
#[derive(Clone)]
pub struct RetrievalChain {
    index: Arc<VectorIndex>,
    top_k: usize,
    template: &'static str,
}

impl RetrievalChain {
    pub fn new(index: Arc<VectorIndex>, top_k: usize) -> Self {
        Self {
            index,
            top_k,
            template: RAG_TEMPLATE,
        }
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve chunks for the question (and optional extra context)
    pub async fn retrieve(&self, question: &str, context: Option<&str>) -> Result<Vec<String>> {
        let query = PromptBuilder::retrieval_query(question, context);
        self.index.search(&query, self.top_k).await
    }

    /// Retrieve, compose the grounded prompt and generate
    pub async fn run(
        &self,
        llm: &dyn LlmProvider,
        question: &str,
        context: Option<&str>,
    ) -> Result<ChainOutput> {
        let chunks = self.retrieve(question, context).await?;
        let prompt = PromptBuilder::fill_template(self.template, &chunks, question);

        tracing::debug!("Retrieved {} chunks, prompting {}", chunks.len(), llm.model());
        let answer = llm.generate(&prompt).await?;

        Ok(ChainOutput {
            answer,
            chunks_used: chunks.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::EmbeddingGateway;
    use crate::test_support::{HashEmbedder, RecordingLlm};

    #[tokio::test]
    async fn test_run_places_retrieved_chunks_in_prompt() {
        let gateway = Arc::new(EmbeddingGateway::new(Arc::new(HashEmbedder::default()), 0, 8));
        let index = VectorIndex::from_chunks(
            gateway,
            vec![
                "Payment method: card".to_string(),
                "Office lease renewed".to_string(),
                "Staff party in June".to_string(),
            ],
        )
        .await
        .unwrap();
        let chain = RetrievalChain::new(Arc::new(index), 1);
        let llm = RecordingLlm::new("card");

        let output = chain.run(&llm, "What payment method?", None).await.unwrap();

        assert_eq!(output.answer, "card");
        assert_eq!(output.chunks_used, 1);
        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("Payment method: card"));
        assert!(prompt.contains("Question:\nWhat payment method?"));
        assert!(!prompt.contains("Office lease"));
    }
}
