//! Process-wide registry of document sessions

use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::ingestion::TextChunker;
use crate::providers::EmbeddingGateway;
use crate::retrieval::{RetrievalChain, VectorIndex};

use super::validate_session_id;

/// Index state of a session
#[derive(Clone, Default)]
pub enum SessionIndex {
    /// No chunks indexed yet; queries use the fallback strategy
    #[default]
    Uninitialized,
    /// Index plus the retrieval chain compiled over it
    Indexed(RetrievalChain),
}

impl SessionIndex {
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed(_))
    }

    pub fn chunk_count(&self) -> usize {
        match self {
            Self::Uninitialized => 0,
            Self::Indexed(chain) => chain.index().len(),
        }
    }
}

impl fmt::Debug for SessionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("Uninitialized"),
            Self::Indexed(chain) => f
                .debug_struct("Indexed")
                .field("chunks", &chain.index().len())
                .field("top_k", &chain.top_k())
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredDocument {
    /// Global arrival order across all sessions
    seq: u64,
    text: String,
}

#[derive(Debug, Default)]
struct Session {
    documents: Vec<StoredDocument>,
    primary_document: Option<String>,
    index: SessionIndex,
}

/// Read-only snapshot of a session
#[derive(Debug, Clone)]
pub struct SessionView {
    pub session_id: String,
    /// Raw documents in insertion order
    pub documents: Vec<String>,
    /// First document that produced chunks in the call that created the index
    pub primary_document: Option<String>,
    pub index: SessionIndex,
}

impl SessionView {
    pub fn is_indexed(&self) -> bool {
        self.index.is_indexed()
    }

    pub fn chunk_count(&self) -> usize {
        self.index.chunk_count()
    }

    /// The session's retrieval chain, if it has an index
    pub fn chain(&self) -> Option<&RetrievalChain> {
        match &self.index {
            SessionIndex::Indexed(chain) => Some(chain),
            SessionIndex::Uninitialized => None,
        }
    }
}

/// Result of one `add_documents` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    /// Documents appended by this call
    pub documents_added: usize,
    /// Chunks embedded and indexed by this call
    pub chunks_indexed: usize,
    /// Whether this call created the session's index
    pub index_created: bool,
    /// Documents held by the session afterwards
    pub total_documents: usize,
}

/// Session registry
///
/// Different sessions never contend: each lives in its own map slot, and
/// mutation of a slot is a short synchronous step under the map's entry
/// lock. Chunking and embedding happen before the slot is touched.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    gateway: Arc<EmbeddingGateway>,
    chunker: TextChunker,
    top_k: usize,
    next_seq: AtomicU64,
}

impl SessionStore {
    pub fn new(gateway: Arc<EmbeddingGateway>, chunker: TextChunker, top_k: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            gateway,
            chunker,
            top_k,
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn from_config(gateway: Arc<EmbeddingGateway>, config: &RagConfig) -> Result<Self> {
        let chunker = TextChunker::from_config(&config.chunking)?;
        Ok(Self::new(gateway, chunker, config.retrieval.top_k))
    }

    /// Chunk, embed and index documents for a session.
    ///
    /// An empty `documents` list is a no-op. The first call that yields any
    /// chunks creates the index; later calls append to it. Embedding failures
    /// propagate and leave the session unchanged.
    pub async fn add_documents(&self, session_id: &str, documents: Vec<String>) -> Result<IngestOutcome> {
        validate_session_id(session_id)?;

        if documents.is_empty() {
            return Ok(IngestOutcome {
                total_documents: self
                    .sessions
                    .get(session_id)
                    .map_or(0, |s| s.documents.len()),
                ..Default::default()
            });
        }

        let mut chunks: Vec<String> = Vec::new();
        let mut first_indexed: Option<usize> = None;
        for (i, doc) in documents.iter().enumerate() {
            let before = chunks.len();
            chunks.extend(
                self.chunker
                    .split(doc)
                    .into_iter()
                    .filter(|chunk| !chunk.trim().is_empty()),
            );
            if first_indexed.is_none() && chunks.len() > before {
                first_indexed = Some(i);
            }
        }

        let vectors = if chunks.is_empty() {
            Vec::new()
        } else {
            self.gateway.embed_many(&chunks).await?
        };

        let chunk_count = chunks.len();
        let mut session = self.sessions.entry(session_id.to_string()).or_default();

        let existing = match &session.index {
            SessionIndex::Indexed(chain) => Some(Arc::clone(chain.index())),
            SessionIndex::Uninitialized => None,
        };

        let index_created = match existing {
            Some(index) => {
                index.insert_embedded(chunks, vectors)?;
                false
            }
            None if chunk_count > 0 => {
                let index = VectorIndex::from_embedded(Arc::clone(&self.gateway), chunks, vectors)?;
                session.index = SessionIndex::Indexed(RetrievalChain::new(Arc::new(index), self.top_k));
                session.primary_document = first_indexed.and_then(|i| documents.get(i).cloned());
                true
            }
            None => false,
        };

        let documents_added = documents.len();
        for text in documents {
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            session.documents.push(StoredDocument { seq, text });
        }

        let outcome = IngestOutcome {
            documents_added,
            chunks_indexed: chunk_count,
            index_created,
            total_documents: session.documents.len(),
        };

        if index_created {
            tracing::info!("Created index for session {} with {} chunks", session_id, chunk_count);
        } else {
            tracing::info!(
                "Added {} documents ({} chunks) to session {}",
                documents_added,
                chunk_count,
                session_id
            );
        }

        Ok(outcome)
    }

    /// Snapshot of a session; never creates one
    pub fn get_session(&self, session_id: &str) -> Option<SessionView> {
        self.sessions.get(session_id).map(|session| SessionView {
            session_id: session_id.to_string(),
            documents: session.documents.iter().map(|d| d.text.clone()).collect(),
            primary_document: session.primary_document.clone(),
            index: session.index.clone(),
        })
    }

    /// Remove a session entirely. Returns whether it existed.
    pub fn clear(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            tracing::info!("Cleared session {}", session_id);
        } else {
            tracing::debug!("Clear requested for unknown session {}", session_id);
        }
        removed
    }

    /// Up to `limit` most recently added documents across all live sessions,
    /// oldest first
    pub fn recent_documents(&self, limit: usize) -> Vec<String> {
        if limit == 0 {
            return Vec::new();
        }

        let mut recent: Vec<StoredDocument> = Vec::new();
        for session in self.sessions.iter() {
            let docs = &session.documents;
            recent.extend(docs[docs.len().saturating_sub(limit)..].iter().cloned());
        }

        recent.sort_by_key(|doc| doc.seq);
        let skip = recent.len().saturating_sub(limit);
        recent.into_iter().skip(skip).map(|doc| doc.text).collect()
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.iter().map(|s| s.key().clone()).collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::EmbeddingProvider;
    use crate::test_support::{FailingEmbedder, HashEmbedder};

    fn store() -> SessionStore {
        let gateway = Arc::new(EmbeddingGateway::new(Arc::new(HashEmbedder::default()), 0, 8));
        SessionStore::new(gateway, TextChunker::new(200, 40).unwrap(), 4)
    }

    fn docs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_documents_is_noop() {
        let store = store();
        let outcome = store.add_documents("s1", Vec::new()).await.unwrap();
        assert_eq!(outcome, IngestOutcome::default());
        assert!(store.get_session("s1").is_none());
    }

    #[tokio::test]
    async fn test_first_add_creates_index() {
        let store = store();
        let outcome = store
            .add_documents("s1", docs(&["Invoice #1 amount $50 paid by card", "Second doc"]))
            .await
            .unwrap();

        assert!(outcome.index_created);
        assert_eq!(outcome.documents_added, 2);
        assert_eq!(outcome.chunks_indexed, 2);

        let view = store.get_session("s1").unwrap();
        assert!(view.is_indexed());
        assert_eq!(view.chunk_count(), 2);
        assert_eq!(view.primary_document.as_deref(), Some("Invoice #1 amount $50 paid by card"));
    }

    #[tokio::test]
    async fn test_second_add_appends() {
        let store = store();
        store.add_documents("s1", docs(&["Rent paid by transfer"])).await.unwrap();
        let outcome = store
            .add_documents("s1", docs(&["Salary paid in cash"]))
            .await
            .unwrap();

        assert!(!outcome.index_created);
        assert_eq!(outcome.total_documents, 2);

        let view = store.get_session("s1").unwrap();
        assert_eq!(view.primary_document.as_deref(), Some("Rent paid by transfer"));
        let chain = view.chain().unwrap();
        assert_eq!(
            chain.index().search("Rent paid by transfer", 1).await.unwrap(),
            docs(&["Rent paid by transfer"])
        );
        assert_eq!(
            chain.index().search("Salary paid in cash", 1).await.unwrap(),
            docs(&["Salary paid in cash"])
        );
    }

    #[tokio::test]
    async fn test_clear_then_add_behaves_like_new_session() {
        let store = store();
        store.add_documents("s1", docs(&["old content"])).await.unwrap();
        assert!(store.clear("s1"));

        let outcome = store.add_documents("s1", docs(&["new content"])).await.unwrap();
        assert!(outcome.index_created);
        assert_eq!(outcome.total_documents, 1);

        let view = store.get_session("s1").unwrap();
        assert_eq!(view.documents, docs(&["new content"]));
        assert_eq!(view.chunk_count(), 1);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = store();
        store.add_documents("s1", docs(&["x"])).await.unwrap();
        assert!(store.clear("s1"));
        assert!(!store.clear("s1"));
        assert!(!store.clear("never-existed"));
    }

    #[tokio::test]
    async fn test_whitespace_document_leaves_session_uninitialized() {
        let store = store();
        let outcome = store.add_documents("s1", docs(&["   \n\t "])).await.unwrap();

        assert!(!outcome.index_created);
        assert_eq!(outcome.chunks_indexed, 0);
        let view = store.get_session("s1").unwrap();
        assert!(!view.is_indexed());
        assert_eq!(view.documents.len(), 1);
        assert!(view.primary_document.is_none());
    }

    #[tokio::test]
    async fn test_primary_document_skips_blank_documents() {
        let store = store();
        store
            .add_documents("s1", docs(&["  \n ", "Invoice #9 total $75", "Receipt"]))
            .await
            .unwrap();

        let view = store.get_session("s1").unwrap();
        assert_eq!(view.primary_document.as_deref(), Some("Invoice #9 total $75"));
        assert_eq!(view.documents.len(), 3);
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_store_unchanged() {
        let gateway = Arc::new(EmbeddingGateway::new(Arc::new(FailingEmbedder), 0, 8));
        let store = SessionStore::new(gateway, TextChunker::new(200, 40).unwrap(), 4);

        let result = store.add_documents("s1", docs(&["some text"])).await;
        assert!(matches!(result, Err(Error::Embedding(_))));
        assert!(store.get_session("s1").is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_session_id_rejected() {
        let store = store();
        assert!(matches!(
            store.add_documents("", docs(&["x"])).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            store.add_documents("bad\nid", docs(&["x"])).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_never_create_sessions() {
        let store = store();
        assert!(store.get_session("ghost").is_none());
        assert!(store.recent_documents(5).is_empty());
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_recent_documents_window_and_purge() {
        let store = store();
        store.add_documents("a", docs(&["a1", "a2"])).await.unwrap();
        store.add_documents("b", docs(&["b1"])).await.unwrap();
        store.add_documents("a", docs(&["a3"])).await.unwrap();

        assert_eq!(store.recent_documents(3), docs(&["a2", "b1", "a3"]));
        assert_eq!(store.recent_documents(10), docs(&["a1", "a2", "b1", "a3"]));

        store.clear("a");
        assert_eq!(store.recent_documents(3), docs(&["b1"]));
    }

    #[tokio::test]
    async fn test_concurrent_adds() {
        let store = Arc::new(store());

        let (a, b, c) = tokio::join!(
            store.add_documents("s1", docs(&["alpha"])),
            store.add_documents("s2", docs(&["beta"])),
            store.add_documents("s1", docs(&["gamma"])),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();

        let s1 = store.get_session("s1").unwrap();
        assert_eq!(s1.documents.len(), 2);
        assert_eq!(s1.chunk_count(), 2);
        assert_eq!(store.session_ids(), vec!["s1".to_string(), "s2".to_string()]);
    }

    /// Each embed call waits until `parties` calls are in flight at once
    struct RendezvousEmbedder {
        inner: HashEmbedder,
        barrier: tokio::sync::Barrier,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for RendezvousEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.barrier.wait().await;
            self.inner.embed(text).await
        }

        fn dimensions(&self) -> usize {
            self.inner.dimensions()
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "rendezvous"
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_adds_to_different_sessions_run_in_parallel() {
        const SESSIONS: usize = 6;

        let embedder = RendezvousEmbedder {
            inner: HashEmbedder::default(),
            barrier: tokio::sync::Barrier::new(SESSIONS),
        };
        let gateway = Arc::new(EmbeddingGateway::new(Arc::new(embedder), 0, 8));
        let store = Arc::new(SessionStore::new(gateway, TextChunker::new(200, 40).unwrap(), 4));

        let tasks: Vec<_> = (0..SESSIONS)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .add_documents(&format!("s{}", i), vec![format!("document {}", i)])
                        .await
                })
            })
            .collect();

        // Completes only if every session's embedding is in flight together
        let results = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            futures::future::join_all(tasks),
        )
        .await
        .expect("session adds were serialized");

        for result in results {
            assert!(result.unwrap().unwrap().index_created);
        }
        assert_eq!(store.len(), SESSIONS);
        for i in 0..SESSIONS {
            let view = store.get_session(&format!("s{}", i)).unwrap();
            assert_eq!(view.documents, vec![format!("document {}", i)]);
            assert_eq!(view.chunk_count(), 1);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_adds_to_one_session_are_all_kept() {
        let store = Arc::new(store());

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .add_documents("shared", vec![format!("entry number {}", i)])
                        .await
                })
            })
            .collect();

        let created = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .filter(|outcome| outcome.index_created)
            .count();

        assert_eq!(created, 1);
        let view = store.get_session("shared").unwrap();
        assert_eq!(view.documents.len(), 16);
        assert_eq!(view.chunk_count(), 16);
    }
}
