//! In-memory vector index over embedded chunks

use parking_lot::RwLock;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingGateway;

/// A stored chunk with its embedding
#[derive(Debug, Clone)]
struct IndexEntry {
    text: String,
    vector: Vec<f32>,
    norm: f32,
}

/// Search hit with its similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// Chunk text
    pub text: String,
    /// Cosine similarity (-1.0..=1.0, higher is better)
    pub score: f32,
}

/// Append-only cosine-similarity index
///
/// Entries are kept in insertion order. Every insert lands in a single write,
/// so a concurrent search sees either all of a batch or none of it.
pub struct VectorIndex {
    gateway: Arc<EmbeddingGateway>,
    dimensions: usize,
    entries: RwLock<Vec<IndexEntry>>,
}

impl VectorIndex {
    /// Create an index with no entries
    pub fn empty(gateway: Arc<EmbeddingGateway>, dimensions: usize) -> Self {
        Self {
            gateway,
            dimensions,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Build an index from an initial, non-empty set of chunks
    pub async fn from_chunks(gateway: Arc<EmbeddingGateway>, chunks: Vec<String>) -> Result<Self> {
        let vectors = gateway.embed_many(&chunks).await?;
        Self::from_embedded(gateway, chunks, vectors)
    }

    /// Build an index from chunks that were already embedded by `gateway`
    pub fn from_embedded(
        gateway: Arc<EmbeddingGateway>,
        chunks: Vec<String>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self> {
        let dimensions = match vectors.first() {
            Some(vector) => vector.len(),
            None => return Err(Error::invalid_input("an index needs at least one chunk")),
        };

        let index = Self::empty(gateway, dimensions);
        index.insert_embedded(chunks, vectors)?;

        tracing::debug!("Created vector index with {} entries ({} dims)", index.len(), dimensions);
        Ok(index)
    }

    /// Embed and append chunks. Returns the number of entries added.
    pub async fn insert(&self, chunks: Vec<String>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }
        let vectors = self.gateway.embed_many(&chunks).await?;
        self.insert_embedded(chunks, vectors)
    }

    /// Append pre-embedded chunks in one step
    pub fn insert_embedded(&self, chunks: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<usize> {
        if chunks.len() != vectors.len() {
            return Err(Error::index(format!(
                "{} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        let mut batch = Vec::with_capacity(chunks.len());
        for (text, vector) in chunks.into_iter().zip(vectors) {
            if vector.len() != self.dimensions {
                return Err(Error::index(format!(
                    "dimension mismatch: index has {}, vector has {}",
                    self.dimensions,
                    vector.len()
                )));
            }
            let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
            batch.push(IndexEntry { text, vector, norm });
        }

        let added = batch.len();
        self.entries.write().extend(batch);
        Ok(added)
    }

    /// Top-k chunk texts for a query, best first
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<String>> {
        Ok(self
            .search_scored(query, k)
            .await?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Top-k chunks with similarity scores
    pub async fn search_scored(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(Error::invalid_input("k must be positive"));
        }
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.gateway.embed(query).await?;
        self.search_vector(&query_vector, k)
    }

    /// Rank stored entries against a query vector.
    ///
    /// Equal scores keep insertion order (the sort is stable).
    pub fn search_vector(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(Error::invalid_input("k must be positive"));
        }
        if query.len() != self.dimensions {
            return Err(Error::index(format!(
                "query has {} dims, index has {}",
                query.len(),
                self.dimensions
            )));
        }

        let query_norm = query.iter().map(|x| x * x).sum::<f32>().sqrt();
        let entries = self.entries.read();

        let mut scored: Vec<(f32, &IndexEntry)> = entries
            .iter()
            .map(|entry| (cosine_similarity(query, query_norm, entry), entry))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, entry)| ScoredChunk {
                text: entry.text.clone(),
                score,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn cosine_similarity(query: &[f32], query_norm: f32, entry: &IndexEntry) -> f32 {
    if query_norm == 0.0 || entry.norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = query.iter().zip(&entry.vector).map(|(a, b)| a * b).sum();
    dot / (query_norm * entry.norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::HashEmbedder;

    fn gateway() -> Arc<EmbeddingGateway> {
        Arc::new(EmbeddingGateway::new(Arc::new(HashEmbedder::default()), 0, 16))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_exact_chunk_ranks_first() {
        let index = VectorIndex::from_chunks(
            gateway(),
            strings(&[
                "Rent for March was paid by bank transfer",
                "Invoice #1 amount $50 paid by card",
                "The quarterly report shows rising costs",
            ]),
        )
        .await
        .unwrap();

        let hits = index
            .search_scored("Invoice #1 amount $50 paid by card", 2)
            .await
            .unwrap();
        assert_eq!(hits[0].text, "Invoice #1 amount $50 paid by card");
        assert!(hits[0].score > 0.99);
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_search_returns_at_most_k() {
        let index = VectorIndex::from_chunks(gateway(), strings(&["a b", "c d", "e f"]))
            .await
            .unwrap();
        assert_eq!(index.search("a", 2).await.unwrap().len(), 2);
        assert_eq!(index.search("a", 10).await.unwrap().len(), 3);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let index = VectorIndex::from_embedded(
            gateway(),
            strings(&["first", "second", "other"]),
            vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap();
        index
            .insert_embedded(strings(&["third"]), vec![vec![2.0, 0.0]])
            .unwrap();

        let hits = index.search_vector(&[1.0, 0.0], 4).unwrap();
        let order: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third", "other"]);
    }

    #[tokio::test]
    async fn test_insert_is_additive() {
        let index = VectorIndex::from_chunks(gateway(), strings(&["first batch"]))
            .await
            .unwrap();
        assert_eq!(index.insert(strings(&["second", "third"])).await.unwrap(), 2);
        assert_eq!(index.insert(Vec::new()).await.unwrap(), 0);
        assert_eq!(index.len(), 3);

        let hits = index.search("third", 1).await.unwrap();
        assert_eq!(hits, vec!["third".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_construction_rejected() {
        let result = VectorIndex::from_chunks(gateway(), Vec::new()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_empty_index_search_is_empty() {
        let index = VectorIndex::empty(gateway(), 64);
        assert!(index.search("anything", 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_k_rejected() {
        let index = VectorIndex::from_chunks(gateway(), strings(&["x"])).await.unwrap();
        assert!(matches!(index.search("x", 0).await, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let index = VectorIndex::from_embedded(
            gateway(),
            strings(&["x"]),
            vec![vec![1.0, 0.0, 0.0]],
        )
        .unwrap();

        let result = index.insert_embedded(strings(&["y"]), vec![vec![1.0, 0.0]]);
        assert!(matches!(result, Err(Error::Index(_))));
        assert_eq!(index.len(), 1);

        assert!(matches!(index.search_vector(&[1.0], 1), Err(Error::Index(_))));
    }

    #[test]
    fn test_failed_batch_leaves_index_untouched() {
        let index = VectorIndex::from_embedded(gateway(), strings(&["x"]), vec![vec![1.0, 0.0]]).unwrap();
        let result = index.insert_embedded(
            strings(&["ok", "bad"]),
            vec![vec![0.0, 1.0], vec![1.0, 1.0, 1.0]],
        );
        assert!(result.is_err());
        assert_eq!(index.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_partial_batches() {
        const BATCH: usize = 7;
        const BATCHES: usize = 200;

        let index = Arc::new(
            VectorIndex::from_embedded(gateway(), strings(&["seed"]), vec![vec![1.0, 0.0]]).unwrap(),
        );
        let initial = index.len();
        let total = initial + BATCH * BATCHES;

        let writer = {
            let index = Arc::clone(&index);
            tokio::spawn(async move {
                for b in 0..BATCHES {
                    let chunks: Vec<String> = (0..BATCH).map(|i| format!("chunk {} {}", b, i)).collect();
                    index.insert_embedded(chunks, vec![vec![0.0, 1.0]; BATCH]).unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let reader = {
            let index = Arc::clone(&index);
            tokio::spawn(async move {
                loop {
                    let len = index.len();
                    assert_eq!((len - initial) % BATCH, 0);

                    let hits = index.search_vector(&[0.0, 1.0], usize::MAX).unwrap();
                    assert_eq!((hits.len() - initial) % BATCH, 0);

                    if len == total {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
        assert_eq!(index.len(), total);
    }
}
