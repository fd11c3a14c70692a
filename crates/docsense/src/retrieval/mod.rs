//! Vector retrieval: the per-session index and the chain that queries it

pub mod chain;
pub mod index;

pub use chain::{ChainOutput, RetrievalChain};
pub use index::{ScoredChunk, VectorIndex};
