//! Document ingestion: splitting extracted text into indexable chunks

mod chunker;

pub use chunker::{ChunkSpan, TextChunker};
