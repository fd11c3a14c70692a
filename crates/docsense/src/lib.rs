//! docsense: session-scoped document Q&A and structured financial analysis
//!
//! Documents are chunked, embedded and indexed per session. Questions are
//! answered from the top matching chunks, or from the most recent raw
//! documents when a session has nothing indexed. A separate analysis engine
//! asks the model for financial, payment and validation JSON and tolerates
//! malformed replies.

pub mod analysis;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod query;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use analysis::{AnalysisEngine, AnalysisKind, AnalysisResult, ComprehensiveReport};
pub use config::RagConfig;
pub use error::{Error, Result};
pub use query::{AnswerMode, QueryAnswer, QueryEngine};
pub use session::{IngestOutcome, SessionStore};
