//! Structured analysis (financial, payment, validation) and summarization

mod engine;
pub mod json;

pub use engine::{AnalysisEngine, AnalysisKind, AnalysisResult, AnalysisStatus, ComprehensiveReport};
pub use json::{extract_json, JsonExtraction};
