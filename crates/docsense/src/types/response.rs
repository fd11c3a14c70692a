//! Response bodies returned by the HTTP shell

use serde::{Deserialize, Serialize};

use crate::query::QueryAnswer;
use crate::session::{IngestOutcome, SessionView};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub llm_model: String,
    /// Live sessions
    pub sessions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub outcome: IngestOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub answer: QueryAnswer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    /// Whether a session existed and was removed
    pub cleared: bool,
}

/// Session summary for introspection endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub documents: usize,
    pub indexed: bool,
    pub chunk_count: usize,
    pub has_primary_document: bool,
}

impl From<&SessionView> for SessionInfo {
    fn from(view: &SessionView) -> Self {
        Self {
            session_id: view.session_id.clone(),
            documents: view.documents.len(),
            indexed: view.is_indexed(),
            chunk_count: view.chunk_count(),
            has_primary_document: view.primary_document.is_some(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<String>,
}
