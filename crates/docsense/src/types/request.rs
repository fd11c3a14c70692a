//! Request bodies accepted by the HTTP shell

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisKind;
use crate::session::DEFAULT_SESSION_ID;

/// Resolve an optional session id to the default session
pub fn session_or_default(session_id: &Option<String>) -> &str {
    session_id.as_deref().unwrap_or(DEFAULT_SESSION_ID)
}

/// Add documents to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDocumentsRequest {
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
    /// Plain-text documents
    pub documents: Vec<String>,
}

/// Ask a question within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
    pub question: String,
    /// Extra context folded into retrieval and the fallback prompt
    #[serde(default)]
    pub context: Option<String>,
    /// Documents to add to the session before answering
    #[serde(default)]
    pub documents: Option<Vec<String>>,
}

/// Chat message (a question without extra context)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
}

/// Structured analysis request
///
/// When `document_text` is omitted the session's primary document is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub document_text: Option<String>,
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
    /// Only read by the comprehensive endpoint; empty means all kinds
    #[serde(default)]
    pub analysis_types: Option<Vec<AnalysisKind>>,
}

/// Clear a session's context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearContextRequest {
    #[serde(default, rename = "sessionId", alias = "session_id")]
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_aliases() {
        let camel: ChatRequest = serde_json::from_str(r#"{"sessionId": "s1", "message": "hi"}"#).unwrap();
        let snake: ChatRequest = serde_json::from_str(r#"{"session_id": "s1", "message": "hi"}"#).unwrap();
        assert_eq!(camel.session_id.as_deref(), Some("s1"));
        assert_eq!(snake.session_id.as_deref(), Some("s1"));

        let clear: ClearContextRequest = serde_json::from_str(r#"{"sessionId": "s2"}"#).unwrap();
        assert_eq!(session_or_default(&clear.session_id), "s2");
    }

    #[test]
    fn test_defaults() {
        let query: QueryRequest = serde_json::from_str(r#"{"question": "why?"}"#).unwrap();
        assert_eq!(session_or_default(&query.session_id), DEFAULT_SESSION_ID);
        assert!(query.context.is_none());

        let analyze: AnalyzeRequest =
            serde_json::from_str(r#"{"analysis_types": ["payment", "validation"]}"#).unwrap();
        assert_eq!(
            analyze.analysis_types.unwrap(),
            vec![AnalysisKind::Payment, AnalysisKind::Validation]
        );
    }
}
