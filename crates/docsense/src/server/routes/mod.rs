//! API routes for the docsense server

pub mod analysis;
pub mod documents;
pub mod query;
pub mod sessions;

use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Session documents
        .route("/documents", post(documents::add_documents))
        // Question answering
        .route("/query", post(query::query))
        .route("/chat", post(query::chat))
        // Structured analysis
        .route("/summarize", post(analysis::summarize))
        .route("/analyze/financial", post(analysis::financial))
        .route("/analyze/payment", post(analysis::payment))
        .route("/analyze/validation", post(analysis::validation))
        .route("/analyze/comprehensive", post(analysis::comprehensive))
        // Session management
        .route("/clear-context", post(sessions::clear_context))
        .route("/sessions", get(sessions::list_sessions))
        .route(
            "/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "docsense",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Session-scoped document Q&A and structured financial analysis",
        "endpoints": {
            "POST /api/documents": "Add documents to a session",
            "POST /api/query": "Ask a question (optionally adding documents first)",
            "POST /api/chat": "Ask a question without extra context",
            "POST /api/summarize": "Summarize a document",
            "POST /api/analyze/financial": "Extract financial insights",
            "POST /api/analyze/payment": "Extract payment details",
            "POST /api/analyze/validation": "Validate a document",
            "POST /api/analyze/comprehensive": "Run several analyses concurrently",
            "POST /api/clear-context": "Drop a session",
            "GET /api/sessions": "List session ids",
            "GET /api/sessions/:id": "Session details",
            "DELETE /api/sessions/:id": "Drop a session"
        }
    }))
}
