//! Question answering endpoints

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{session_or_default, ChatRequest, QueryRequest, QueryResponse};

/// POST /api/query - Answer a question, optionally adding documents first
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let session_id = session_or_default(&request.session_id).to_string();

    tracing::info!("Query in session {}: \"{}\"", session_id, request.question);

    if let Some(documents) = request.documents.filter(|d| !d.is_empty()) {
        state.store().add_documents(&session_id, documents).await?;
    }

    let answer = state
        .query_engine()
        .answer(&session_id, &request.question, request.context.as_deref())
        .await?;

    Ok(Json(QueryResponse { session_id, answer }))
}

/// POST /api/chat - Conversational question against the session
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<QueryResponse>> {
    let session_id = session_or_default(&request.session_id).to_string();

    let answer = state
        .query_engine()
        .answer(&session_id, &request.message, None)
        .await?;

    Ok(Json(QueryResponse { session_id, answer }))
}
