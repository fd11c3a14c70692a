//! Document ingestion endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{session_or_default, AddDocumentsRequest, IngestResponse};

/// POST /api/documents - Chunk, embed and index documents for a session
pub async fn add_documents(
    State(state): State<AppState>,
    Json(request): Json<AddDocumentsRequest>,
) -> Result<Json<IngestResponse>> {
    let session_id = session_or_default(&request.session_id).to_string();

    tracing::info!(
        "Ingesting {} documents into session {}",
        request.documents.len(),
        session_id
    );

    let outcome = state
        .store()
        .add_documents(&session_id, request.documents)
        .await?;

    Ok(Json(IngestResponse {
        session_id,
        outcome,
    }))
}
