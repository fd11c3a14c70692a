//! Session introspection and clearing endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{
    session_or_default, ClearContextRequest, ClearResponse, SessionInfo, SessionListResponse,
};

/// POST /api/clear-context - Drop a session's documents and index
pub async fn clear_context(
    State(state): State<AppState>,
    request: Option<Json<ClearContextRequest>>,
) -> Json<ClearResponse> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let session_id = session_or_default(&request.session_id).to_string();

    let cleared = state.store().clear(&session_id);
    Json(ClearResponse { session_id, cleared })
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<ClearResponse> {
    let cleared = state.store().clear(&session_id);
    Json(ClearResponse { session_id, cleared })
}

/// GET /api/sessions
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.store().session_ids(),
    })
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfo>> {
    state
        .store()
        .get_session(&session_id)
        .map(|view| Json(SessionInfo::from(&view)))
        .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))
}
