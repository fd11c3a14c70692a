//! Structured analysis and summarization endpoints

use axum::{extract::State, Json};

use crate::analysis::{AnalysisKind, AnalysisResult, ComprehensiveReport};
use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{session_or_default, AnalyzeRequest, SummarizeRequest, SummaryResponse};

async fn run_single(
    state: &AppState,
    kind: AnalysisKind,
    request: AnalyzeRequest,
) -> Result<Json<AnalysisResult>> {
    let session_id = session_or_default(&request.session_id);
    let text = state.resolve_document_text(request.document_text.clone(), session_id)?;

    tracing::info!("Running {} analysis ({} bytes)", kind, text.len());
    let result = state.analysis_engine().analyze(kind, &text).await?;
    Ok(Json(result))
}

/// POST /api/analyze/financial
pub async fn financial(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>> {
    run_single(&state, AnalysisKind::Financial, request).await
}

/// POST /api/analyze/payment
pub async fn payment(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>> {
    run_single(&state, AnalysisKind::Payment, request).await
}

/// POST /api/analyze/validation
pub async fn validation(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>> {
    run_single(&state, AnalysisKind::Validation, request).await
}

/// POST /api/analyze/comprehensive
pub async fn comprehensive(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ComprehensiveReport>> {
    let session_id = session_or_default(&request.session_id);
    let text = state.resolve_document_text(request.document_text.clone(), session_id)?;
    let kinds = request.analysis_types.unwrap_or_default();

    let report = state.analysis_engine().comprehensive(&text, &kinds).await?;
    Ok(Json(report))
}

/// POST /api/summarize
pub async fn summarize(
    State(state): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummaryResponse>> {
    let summary = state.analysis_engine().summarize(&request.text).await?;
    Ok(Json(SummaryResponse { summary }))
}
