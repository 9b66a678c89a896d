//! Axum route handlers for the content tabs and the chat advisor.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::guidance::generator::{chat, generate_report, ChatReply};
use crate::session::models::{CachedReport, ChatTurn, InsightKind, ReportKind};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub turns: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct CachedReportResponse {
    #[serde(flatten)]
    pub report: CachedReport,
    /// True when the selection changed since the report was generated.
    pub stale: bool,
}

/// POST /api/v1/sessions/:id/reports/:kind
///
/// Generates career insights, market analysis or college recommendations
/// for the session's current selection.
pub async fn handle_generate_report(
    State(state): State<AppState>,
    Path((session_id, kind)): Path<(Uuid, InsightKind)>,
) -> Result<Json<CachedReport>, AppError> {
    let report = generate_report(&state, session_id, kind).await?;
    Ok(Json(report))
}

/// GET /api/v1/sessions/:id/reports/:kind
///
/// Returns the cached report of that kind without calling any provider.
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path((session_id, kind)): Path<(Uuid, ReportKind)>,
) -> Result<Json<CachedReportResponse>, AppError> {
    state
        .sessions
        .with_session(session_id, |session| {
            session.report(kind).map(|report| CachedReportResponse {
                stale: session.is_stale(report),
                report: report.clone(),
            })
        })
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No cached {kind:?} report")))
}

/// POST /api/v1/sessions/:id/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let reply = chat(&state, session_id, &request.message).await?;
    Ok(Json(reply))
}

/// GET /api/v1/sessions/:id/chat
pub async fn handle_chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ChatHistoryResponse>, AppError> {
    let turns = state
        .sessions
        .with_session(session_id, |session| session.history().to_vec())
        .await?;
    Ok(Json(ChatHistoryResponse { turns }))
}
