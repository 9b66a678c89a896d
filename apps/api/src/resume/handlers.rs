//! Axum route handlers for resume upload and feedback.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::guidance::generator::generate_resume_feedback;
use crate::resume::document::{extract_text, preview};
use crate::session::models::{CachedReport, ReportKind};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub file_name: String,
    pub characters: usize,
    pub text: String,
    pub preview: String,
}

#[derive(Debug, Deserialize)]
pub struct ResumeFeedbackRequest {
    pub resume_text: String,
    /// Falls back to the session's selected role when absent.
    pub target_role: Option<String>,
}

/// POST /api/v1/resume/extract
///
/// Accepts a multipart form with a `file` field (PDF, DOCX or TXT).
pub async fn handle_extract(mut multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Uploaded file has no name".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;

        // PDF parsing is CPU-bound; keep it off the async workers.
        let name = file_name.clone();
        let text = tokio::task::spawn_blocking(move || extract_text(&name, &bytes))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

        info!("Extracted {} characters from {file_name}", text.chars().count());
        return Ok(Json(ExtractResponse {
            characters: text.chars().count(),
            preview: preview(&text),
            file_name,
            text,
        }));
    }

    Err(AppError::Validation(
        "Multipart form must contain a 'file' field".to_string(),
    ))
}

/// POST /api/v1/sessions/:id/resume/feedback
pub async fn handle_resume_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ResumeFeedbackRequest>,
) -> Result<Json<CachedReport>, AppError> {
    let report = generate_resume_feedback(
        &state,
        session_id,
        &request.resume_text,
        request.target_role.as_deref(),
    )
    .await?;
    Ok(Json(report))
}

/// GET /api/v1/sessions/:id/resume/feedback
///
/// Returns the previous analysis, if any.
pub async fn handle_get_resume_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CachedReport>, AppError> {
    state
        .sessions
        .with_session(session_id, |session| {
            session.report(ReportKind::Resume).cloned()
        })
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No resume analysis yet".to_string()))
}
