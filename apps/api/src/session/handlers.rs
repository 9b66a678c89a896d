use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::catalog::CareerSelection;
use crate::config::Config;
use crate::errors::AppError;
use crate::session::models::{ReportKind, Session};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub category: String,
    pub role: String,
}

/// Absent fields leave the stored key untouched; an empty string removes it.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub gemini_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CredentialStatus {
    pub gemini_configured: bool,
    pub serpapi_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub kind: ReportKind,
    pub generated_for: String,
    pub generated_at: DateTime<Utc>,
    pub stale: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub selection: Option<CareerSelection>,
    pub turn_count: usize,
    pub reports: Vec<ReportSummary>,
    pub credentials: CredentialStatus,
    pub created_at: DateTime<Utc>,
}

fn credential_status(session: &Session, config: &Config) -> CredentialStatus {
    let creds = session.credentials();
    CredentialStatus {
        gemini_configured: creds.resolve_gemini(config.gemini_api_key.as_deref()).is_ok(),
        serpapi_configured: creds
            .resolve_serpapi(config.serpapi_api_key.as_deref())
            .is_ok(),
    }
}

fn describe(session: &Session, config: &Config) -> SessionResponse {
    let mut reports: Vec<_> = session
        .reports()
        .map(|report| ReportSummary {
            kind: report.kind,
            generated_for: report.generated_for.clone(),
            generated_at: report.generated_at,
            stale: session.is_stale(report),
        })
        .collect();
    reports.sort_by_key(|r| r.generated_at);

    SessionResponse {
        id: session.id,
        selection: session.selection().cloned(),
        turn_count: session.history().len(),
        reports,
        credentials: credential_status(session, config),
        created_at: session.created_at,
    }
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let id = state.sessions.create().await;
    let response = state
        .sessions
        .with_session(id, |session| describe(session, &state.config))
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let response = state
        .sessions
        .with_session(id, |session| describe(session, &state.config))
        .await?;
    Ok(Json(response))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/clear
///
/// Empties history, selection, cached reports and session keys. The id
/// stays usable.
pub async fn handle_clear_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let response = state
        .sessions
        .with_session(id, |session| {
            session.clear();
            describe(session, &state.config)
        })
        .await?;
    info!("Session {id} cleared");
    Ok(Json(response))
}

/// PUT /api/v1/sessions/:id/selection
pub async fn handle_select(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let selection = CareerSelection::resolve(&request.category, &request.role)?;
    let response = state
        .sessions
        .with_session(id, |session| {
            session.select(selection);
            describe(session, &state.config)
        })
        .await?;
    Ok(Json(response))
}

/// PUT /api/v1/sessions/:id/credentials
pub async fn handle_set_credentials(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<CredentialStatus>, AppError> {
    let status = state
        .sessions
        .with_session(id, |session| {
            let creds = session.credentials_mut();
            if let Some(key) = request.gemini_api_key {
                creds.set_gemini(Some(key));
            }
            if let Some(key) = request.serpapi_api_key {
                creds.set_serpapi(Some(key));
            }
            credential_status(session, &state.config)
        })
        .await?;
    Ok(Json(status))
}
