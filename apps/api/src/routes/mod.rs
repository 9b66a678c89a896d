pub mod careers;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::guidance::handlers as guidance;
use crate::resume::handlers as resume;
use crate::session::handlers as session;
use crate::state::AppState;

/// Uploaded resumes may exceed axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/careers", get(careers::careers_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/clear",
            post(session::handle_clear_session),
        )
        .route(
            "/api/v1/sessions/:id/selection",
            put(session::handle_select),
        )
        .route(
            "/api/v1/sessions/:id/credentials",
            put(session::handle_set_credentials),
        )
        // Content tabs
        .route(
            "/api/v1/sessions/:id/reports/:kind",
            get(guidance::handle_get_report).post(guidance::handle_generate_report),
        )
        .route(
            "/api/v1/sessions/:id/chat",
            get(guidance::handle_chat_history).post(guidance::handle_chat),
        )
        // Resume coach
        .route("/api/v1/resume/extract", post(resume::handle_extract))
        .route(
            "/api/v1/sessions/:id/resume/feedback",
            get(resume::handle_get_resume_feedback).post(resume::handle_resume_feedback),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
