use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::resume::document::DocumentError;
use crate::search_client::SearchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MissingCredential(msg) => {
                (StatusCode::UNAUTHORIZED, "MISSING_CREDENTIAL", msg.clone())
            }
            AppError::Provider(msg) => {
                tracing::error!("Provider error: {msg}");
                (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", msg.clone())
            }
            AppError::UnsupportedFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                msg.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::InvalidKey(msg) => AppError::MissingCredential(format!(
                "The Gemini API key was rejected ({msg}). Update it and try again."
            )),
            other => AppError::Provider(format!("AI provider failed: {other}")),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidKey(msg) => AppError::MissingCredential(format!(
                "The SerpAPI key was rejected ({msg}). Update it and try again."
            )),
            other => AppError::Provider(format!("Search provider failed: {other}")),
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        AppError::UnsupportedFormat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_maps_to_401() {
        let response = AppError::MissingCredential("no key".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_unsupported_format_maps_to_415() {
        let response = AppError::UnsupportedFormat("resume.odt".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_rejected_llm_key_is_a_credential_error() {
        let err: AppError = LlmError::InvalidKey("API key not valid".into()).into();
        assert!(matches!(err, AppError::MissingCredential(_)));
    }

    #[test]
    fn test_llm_api_failure_is_a_provider_error() {
        let err: AppError = LlmError::Api {
            status: 500,
            message: "backend".into(),
        }
        .into();
        assert!(matches!(err, AppError::Provider(_)));
    }
}
