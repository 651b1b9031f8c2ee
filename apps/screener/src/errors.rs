use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::orchestrator::{NothingInFlight, SelectError, SubmitError};

/// Gateway error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Submission failures are not errors at this level: they are lifecycle
/// states and travel inside the snapshot.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::AlreadyInFlight => AppError::Conflict(e.to_string()),
            SubmitError::Aborted(_) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

impl From<SelectError> for AppError {
    fn from(e: SelectError) -> Self {
        AppError::NotFound(e.to_string())
    }
}

impl From<NothingInFlight> for AppError {
    fn from(e: NothingInFlight) -> Self {
        AppError::Conflict(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
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
