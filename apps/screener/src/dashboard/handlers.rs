//! Axum route handlers for the dashboard API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::analysis::client::{JOB_DESCRIPTION_FIELD, RESUMES_FIELD};
use crate::analysis::models::CandidateFile;
use crate::analysis::orchestrator::Snapshot;
use crate::analysis::projection::CandidateDetail;
use crate::analysis::text_validator::{validate_job_description, JobDescriptionReport};
use crate::errors::AppError;
use crate::state::AppState;

const UNNAMED_FILE: &str = "Unknown Candidate";

#[derive(Debug, Deserialize)]
pub struct JobDescriptionCheck {
    pub text: String,
}

/// POST /api/v1/analyze
///
/// Multipart form with one `job_description` text field and any number of
/// `resumes` file fields. Runs the full submission and returns the resulting
/// snapshot; validation and service failures are reported inside it.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Snapshot>, AppError> {
    let mut job_description = String::new();
    let mut candidates = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            JOB_DESCRIPTION_FIELD => {
                job_description = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable job description: {e}")))?;
            }
            RESUMES_FIELD => {
                let file_name = field.file_name().unwrap_or(UNNAMED_FILE).to_string();
                let mime_type = field.content_type().unwrap_or_default().to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable file '{file_name}': {e}")))?;
                candidates.push(CandidateFile::new(file_name, mime_type, content));
            }
            other => debug!("Ignoring unexpected multipart field '{other}'"),
        }
    }

    let snapshot = state.orchestrator.submit(&job_description, candidates).await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/analysis
pub async fn handle_get_analysis(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.orchestrator.snapshot().await)
}

/// POST /api/v1/analysis/cancel
pub async fn handle_cancel(State(state): State<AppState>) -> Result<Json<Snapshot>, AppError> {
    state.orchestrator.cancel().await?;
    Ok(Json(state.orchestrator.snapshot().await))
}

/// POST /api/v1/results/:index/select
pub async fn handle_select_result(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<CandidateDetail>, AppError> {
    let detail = state.orchestrator.select(index).await?;
    Ok(Json(detail))
}

/// DELETE /api/v1/results/selection
pub async fn handle_close_detail(State(state): State<AppState>) -> StatusCode {
    state.orchestrator.close_detail().await;
    StatusCode::NO_CONTENT
}

/// POST /api/v1/job-description/check
///
/// Live feedback on the job description, independent of any submission.
pub async fn handle_check_job_description(
    State(state): State<AppState>,
    Json(request): Json<JobDescriptionCheck>,
) -> Json<JobDescriptionReport> {
    let min_chars = state.orchestrator.policy().min_job_description_chars;
    Json(validate_job_description(&request.text, min_chars))
}
