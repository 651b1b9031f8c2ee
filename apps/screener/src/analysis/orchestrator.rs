//! Request orchestrator: owns the submission lifecycle.
//!
//! State machine:
//! ```text
//! Idle | Success | Failed --submit--> Validating --ok--> InFlight --classify--> Success | Failed
//!                                          \--invalid--> Failed(ValidationError)
//! ```
//! Single-flight: `submit` while `Validating`/`InFlight` is rejected with no
//! state change and no outbound call. The check and the transition happen
//! under one lock, which is never held across the outbound await.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::classifier::{classify, AnalysisFailure, ErrorKind};
use crate::analysis::client::AnalysisClient;
use crate::analysis::file_validator::{validate_files, RejectedDocument, UploadPolicy};
use crate::analysis::models::{
    AnalysisResponse, CandidateFile, CandidateResult, SubmissionRequest,
};
use crate::analysis::projection::{project_detail, project_rows, CandidateDetail, ResultRow};
use crate::analysis::text_validator::{
    validate_job_description, JobDescriptionReport, DEFAULT_MIN_CHARS,
};

pub const JOB_DESCRIPTION_REQUIRED: &str = "job description required";
pub const RESUME_REQUIRED: &str = "at least one valid resume required";
pub const CANCELLED_MESSAGE: &str = "analysis cancelled";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LifecycleState {
    Idle,
    Validating,
    InFlight,
    Success { response: AnalysisResponse },
    Failed { kind: ErrorKind, message: String },
}

impl LifecycleState {
    /// True while a submission is outstanding.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, LifecycleState::Validating | LifecycleState::InFlight)
    }

    fn failed(failure: AnalysisFailure) -> Self {
        LifecycleState::Failed {
            kind: failure.kind,
            message: failure.message,
        }
    }
}

/// Policy knobs applied during the `Validating` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPolicy {
    pub upload: UploadPolicy,
    pub min_job_description_chars: usize,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            upload: UploadPolicy::default(),
            min_job_description_chars: DEFAULT_MIN_CHARS,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a submission is already in progress")]
    AlreadyInFlight,

    #[error("submission task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("no analysis results are available")]
    NoResults,

    #[error("no result at index {0}")]
    OutOfRange(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no submission is in flight")]
pub struct NothingInFlight;

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub submission_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub state: LifecycleState,
    pub job_description: Option<JobDescriptionReport>,
    pub skipped: Vec<RejectedDocument>,
    pub rows: Vec<ResultRow>,
    pub selected: Option<CandidateDetail>,
}

#[derive(Debug)]
struct Submission {
    id: Uuid,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    job_description: JobDescriptionReport,
    skipped: Vec<RejectedDocument>,
}

#[derive(Debug)]
struct Inner {
    state: LifecycleState,
    submission: Option<Submission>,
    selected: Option<usize>,
    cancel: Option<watch::Sender<bool>>,
}

impl Inner {
    fn results(&self) -> &[CandidateResult] {
        match &self.state {
            LifecycleState::Success { response } => &response.results,
            _ => &[],
        }
    }

    fn snapshot(&self) -> Snapshot {
        let results = self.results();
        Snapshot {
            submission_id: self.submission.as_ref().map(|s| s.id),
            started_at: self.submission.as_ref().map(|s| s.started_at),
            finished_at: self.submission.as_ref().and_then(|s| s.finished_at),
            state: self.state.clone(),
            job_description: self.submission.as_ref().map(|s| s.job_description),
            skipped: self
                .submission
                .as_ref()
                .map(|s| s.skipped.clone())
                .unwrap_or_default(),
            rows: project_rows(results),
            selected: self
                .selected
                .and_then(|i| results.get(i))
                .map(project_detail),
        }
    }

    fn finish(&mut self, state: LifecycleState) {
        self.state = state;
        self.cancel = None;
        if let Some(submission) = self.submission.as_mut() {
            submission.finished_at = Some(Utc::now());
        }
    }
}

/// The single holder of lifecycle state. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Mutex<Inner>>,
    client: Arc<dyn AnalysisClient>,
    policy: SubmissionPolicy,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn AnalysisClient>, policy: SubmissionPolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: LifecycleState::Idle,
                submission: None,
                selected: None,
                cancel: None,
            })),
            client,
            policy,
        }
    }

    pub fn policy(&self) -> &SubmissionPolicy {
        &self.policy
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.inner.lock().await.snapshot()
    }

    /// Runs one submission to completion and returns the resulting snapshot.
    ///
    /// The outbound call runs on its own task, so dropping the returned future
    /// does not leave the orchestrator stuck in `InFlight`.
    pub async fn submit(
        &self,
        job_description: &str,
        candidates: Vec<CandidateFile>,
    ) -> Result<Snapshot, SubmitError> {
        let (request, cancelled, id) = {
            let mut inner = self.inner.lock().await;
            if inner.state.is_outstanding() {
                warn!("Rejected submission: another submission is outstanding");
                return Err(SubmitError::AlreadyInFlight);
            }

            let id = Uuid::new_v4();
            let report =
                validate_job_description(job_description, self.policy.min_job_description_chars);
            inner.state = LifecycleState::Validating;
            inner.selected = None;
            inner.cancel = None;
            inner.submission = Some(Submission {
                id,
                started_at: Utc::now(),
                finished_at: None,
                job_description: report,
                skipped: Vec::new(),
            });
            info!("Submission {id}: validating {} file(s)", candidates.len());

            match self.validate(job_description, report, candidates, &mut inner) {
                Ok(request) => {
                    let (tx, rx) = watch::channel(false);
                    inner.cancel = Some(tx);
                    inner.state = LifecycleState::InFlight;
                    info!(
                        "Submission {id}: in flight with {} document(s)",
                        request.documents.len()
                    );
                    (request, rx, id)
                }
                Err(failure) => {
                    info!("Submission {id}: validation failed: {}", failure.message);
                    inner.finish(LifecycleState::failed(failure));
                    return Ok(inner.snapshot());
                }
            }
        };

        let this = self.clone();
        let task = tokio::spawn(async move { this.complete(id, request, cancelled).await });

        task.await.map_err(|e| {
            warn!("Submission {id}: task aborted: {e}");
            SubmitError::Aborted(e.to_string())
        })
    }

    /// Cancels the outstanding call, if any.
    pub async fn cancel(&self) -> Result<(), NothingInFlight> {
        let inner = self.inner.lock().await;
        match (&inner.state, &inner.cancel) {
            (LifecycleState::InFlight, Some(tx)) => {
                // A send error means the call already finished; nothing to do.
                let _ = tx.send(true);
                Ok(())
            }
            _ => Err(NothingInFlight),
        }
    }

    /// Marks a result row as selected and returns its detail view.
    pub async fn select(&self, index: usize) -> Result<CandidateDetail, SelectError> {
        let mut inner = self.inner.lock().await;
        let LifecycleState::Success { response } = &inner.state else {
            return Err(SelectError::NoResults);
        };
        let detail = response
            .results
            .get(index)
            .map(project_detail)
            .ok_or(SelectError::OutOfRange(index))?;
        inner.selected = Some(index);
        Ok(detail)
    }

    pub async fn close_detail(&self) {
        self.inner.lock().await.selected = None;
    }

    fn validate(
        &self,
        job_description: &str,
        report: JobDescriptionReport,
        candidates: Vec<CandidateFile>,
        inner: &mut Inner,
    ) -> Result<SubmissionRequest, AnalysisFailure> {
        let files = validate_files(candidates, &self.policy.upload);
        if let Some(submission) = inner.submission.as_mut() {
            submission.skipped = files.rejected;
        }

        if report.is_empty {
            return Err(AnalysisFailure::new(
                ErrorKind::ValidationError,
                JOB_DESCRIPTION_REQUIRED,
            ));
        }
        if files.accepted.is_empty() {
            return Err(AnalysisFailure::new(
                ErrorKind::ValidationError,
                RESUME_REQUIRED,
            ));
        }

        Ok(SubmissionRequest {
            job_description: job_description.trim().to_string(),
            documents: files.accepted,
        })
    }

    async fn complete(
        &self,
        id: Uuid,
        request: SubmissionRequest,
        cancelled: watch::Receiver<bool>,
    ) -> Snapshot {
        let outcome = tokio::select! {
            outcome = self.client.analyze(&request) => Some(outcome),
            _ = wait_for_cancel(cancelled) => None,
        };
        drop(request);

        let next = match outcome {
            None => {
                info!("Submission {id}: cancelled");
                LifecycleState::failed(AnalysisFailure::new(
                    ErrorKind::Cancelled,
                    CANCELLED_MESSAGE,
                ))
            }
            Some(outcome) => match classify(outcome) {
                Ok(response) => {
                    info!(
                        "Submission {id}: succeeded with {} result(s)",
                        response.results.len()
                    );
                    LifecycleState::Success { response }
                }
                Err(failure) => {
                    warn!("Submission {id}: failed: {failure}");
                    LifecycleState::failed(failure)
                }
            },
        };

        let mut inner = self.inner.lock().await;
        inner.finish(next);
        inner.snapshot()
    }
}

/// Resolves once `true` is sent. Never resolves if the sender goes away.
async fn wait_for_cancel(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
