//! Analysis client: the only place that talks to the remote analysis service.
//!
//! The client never interprets the reply; it reports what happened on the wire
//! as a `TransportOutcome` and leaves classification to `classifier`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, warn};

use crate::analysis::classifier::TransportOutcome;
use crate::analysis::models::SubmissionRequest;

pub const ANALYZE_PATH: &str = "/analyze";
pub const JOB_DESCRIPTION_FIELD: &str = "job_description";
pub const RESUMES_FIELD: &str = "resumes";

/// Outbound seam used by the orchestrator. Swap implementations without
/// touching the state machine.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, request: &SubmissionRequest) -> TransportOutcome;
}

/// Multipart HTTP client for `POST {origin}/analyze`.
#[derive(Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    endpoint: String,
}

impl HttpAnalysisClient {
    pub fn new(origin: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: format!("{}{ANALYZE_PATH}", origin.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, request: &SubmissionRequest) -> TransportOutcome {
        let form = match build_form(request) {
            Ok(form) => form,
            Err(e) => {
                return TransportOutcome::Unreachable {
                    reason: format!("could not build multipart request: {e}"),
                }
            }
        };

        debug!(
            "POST {} with {} document(s)",
            self.endpoint,
            request.documents.len()
        );

        let response = match self.client.post(&self.endpoint).multipart(form).send().await {
            Ok(r) => r,
            Err(e) => {
                let cause = if e.is_timeout() {
                    "timed out"
                } else if e.is_connect() {
                    "connection failed"
                } else {
                    "request failed"
                };
                warn!("Analysis request {cause}: {e}");
                return TransportOutcome::Unreachable {
                    reason: format!("{cause}: {e}"),
                };
            }
        };

        let status = response.status().as_u16();

        match response.text().await {
            Ok(body) => TransportOutcome::Responded { status, body },
            Err(e) => {
                warn!("Failed to read analysis response body (status {status}): {e}");
                TransportOutcome::Unreachable {
                    reason: format!("body read failed: {e}"),
                }
            }
        }
    }
}

fn build_form(request: &SubmissionRequest) -> Result<Form, reqwest::Error> {
    let mut form = Form::new().text(JOB_DESCRIPTION_FIELD, request.job_description.clone());

    for doc in &request.documents {
        // `Bytes` clones share the buffer; no copy of the document is made.
        let part = Part::stream_with_length(doc.content.clone(), doc.size_bytes)
            .file_name(doc.name.clone())
            .mime_str(&doc.mime_type)?;
        form = form.part(RESUMES_FIELD, part);
    }

    Ok(form)
}
