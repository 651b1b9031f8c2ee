use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file handed to the gateway by the operator, before any policy is applied.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub content: Bytes,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Bytes) -> Self {
        Self {
            name: name.into(),
            size_bytes: content.len() as u64,
            mime_type: mime_type.into(),
            content,
        }
    }
}

/// A resume that passed type and size checks. Only these are ever submitted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub content: Bytes,
}

/// Immutable payload for one outbound call. Built only after both validators pass.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub job_description: String,
    pub documents: Vec<UploadedDocument>,
}

/// One scored candidate as returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub candidate_name: String,
    pub final_score: f64,
    #[serde(default)]
    pub verdict: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

/// Successful body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_candidates: Option<u32>,
    pub results: Vec<CandidateResult>,
}
