use std::time::Duration;

use anyhow::{Context, Result};

use crate::analysis::file_validator::{UploadPolicy, PDF_MIME_TYPE};
use crate::analysis::orchestrator::SubmissionPolicy;

const MIB: u64 = 1024 * 1024;

/// Gateway configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the remote analysis service, e.g. `http://127.0.0.1:8000`.
    pub analysis_service_url: String,
    pub port: u16,
    pub rust_log: String,
    pub request_timeout: Duration,
    pub max_resume_size_mb: u64,
    pub jd_min_chars: usize,
    pub upload_body_limit_mb: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            analysis_service_url: require_env("ANALYSIS_SERVICE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 120)?),
            max_resume_size_mb: parse_env("MAX_RESUME_SIZE_MB", 5)?,
            jd_min_chars: parse_env("JD_MIN_CHARS", 50)?,
            upload_body_limit_mb: parse_env("UPLOAD_BODY_LIMIT_MB", 64)?,
        })
    }

    pub fn submission_policy(&self) -> SubmissionPolicy {
        SubmissionPolicy {
            upload: UploadPolicy {
                max_size_bytes: self.max_resume_size_mb * MIB,
                allowed_mime_type: PDF_MIME_TYPE.to_string(),
            },
            min_job_description_chars: self.jd_min_chars,
        }
    }

    /// Request body cap for multipart uploads. Must exceed the per-file limit
    /// so oversized resumes reach the validator and get a proper reason.
    pub fn upload_body_limit_bytes(&self) -> usize {
        let limit = self.upload_body_limit_mb.max(self.max_resume_size_mb * 4) * MIB;
        usize::try_from(limit).unwrap_or(usize::MAX)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
