use serde::{Deserialize, Serialize};

/// Recommended minimum length of a job description, in characters.
pub const DEFAULT_MIN_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptionReport {
    pub trimmed_length: usize,
    pub is_empty: bool,
    pub is_low_detail: bool,
}

/// Checks a job description against the minimum-content heuristic.
///
/// Length is counted in characters after trimming surrounding whitespace.
/// A low-detail description is still submittable; only an empty one is not.
pub fn validate_job_description(text: &str, min_chars: usize) -> JobDescriptionReport {
    let trimmed_length = text.trim().chars().count();

    JobDescriptionReport {
        trimmed_length,
        is_empty: trimmed_length == 0,
        is_low_detail: trimmed_length > 0 && trimmed_length < min_chars,
    }
}
