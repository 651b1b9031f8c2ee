use std::fmt;

use mime::Mime;
use serde::{Serialize, Serializer};

use crate::analysis::models::{CandidateFile, UploadedDocument};

pub const DEFAULT_MAX_SIZE_BYTES: u64 = 5 * 1024 * 1024;
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Type and size policy applied to every uploaded resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_size_bytes: u64,
    pub allowed_mime_type: String,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            allowed_mime_type: PDF_MIME_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    NotPdf,
    TooLarge,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::NotPdf => f.write_str("not a PDF"),
            RejectionReason::TooLarge => f.write_str("exceeds size limit"),
        }
    }
}

impl Serialize for RejectionReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedDocument {
    pub name: String,
    pub size_bytes: u64,
    pub reason: RejectionReason,
}

#[derive(Debug, Default)]
pub struct FileValidation {
    pub accepted: Vec<UploadedDocument>,
    pub rejected: Vec<RejectedDocument>,
}

/// Partitions candidates into accepted and rejected documents.
///
/// Every candidate is checked; a rejection never stops the pass. The type
/// check runs before the size check, so an oversized non-PDF reports
/// `not a PDF`. Input order is preserved within each partition.
pub fn validate_files(candidates: Vec<CandidateFile>, policy: &UploadPolicy) -> FileValidation {
    let mut result = FileValidation::default();

    for file in candidates {
        match check(&file, policy) {
            Some(reason) => result.rejected.push(RejectedDocument {
                name: file.name,
                size_bytes: file.size_bytes,
                reason,
            }),
            None => result.accepted.push(UploadedDocument {
                name: file.name,
                size_bytes: file.size_bytes,
                mime_type: file.mime_type,
                content: file.content,
            }),
        }
    }

    result
}

fn check(file: &CandidateFile, policy: &UploadPolicy) -> Option<RejectionReason> {
    if !mime_matches(&file.mime_type, &policy.allowed_mime_type) {
        return Some(RejectionReason::NotPdf);
    }
    if file.size_bytes > policy.max_size_bytes {
        return Some(RejectionReason::TooLarge);
    }
    None
}

/// Compares media types by essence, ignoring parameters and case.
fn mime_matches(declared: &str, allowed: &str) -> bool {
    match (declared.trim().parse::<Mime>(), allowed.parse::<Mime>()) {
        (Ok(declared), Ok(allowed)) => declared.essence_str() == allowed.essence_str(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(name: &str, mime: &str, size: u64) -> CandidateFile {
        CandidateFile {
            name: name.to_string(),
            size_bytes: size,
            mime_type: mime.to_string(),
            content: Bytes::from_static(b"%PDF-1.7"),
        }
    }

    #[test]
    fn test_accepts_pdf_within_limit() {
        let r = validate_files(vec![file("a.pdf", "application/pdf", 1024)], &UploadPolicy::default());
        assert_eq!(r.accepted.len(), 1);
        assert!(r.rejected.is_empty());
        assert_eq!(r.accepted[0].name, "a.pdf");
    }

    #[test]
    fn test_accepts_pdf_exactly_at_limit() {
        let r = validate_files(
            vec![file("a.pdf", "application/pdf", DEFAULT_MAX_SIZE_BYTES)],
            &UploadPolicy::default(),
        );
        assert_eq!(r.accepted.len(), 1);
    }

    #[test]
    fn test_rejects_oversized_pdf() {
        let r = validate_files(
            vec![file("big.pdf", "application/pdf", DEFAULT_MAX_SIZE_BYTES + 1)],
            &UploadPolicy::default(),
        );
        assert!(r.accepted.is_empty());
        assert_eq!(r.rejected[0].reason, RejectionReason::TooLarge);
        assert_eq!(r.rejected[0].reason.to_string(), "exceeds size limit");
    }

    #[test]
    fn test_rejects_non_pdf() {
        let r = validate_files(vec![file("cv.docx", "application/msword", 10)], &UploadPolicy::default());
        assert_eq!(r.rejected[0].reason.to_string(), "not a PDF");
    }

    #[test]
    fn test_type_check_wins_over_size_check() {
        let r = validate_files(
            vec![file("huge.png", "image/png", DEFAULT_MAX_SIZE_BYTES * 2)],
            &UploadPolicy::default(),
        );
        assert_eq!(r.rejected[0].reason, RejectionReason::NotPdf);
    }

    #[test]
    fn test_mime_parameters_and_case_are_ignored() {
        let r = validate_files(
            vec![
                file("a.pdf", "Application/PDF", 10),
                file("b.pdf", "application/pdf; name=b.pdf", 10),
            ],
            &UploadPolicy::default(),
        );
        assert_eq!(r.accepted.len(), 2);
    }

    #[test]
    fn test_unparseable_mime_is_not_pdf() {
        let r = validate_files(vec![file("x", "", 10)], &UploadPolicy::default());
        assert_eq!(r.rejected[0].reason, RejectionReason::NotPdf);
    }

    #[test]
    fn test_reports_every_rejection_in_one_pass() {
        let candidates = vec![
            file("a.txt", "text/plain", 10),
            file("b.pdf", "application/pdf", 10),
            file("c.pdf", "application/pdf", DEFAULT_MAX_SIZE_BYTES + 10),
            file("d.jpg", "image/jpeg", 10),
        ];
        let r = validate_files(candidates, &UploadPolicy::default());
        let rejected: Vec<_> = r.rejected.iter().map(|d| (d.name.as_str(), d.reason)).collect();
        assert_eq!(
            rejected,
            vec![
                ("a.txt", RejectionReason::NotPdf),
                ("c.pdf", RejectionReason::TooLarge),
                ("d.jpg", RejectionReason::NotPdf),
            ]
        );
        assert_eq!(r.accepted.len(), 1);
    }

    #[test]
    fn test_partition_covers_every_input_exactly_once() {
        let candidates: Vec<_> = (0..30u64)
            .map(|i| {
                let mime = if i % 3 == 0 { "text/plain" } else { "application/pdf" };
                let size = if i % 4 == 0 { DEFAULT_MAX_SIZE_BYTES + i } else { i * 1000 };
                file(&format!("file-{i}"), mime, size)
            })
            .collect();
        let mut expected: Vec<_> = candidates.iter().map(|c| (c.name.clone(), c.size_bytes)).collect();

        let r = validate_files(candidates, &UploadPolicy::default());
        let mut seen: Vec<_> = r
            .accepted
            .iter()
            .map(|d| (d.name.clone(), d.size_bytes))
            .chain(r.rejected.iter().map(|d| (d.name.clone(), d.size_bytes)))
            .collect();

        expected.sort();
        seen.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_empty_input_yields_empty_partitions() {
        let r = validate_files(vec![], &UploadPolicy::default());
        assert!(r.accepted.is_empty());
        assert!(r.rejected.is_empty());
    }

    #[test]
    fn test_rejection_reason_serializes_as_text() {
        let doc = RejectedDocument {
            name: "a.txt".to_string(),
            size_bytes: 3,
            reason: RejectionReason::NotPdf,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["reason"], "not a PDF");
    }
}
