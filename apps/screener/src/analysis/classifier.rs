//! Response classification. Turns a raw transport outcome into either a
//! fully-typed `AnalysisResponse` or exactly one `ErrorKind` with a
//! display-ready message.
//!
//! Detection order: network → HTTP status → JSON parse → schema.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::models::{AnalysisResponse, CandidateResult};

pub const NETWORK_ERROR_MESSAGE: &str =
    "Cannot reach the analysis service. Please make sure the server is running.";
pub const HTTP_ERROR_FALLBACK_MESSAGE: &str = "Failed to analyze resumes";
pub const PARSE_ERROR_MESSAGE: &str = "Invalid response from server";
pub const SCHEMA_ERROR_MESSAGE: &str = "Unexpected API response format";

/// What the outbound call produced, before any interpretation.
#[derive(Debug, Clone)]
pub enum TransportOutcome {
    /// The service could not be reached, or the body could not be read.
    Unreachable { reason: String },
    /// The service answered with a status line and a body.
    Responded { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    NetworkError,
    HttpError,
    ParseError,
    SchemaError,
    Cancelled,
}

/// A terminal failure of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind:?}: {message}")]
pub struct AnalysisFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl AnalysisFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Classifies one transport outcome. Total: every input maps to a success or
/// exactly one failure kind.
pub fn classify(outcome: TransportOutcome) -> Result<AnalysisResponse, AnalysisFailure> {
    let (status, body) = match outcome {
        TransportOutcome::Unreachable { reason } => {
            warn!("Analysis service unreachable: {reason}");
            return Err(AnalysisFailure::new(
                ErrorKind::NetworkError,
                NETWORK_ERROR_MESSAGE,
            ));
        }
        TransportOutcome::Responded { status, body } => (status, body),
    };

    if !(200..300).contains(&status) {
        warn!("Analysis service returned {status}: {body}");
        return Err(AnalysisFailure::new(
            ErrorKind::HttpError,
            http_error_message(&body),
        ));
    }

    let value: Value = serde_json::from_str(&body).map_err(|e| {
        warn!("Analysis response is not valid JSON: {e}");
        AnalysisFailure::new(ErrorKind::ParseError, PARSE_ERROR_MESSAGE)
    })?;

    let response = decode_response(value)?;
    debug!("Analysis response decoded: {} results", response.results.len());
    Ok(response)
}

/// Picks the most useful message out of an error body: `detail`, then
/// `message`, then the whole JSON document, then the raw text.
fn http_error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("detail")
            .and_then(truthy_text)
            .or_else(|| value.get("message").and_then(truthy_text))
            .unwrap_or_else(|| value.to_string()),
        Err(_) if body.trim().is_empty() => HTTP_ERROR_FALLBACK_MESSAGE.to_string(),
        Err(_) => body.to_string(),
    }
}

/// Strings are taken verbatim; other non-empty values are serialized.
/// `null`, `false`, `0` and `""` count as absent.
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

fn decode_response(value: Value) -> Result<AnalysisResponse, AnalysisFailure> {
    let schema_error = || AnalysisFailure::new(ErrorKind::SchemaError, SCHEMA_ERROR_MESSAGE);

    let Value::Object(mut map) = value else {
        warn!("Analysis response is not a JSON object");
        return Err(schema_error());
    };

    let Some(Value::Array(items)) = map.remove("results") else {
        warn!("Analysis response has no `results` array");
        return Err(schema_error());
    };

    let total_candidates = map
        .get("total_candidates")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok());

    let results = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let result: CandidateResult = serde_json::from_value(item).map_err(|e| {
                warn!("Result {i} does not match the candidate schema: {e}");
                schema_error()
            })?;
            if !(0.0..=100.0).contains(&result.final_score) {
                warn!("Result {i} has out-of-range score {}", result.final_score);
                return Err(schema_error());
            }
            Ok(result)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalysisResponse {
        total_candidates,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responded(status: u16, body: &str) -> TransportOutcome {
        TransportOutcome::Responded {
            status,
            body: body.to_string(),
        }
    }

    fn kind_of(outcome: TransportOutcome) -> Option<ErrorKind> {
        classify(outcome).err().map(|f| f.kind)
    }

    #[test]
    fn test_connection_refused_is_network_error() {
        let err = classify(TransportOutcome::Unreachable {
            reason: "connection refused".to_string(),
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NetworkError);
        assert_eq!(err.message, NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn test_http_500_with_detail() {
        let err = classify(responded(500, r#"{"detail":"x"}"#)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::HttpError);
        assert_eq!(err.message, "x");
    }

    #[test]
    fn test_http_500_with_plain_text() {
        let err = classify(responded(500, "boom")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::HttpError);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_http_200_with_invalid_json() {
        let err = classify(responded(200, "{not json")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert_eq!(err.message, PARSE_ERROR_MESSAGE);
    }

    #[test]
    fn test_http_200_without_results() {
        let err = classify(responded(200, r#"{"foo":1}"#)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SchemaError);
        assert_eq!(err.message, SCHEMA_ERROR_MESSAGE);
    }

    #[test]
    fn test_http_200_with_empty_results_is_success() {
        let response = classify(responded(200, r#"{"results":[]}"#)).unwrap();
        assert!(response.results.is_empty());
        assert_eq!(response.total_candidates, None);
    }

    #[test]
    fn test_message_field_used_when_detail_missing() {
        let err = classify(responded(400, r#"{"message":"bad upload"}"#)).unwrap_err();
        assert_eq!(err.message, "bad upload");
    }

    #[test]
    fn test_detail_preferred_over_message() {
        let err = classify(responded(400, r#"{"message":"m","detail":"d"}"#)).unwrap_err();
        assert_eq!(err.message, "d");
    }

    #[test]
    fn test_empty_detail_falls_through_to_message() {
        let err = classify(responded(400, r#"{"detail":"","message":"m"}"#)).unwrap_err();
        assert_eq!(err.message, "m");
    }

    #[test]
    fn test_structured_detail_is_serialized() {
        let err = classify(responded(422, r#"{"detail":[{"loc":["body","resumes"]}]}"#)).unwrap_err();
        assert_eq!(err.message, r#"[{"loc":["body","resumes"]}]"#);
    }

    #[test]
    fn test_json_without_known_fields_is_serialized_whole() {
        let err = classify(responded(503, r#"{"error":"down"}"#)).unwrap_err();
        assert_eq!(err.message, r#"{"error":"down"}"#);
    }

    #[test]
    fn test_empty_error_body_uses_fallback() {
        let err = classify(responded(502, "")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::HttpError);
        assert_eq!(err.message, HTTP_ERROR_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_http_error_detected_before_parse_error() {
        assert_eq!(kind_of(responded(404, "<html>")), Some(ErrorKind::HttpError));
    }

    #[test]
    fn test_results_of_wrong_shape_is_schema_error() {
        assert_eq!(
            kind_of(responded(200, r#"{"results":{"a":1}}"#)),
            Some(ErrorKind::SchemaError)
        );
        assert_eq!(kind_of(responded(200, "null")), Some(ErrorKind::SchemaError));
        assert_eq!(kind_of(responded(200, "[]")), Some(ErrorKind::SchemaError));
    }

    #[test]
    fn test_malformed_result_entry_is_schema_error() {
        let body = r#"{"results":[{"candidate_name":"A"}]}"#;
        assert_eq!(kind_of(responded(200, body)), Some(ErrorKind::SchemaError));
    }

    #[test]
    fn test_out_of_range_score_is_schema_error() {
        let body = r#"{"results":[{"candidate_name":"A","final_score":140}]}"#;
        assert_eq!(kind_of(responded(200, body)), Some(ErrorKind::SchemaError));
    }

    #[test]
    fn test_full_success_payload_decodes() {
        let body = r#"{
            "total_candidates": 2,
            "results": [
                {"candidate_name":"A","final_score":85,"verdict":"Strong fit","strengths":["Go"],"gaps":[]},
                {"candidate_name":"B","final_score":32.5,"verdict":"Weak Match","strengths":[],
                 "gaps":["Kubernetes","Terraform"],"explanation":"Limited infra exposure."}
            ]
        }"#;
        let response = classify(responded(200, body)).unwrap();
        assert_eq!(response.total_candidates, Some(2));
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].candidate_name, "A");
        assert_eq!(response.results[0].explanation, "");
        assert_eq!(response.results[1].gaps, vec!["Kubernetes", "Terraform"]);
    }

    #[test]
    fn test_any_2xx_is_success_status() {
        assert!(classify(responded(201, r#"{"results":[]}"#)).is_ok());
    }
}
