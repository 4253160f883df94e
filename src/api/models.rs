// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Request validation and response bodies.
//!
//! Requests are validated from a raw JSON value rather than derived
//! deserialization, so every failure names the offending field.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::types::{AnalysisRequest, Completion, HoverContent, RunRequest};

/// `{ "error": msg, "field": name }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AutocompleteResponse {
    pub suggestions: Vec<Completion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoverResponse {
    pub contents: Vec<HoverContent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub engine: &'static str,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub active_runs: usize,
    pub max_concurrent_runs: usize,
}

/// Validate an `/autocomplete` or `/hover` body.
pub fn parse_analysis_request(body: &Value, max_code_bytes: usize) -> Result<AnalysisRequest, ValidationError> {
    let object = object(body)?;
    Ok(AnalysisRequest {
        code: code(object, max_code_bytes)?,
        line: integer(object, "line", 1)?,
        column: integer(object, "column", 0)?,
    })
}

/// Validate a `/run` body.
pub fn parse_run_request(body: &Value, max_code_bytes: usize) -> Result<RunRequest, ValidationError> {
    let object = object(body)?;
    let timeout_ms = match object.get("timeoutMs") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            value
                .as_u64()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ValidationError::field("timeoutMs", "timeoutMs must be a positive integer"))?,
        ),
    };
    Ok(RunRequest {
        code: code(object, max_code_bytes)?,
        timeout_ms,
    })
}

fn object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    body.as_object()
        .ok_or_else(|| ValidationError::body("request body must be a JSON object"))
}

fn code(object: &Map<String, Value>, max_bytes: usize) -> Result<String, ValidationError> {
    let code = object
        .get("code")
        .ok_or_else(|| ValidationError::missing("code"))?
        .as_str()
        .ok_or_else(|| ValidationError::field("code", "code must be a string"))?;
    if code.len() > max_bytes {
        return Err(ValidationError::field(
            "code",
            format!("code exceeds the limit of {max_bytes} bytes"),
        ));
    }
    Ok(code.to_string())
}

fn integer(object: &Map<String, Value>, name: &str, min: u64) -> Result<usize, ValidationError> {
    object
        .get(name)
        .ok_or_else(|| ValidationError::missing(name))?
        .as_u64()
        .filter(|n| *n >= min)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ValidationError::field(name, format!("{name} must be an integer >= {min}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_analysis_request() {
        let request = parse_analysis_request(&json!({"code": "pri", "line": 1, "column": 3}), 1024).unwrap();
        assert_eq!(request.code, "pri");
        assert_eq!(request.line, 1);
        assert_eq!(request.column, 3);
    }

    #[test]
    fn test_field_errors() {
        let cases = [
            (json!({"line": 1, "column": 0}), "code"),
            (json!({"code": 5, "line": 1, "column": 0}), "code"),
            (json!({"code": "", "line": 0, "column": 0}), "line"),
            (json!({"code": "", "line": "1", "column": 0}), "line"),
            (json!({"code": "", "line": 1.5, "column": 0}), "line"),
            (json!({"code": "", "line": 1, "column": -1}), "column"),
            (json!({"code": "", "line": 1}), "column"),
        ];
        for (body, field) in cases {
            let err = parse_analysis_request(&body, 1024).unwrap_err();
            assert_eq!(err.field.as_deref(), Some(field), "body: {body}");
        }
    }

    #[test]
    fn test_non_object_body() {
        let err = parse_analysis_request(&json!([1, 2]), 1024).unwrap_err();
        assert_eq!(err.field, None);
    }

    #[test]
    fn test_code_size_limit() {
        let err = parse_run_request(&json!({"code": "x".repeat(11)}), 10).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("code"));
        assert!(parse_run_request(&json!({"code": "x".repeat(10)}), 10).is_ok());
    }

    #[test]
    fn test_run_timeout() {
        let request = parse_run_request(&json!({"code": "1", "timeoutMs": 250}), 64).unwrap();
        assert_eq!(request.timeout_ms, Some(250));
        let request = parse_run_request(&json!({"code": "1", "timeoutMs": null}), 64).unwrap();
        assert_eq!(request.timeout_ms, None);
        for bad in [json!(0), json!(-5), json!("100"), json!(1.5)] {
            let err = parse_run_request(&json!({"code": "1", "timeoutMs": bad}), 64).unwrap_err();
            assert_eq!(err.field.as_deref(), Some("timeoutMs"));
        }
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ErrorBody::new("server busy")).unwrap();
        assert_eq!(body, json!({"error": "server busy"}));
    }
}
