// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! API error types and their JSON responses.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::error::{AnalysisError, SandboxError, ValidationError};

use super::models::ErrorBody;

/// Seconds a client should wait before retrying a busy `/run`.
const RETRY_AFTER_SECS: u64 = 1;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("expected Content-Type: application/json")]
    UnsupportedMediaType,

    #[error("not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("analysis failed")]
    Analysis(#[from] AnalysisError),

    #[error("execution sandbox unavailable")]
    Sandbox(#[from] SandboxError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Sandbox(e) if e.is_busy() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Sandbox(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the client. Infrastructure detail stays in the logs.
    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Validation(e) => ErrorBody {
                error: e.message.clone(),
                field: e.field.clone(),
            },
            ApiError::Sandbox(e) if e.is_busy() => ErrorBody::new("server busy"),
            other => ErrorBody::new(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
            StatusCode::UNSUPPORTED_MEDIA_TYPE => ApiError::UnsupportedMediaType,
            _ => ApiError::Validation(ValidationError::body(format!(
                "malformed JSON body: {}",
                rejection.body_text()
            ))),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Analysis(e) => error!(error = %e, "Analysis request failed"),
            ApiError::Sandbox(e) if e.is_busy() => warn!(error = %e, "Run rejected"),
            ApiError::Sandbox(e) => error!(error = %e, "Run request failed"),
            _ => {}
        }

        let mut response = (status, Json(self.body())).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
        }
        response
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ValidationError::missing("code")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AnalysisError::Timeout(3000)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(SandboxError::Busy { active: 4 }).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(SandboxError::Spawn("gone".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let body = ApiError::from(AnalysisError::Internal("secret path /srv/x".into())).body();
        assert_eq!(body.error, "analysis failed");
        let body = ApiError::from(SandboxError::Spawn("/usr/bin/python3 missing".into())).body();
        assert_eq!(body.error, "execution sandbox unavailable");
    }

    #[test]
    fn test_validation_body_has_field() {
        let body = ApiError::from(ValidationError::field("line", "line must be an integer >= 1")).body();
        assert_eq!(body.field.as_deref(), Some("line"));
    }

    #[test]
    fn test_busy_has_retry_after() {
        let response = ApiError::from(SandboxError::Busy { active: 2 }).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    }
}
