// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for snipd.
//!
//! Each component boundary has its own strongly-typed error, defined with
//! `thiserror`. Translation to wire responses happens only in the API layer
//! (see [`crate::api::error`]); nothing in here knows about HTTP.

use thiserror::Error;

/// A request field failed validation.
///
/// Reported to the client with the offending field name. No partial
/// processing happens once one of these is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the offending field, if the fault is attributable to one.
    pub field: Option<String>,
    /// Human-readable description safe to show to the client.
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for a specific field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Create a validation error for the request as a whole.
    pub fn body(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    /// A required field was absent.
    pub fn missing(field: &str) -> Self {
        Self::field(field, format!("missing required field '{field}'"))
    }
}

/// Errors raised by an analysis engine.
///
/// "No results" is never an error; these represent genuine engine faults.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis exceeded its budget of {0}ms")]
    Timeout(u64),

    #[error("Analysis engine failed: {0}")]
    Internal(String),

    #[error("Analysis engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Malformed engine response: {0}")]
    Protocol(String),
}

impl AnalysisError {
    /// Check if this error came from the wall-clock budget.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

/// Errors raised by the execution sandbox infrastructure.
///
/// The submitted code failing, exiting non-zero or timing out is *not* a
/// sandbox error: those outcomes are carried by
/// [`ExecutionResult`](crate::types::ExecutionResult).
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Failed to spawn interpreter: {0}")]
    Spawn(String),

    #[error("Failed to prepare sandbox: {0}")]
    Setup(String),

    #[error("Sandbox IO error: {0}")]
    Io(String),

    #[error("Server busy: {active} runs in progress")]
    Busy { active: usize },
}

impl SandboxError {
    /// Check if this error is a capacity rejection rather than a failure.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

impl From<std::io::Error> for SandboxError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl ConfigError {
    /// Create an invalid value error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::field("line", "line must be >= 1");
        assert_eq!(err.field.as_deref(), Some("line"));
        assert_eq!(err.to_string(), "line must be >= 1");
    }

    #[test]
    fn test_validation_error_missing() {
        let err = ValidationError::missing("code");
        assert_eq!(err.field.as_deref(), Some("code"));
        assert!(err.message.contains("code"));
    }

    #[test]
    fn test_analysis_error_timeout() {
        assert!(AnalysisError::Timeout(3000).is_timeout());
        assert!(!AnalysisError::Internal("boom".to_string()).is_timeout());
    }

    #[test]
    fn test_analysis_error_from_json() {
        let result: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: AnalysisError = result.unwrap_err().into();
        assert!(matches!(err, AnalysisError::Protocol(_)));
    }

    #[test]
    fn test_sandbox_error_busy() {
        assert!(SandboxError::Busy { active: 4 }.is_busy());
        assert!(!SandboxError::Spawn("no python".to_string()).is_busy());
    }

    #[test]
    fn test_sandbox_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: SandboxError = io_err.into();
        assert!(matches!(err, SandboxError::Io(_)));
    }

    #[test]
    fn test_config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_config_error_from_json() {
        let result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid json");
        let err: ConfigError = result.unwrap_err().into();
        assert!(matches!(err, ConfigError::JsonError(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::invalid("port", "must be non-zero");
        let display = format!("{}", err);
        assert!(display.contains("port"));
        assert!(display.contains("non-zero"));
    }
}
