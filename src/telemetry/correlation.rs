// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Correlation ID management for request tracing.

use std::fmt;
use uuid::Uuid;

/// Header carrying the correlation id on requests and responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A unique identifier for one API request.
///
/// Recorded on the request span and echoed back to the client, so a failed
/// request's server-side detail can be found from the response alone.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a new random correlation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Accept a client-supplied id if it is a UUID, otherwise mint a new one.
    pub fn from_header(value: Option<&str>) -> Self {
        value
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map(Self)
            .unwrap_or_default()
    }

    /// First 8 characters, for compact log lines.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CorrelationId({})", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_id_new() {
        let id1 = CorrelationId::new();
        let id2 = CorrelationId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_correlation_id_short() {
        let id = CorrelationId::new();
        assert_eq!(id.short().len(), 8);
    }

    #[test]
    fn test_from_header_trims_whitespace() {
        let id = CorrelationId::from_header(Some(" 550e8400-e29b-41d4-a716-446655440000\t"));
        assert_eq!(id.short(), "550e8400");
    }

    #[test]
    fn test_from_header_honours_uuid() {
        let id = CorrelationId::from_header(Some("550e8400-e29b-41d4-a716-446655440000"));
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_from_header_replaces_garbage() {
        let id = CorrelationId::from_header(Some("not-a-uuid"));
        assert_ne!(id.to_string(), "not-a-uuid");
        assert_eq!(id.to_string().len(), 36);

        let id = CorrelationId::from_header(None);
        assert_eq!(id.to_string().len(), 36);
    }

    #[test]
    fn test_correlation_id_debug() {
        let id = CorrelationId::new();
        let debug = format!("{:?}", id);
        assert!(debug.starts_with("CorrelationId("));
    }
}
