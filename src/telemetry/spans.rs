// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Span helpers for consistent instrumentation.

use std::time::Instant;
use tracing::{info_span, Span};

/// RAII guard for timing one API request.
///
/// Records the endpoint, duration, and success/failure to metrics.
pub struct RequestSpan {
    endpoint: &'static str,
    start: Instant,
    span: Span,
}

impl RequestSpan {
    /// Start a new request span.
    pub fn start(endpoint: &'static str) -> Self {
        let span = info_span!(
            "request",
            endpoint = %endpoint,
            duration_ms = tracing::field::Empty,
            success = tracing::field::Empty,
            code_size = tracing::field::Empty,
            result_count = tracing::field::Empty,
        );

        Self {
            endpoint,
            start: Instant::now(),
            span,
        }
    }

    /// Get the underlying tracing span.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Record the size of the submitted source.
    pub fn record_code_size(&self, size: usize) {
        self.span.record("code_size", size as i64);
    }

    /// Record how many items the response carries.
    pub fn record_result_count(&self, count: usize) {
        self.span.record("result_count", count as i64);
    }

    /// Finish the span, recording duration and success.
    pub fn finish(self, success: bool) {
        let duration = self.start.elapsed();
        let duration_ms = duration.as_secs_f64() * 1000.0;

        self.span.record("duration_ms", duration_ms);
        self.span.record("success", success);

        #[cfg(feature = "telemetry")]
        super::metrics::GLOBAL_METRICS.record_request(self.endpoint, duration, success);

        tracing::debug!(
            parent: &self.span,
            endpoint = self.endpoint,
            "Request complete"
        );
    }

    /// Finish with a result, automatically determining success.
    pub fn finish_with_result<T, E>(self, result: &Result<T, E>) {
        self.finish(result.is_ok());
    }
}

/// RAII guard for timing any operation.
///
/// Records the operation name and duration to metrics when finished.
pub struct TimedOperation {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl TimedOperation {
    /// Start a new timed operation.
    pub fn start(name: &'static str) -> Self {
        let span = info_span!(
            "operation",
            op = %name,
            duration_ms = tracing::field::Empty,
        );

        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get elapsed time so far.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    /// Get the underlying span.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Finish and record the operation.
    pub fn finish(self) {
        let duration = self.start.elapsed();

        #[cfg(feature = "telemetry")]
        super::metrics::GLOBAL_METRICS.record_operation(self.name, duration);
        #[cfg(not(feature = "telemetry"))]
        let _ = (self.name, duration);
    }
}

impl Drop for TimedOperation {
    fn drop(&mut self) {
        // Duration lands on the span even when finish() is never reached
        let duration_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        self.span.record("duration_ms", duration_ms);
    }
}

/// Macro for timing an operation.
///
/// # Example
///
/// ```rust,ignore
/// use snipd::timed;
///
/// fn expensive_work() {
///     let timer = timed!("expensive_work");
///     // ... work happens ...
///     timer.finish();
/// }
/// ```
#[macro_export]
macro_rules! timed {
    ($name:expr) => {
        $crate::telemetry::TimedOperation::start($name)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_span_lifecycle() {
        let span = RequestSpan::start("autocomplete");
        span.record_code_size(100);
        span.record_result_count(5);
        span.finish(true);
    }

    #[test]
    fn test_request_span_with_result() {
        let span = RequestSpan::start("hover");
        let result: Result<(), &str> = Err("boom");
        span.finish_with_result(&result);
    }

    #[test]
    fn test_timed_operation() {
        let op = timed!("test_op");
        std::thread::sleep(std::time::Duration::from_millis(1));
        assert!(op.elapsed().as_micros() > 0);
        op.finish();
    }
}
