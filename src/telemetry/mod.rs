// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Telemetry, tracing, and metrics infrastructure.
//!
//! This module provides observability infrastructure for snipd:
//!
//! - **Tracing**: Structured logging with one span per HTTP request
//! - **Metrics**: Per-endpoint counters and latency histograms, sandbox outcomes
//! - **Correlation IDs**: Per-request ids echoed in the `x-request-id` header
//!
//! # Usage
//!
//! Initialize telemetry at application startup:
//!
//! ```rust,ignore
//! use snipd::telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_flags(verbose, debug))?;
//! ```
//!
//! Metric recording is compiled in with the `telemetry` feature (default).
//! Never record snippet source or output in spans; record sizes and counts.

mod correlation;
mod init;
pub mod metrics;
mod spans;

pub use correlation::{CorrelationId, REQUEST_ID_HEADER};
pub use init::{init_telemetry, TelemetryConfig, TelemetryGuard};
pub use metrics::{
    EndpointMetrics, Histogram, Metrics, MetricsSnapshot, OperationMetrics, RunCounts, RunOutcome,
    GLOBAL_METRICS,
};
pub use spans::{RequestSpan, TimedOperation};
