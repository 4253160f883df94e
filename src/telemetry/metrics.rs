// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Metrics collection for performance monitoring.
//!
//! Provides lightweight in-process metrics without an external exporter.
//! The `/metrics` endpoint serves a [`MetricsSnapshot`] as JSON.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use serde::Serialize;

/// Global metrics instance.
pub static GLOBAL_METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// How a sandboxed run ended, from the server's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The snippet exited with status 0.
    Ok,
    /// The snippet exited non-zero or was killed by a resource limit.
    Error,
    /// The time limit expired.
    TimedOut,
    /// The run was cancelled (client disconnect, shutdown).
    Cancelled,
    /// No slot became free within the queue timeout.
    Rejected,
    /// The sandbox itself failed.
    SandboxFault,
}

/// Central metrics collection.
#[derive(Debug)]
pub struct Metrics {
    /// Per-endpoint request metrics, keyed by route name.
    endpoints: RwLock<BTreeMap<String, EndpointMetrics>>,

    /// General operation metrics (engine calls, formatting).
    operations: RwLock<BTreeMap<String, OperationMetrics>>,

    /// Sandbox outcome counters.
    runs: RunMetrics,

    /// Start time for calculating uptime.
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            endpoints: RwLock::new(BTreeMap::new()),
            operations: RwLock::new(BTreeMap::new()),
            runs: RunMetrics::default(),
            start_time: Instant::now(),
        }
    }

    /// Record a completed request. `success` is false for 5xx responses.
    pub fn record_request(&self, endpoint: &str, duration: Duration, success: bool) {
        let mut endpoints = write_lock(&self.endpoints);
        let metrics = endpoints
            .entry(endpoint.to_string())
            .or_insert_with(EndpointMetrics::new);
        metrics.record(duration, success);
    }

    /// Record a generic operation.
    pub fn record_operation(&self, name: &str, duration: Duration) {
        let mut ops = write_lock(&self.operations);
        let metrics = ops
            .entry(name.to_string())
            .or_insert_with(OperationMetrics::new);
        metrics.record(duration);
    }

    /// Record how a run ended.
    pub fn record_run(&self, outcome: RunOutcome, truncated: bool) {
        self.runs.record(outcome, truncated);
    }

    /// Get metrics for a specific endpoint.
    pub fn endpoint_metrics(&self, name: &str) -> Option<EndpointMetrics> {
        read_lock(&self.endpoints).get(name).cloned()
    }

    /// Get metrics for a specific operation.
    pub fn operation_metrics(&self, name: &str) -> Option<OperationMetrics> {
        read_lock(&self.operations).get(name).cloned()
    }

    /// Get sandbox outcome counts.
    pub fn run_counts(&self) -> RunCounts {
        self.runs.counts()
    }

    /// Get uptime since metrics were initialized.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Take a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let endpoints = read_lock(&self.endpoints)
            .iter()
            .map(|(name, m)| (name.clone(), m.summary()))
            .collect();
        let operations = read_lock(&self.operations)
            .iter()
            .map(|(name, m)| (name.clone(), m.summary()))
            .collect();

        MetricsSnapshot {
            uptime_secs: self.uptime().as_secs(),
            endpoints,
            operations,
            runs: self.runs.counts(),
        }
    }

    /// Reset all metrics.
    pub fn reset(&self) {
        write_lock(&self.endpoints).clear();
        write_lock(&self.operations).clear();
        self.runs.reset();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

// Metrics must keep working after a panicking writer, so poisoning is ignored.
fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// Request metrics for a single endpoint.
#[derive(Debug, Clone)]
pub struct EndpointMetrics {
    /// Total number of requests.
    pub requests: u64,

    /// Requests answered without a server fault.
    pub successes: u64,

    /// Requests that ended in a 5xx.
    pub failures: u64,

    /// Latency distribution.
    pub latency: OperationMetrics,
}

impl EndpointMetrics {
    /// Create new empty endpoint metrics.
    pub fn new() -> Self {
        Self {
            requests: 0,
            successes: 0,
            failures: 0,
            latency: OperationMetrics::new(),
        }
    }

    /// Record a request.
    pub fn record(&mut self, duration: Duration, success: bool) {
        self.requests += 1;
        if success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        self.latency.record(duration);
    }

    /// Calculate success rate (0.0 to 1.0).
    pub fn success_rate(&self) -> f64 {
        if self.requests == 0 {
            1.0
        } else {
            self.successes as f64 / self.requests as f64
        }
    }

    fn summary(&self) -> EndpointSummary {
        EndpointSummary {
            requests: self.requests,
            successes: self.successes,
            failures: self.failures,
            latency: self.latency.summary(),
        }
    }
}

impl Default for EndpointMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Generic operation metrics with histogram.
#[derive(Debug, Clone)]
pub struct OperationMetrics {
    /// Number of operations.
    pub count: u64,

    /// Total duration.
    pub total_duration: Duration,

    /// Minimum duration.
    pub min_duration: Duration,

    /// Maximum duration.
    pub max_duration: Duration,

    /// Histogram buckets for latency distribution.
    pub histogram: Histogram,
}

impl OperationMetrics {
    /// Create new operation metrics.
    pub fn new() -> Self {
        Self {
            count: 0,
            total_duration: Duration::ZERO,
            min_duration: Duration::MAX,
            max_duration: Duration::ZERO,
            histogram: Histogram::default(),
        }
    }

    /// Record an operation.
    pub fn record(&mut self, duration: Duration) {
        self.count += 1;
        self.total_duration += duration;
        self.min_duration = self.min_duration.min(duration);
        self.max_duration = self.max_duration.max(duration);
        self.histogram.record(duration);
    }

    /// Calculate average duration.
    pub fn avg_duration(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.count as u32
        }
    }

    fn summary(&self) -> LatencySummary {
        let min = if self.count == 0 {
            Duration::ZERO
        } else {
            self.min_duration
        };
        LatencySummary {
            count: self.count,
            avg_ms: as_ms(self.avg_duration()),
            min_ms: as_ms(min),
            max_ms: as_ms(self.max_duration),
            p50_ms: as_ms(self.histogram.p50()),
            p90_ms: as_ms(self.histogram.p90()),
            p99_ms: as_ms(self.histogram.p99()),
        }
    }
}

impl Default for OperationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn as_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Simple histogram with fixed buckets for latency tracking.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Bucket boundaries in microseconds.
    /// Default: [1ms, 10ms, 50ms, 100ms, 500ms, 1s, 5s, 30s, +inf]
    buckets: Vec<u64>,

    /// Count per bucket.
    counts: Vec<u64>,
}

impl Histogram {
    /// Create a histogram with custom bucket boundaries (in microseconds).
    pub fn with_buckets(buckets: Vec<u64>) -> Self {
        let counts = vec![0; buckets.len() + 1];
        Self { buckets, counts }
    }

    /// Record a duration value.
    pub fn record(&mut self, duration: Duration) {
        let micros = duration.as_micros() as u64;
        let bucket_idx = self
            .buckets
            .iter()
            .position(|&b| micros <= b)
            .unwrap_or(self.buckets.len());
        self.counts[bucket_idx] += 1;
    }

    /// Get counts for each bucket.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Get bucket boundaries.
    pub fn buckets(&self) -> &[u64] {
        &self.buckets
    }

    /// Calculate approximate percentile (p50, p90, p99, etc.).
    pub fn percentile(&self, p: f64) -> Duration {
        let total: u64 = self.counts.iter().sum();
        if total == 0 {
            return Duration::ZERO;
        }

        let target = (total as f64 * p / 100.0).ceil() as u64;
        let mut cumulative = 0u64;

        for (i, &count) in self.counts.iter().enumerate() {
            cumulative += count;
            if cumulative >= target {
                // Bucket boundary, or a large value for the overflow bucket
                let micros = if i < self.buckets.len() {
                    self.buckets[i]
                } else {
                    self.buckets.last().copied().unwrap_or(0) * 10
                };
                return Duration::from_micros(micros);
            }
        }

        Duration::ZERO
    }

    /// Get p50 (median) latency.
    pub fn p50(&self) -> Duration {
        self.percentile(50.0)
    }

    /// Get p90 latency.
    pub fn p90(&self) -> Duration {
        self.percentile(90.0)
    }

    /// Get p99 latency.
    pub fn p99(&self) -> Duration {
        self.percentile(99.0)
    }
}

impl Default for Histogram {
    fn default() -> Self {
        // Runs are measured in seconds, analysis in milliseconds
        Self::with_buckets(vec![
            1_000, 10_000, 50_000, 100_000, 500_000, 1_000_000, 5_000_000, 30_000_000,
        ])
    }
}

/// Thread-safe sandbox outcome counters.
#[derive(Debug, Default)]
struct RunMetrics {
    ok: AtomicU64,
    error: AtomicU64,
    timed_out: AtomicU64,
    cancelled: AtomicU64,
    rejected: AtomicU64,
    sandbox_faults: AtomicU64,
    truncated: AtomicU64,
}

impl RunMetrics {
    fn record(&self, outcome: RunOutcome, truncated: bool) {
        let counter = match outcome {
            RunOutcome::Ok => &self.ok,
            RunOutcome::Error => &self.error,
            RunOutcome::TimedOut => &self.timed_out,
            RunOutcome::Cancelled => &self.cancelled,
            RunOutcome::Rejected => &self.rejected,
            RunOutcome::SandboxFault => &self.sandbox_faults,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        if truncated {
            self.truncated.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn counts(&self) -> RunCounts {
        RunCounts {
            ok: self.ok.load(Ordering::Relaxed),
            error: self.error.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            sandbox_faults: self.sandbox_faults.load(Ordering::Relaxed),
            truncated: self.truncated.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        for counter in [
            &self.ok,
            &self.error,
            &self.timed_out,
            &self.cancelled,
            &self.rejected,
            &self.sandbox_faults,
            &self.truncated,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Sandbox outcome counts at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounts {
    pub ok: u64,
    pub error: u64,
    pub timed_out: u64,
    pub cancelled: u64,
    pub rejected: u64,
    pub sandbox_faults: u64,
    /// Runs whose output hit the capture cap (counted alongside the outcome).
    pub truncated: u64,
}

impl RunCounts {
    /// Runs that reached the sandbox and finished one way or another.
    pub fn total(&self) -> u64 {
        self.ok + self.error + self.timed_out + self.cancelled
    }
}

/// Latency figures in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencySummary {
    pub count: u64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p99_ms: f64,
}

/// Endpoint figures as served on `/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSummary {
    pub requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub latency: LatencySummary,
}

/// A snapshot of all metrics at a point in time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Uptime when snapshot was taken.
    pub uptime_secs: u64,

    /// Endpoint metrics by route name.
    pub endpoints: BTreeMap<String, EndpointSummary>,

    /// Operation metrics by name.
    pub operations: BTreeMap<String, LatencySummary>,

    /// Sandbox outcomes.
    pub runs: RunCounts,
}

impl MetricsSnapshot {
    /// Format as a human-readable report.
    pub fn format_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Metrics Report ===\n\n");
        report.push_str(&format!("Uptime: {}s\n", self.uptime_secs));
        report.push_str(&format!(
            "Runs: {} ok, {} error, {} timed out, {} cancelled, {} rejected, {} sandbox faults\n\n",
            self.runs.ok,
            self.runs.error,
            self.runs.timed_out,
            self.runs.cancelled,
            self.runs.rejected,
            self.runs.sandbox_faults
        ));

        if !self.endpoints.is_empty() {
            report.push_str("Endpoints:\n");
            for (name, metrics) in &self.endpoints {
                report.push_str(&format!(
                    "  {}: {} requests, {} failures, avg {:.1}ms, p99 {:.1}ms\n",
                    name,
                    metrics.requests,
                    metrics.failures,
                    metrics.latency.avg_ms,
                    metrics.latency.p99_ms
                ));
            }
            report.push('\n');
        }

        if !self.operations.is_empty() {
            report.push_str("Operations:\n");
            for (name, metrics) in &self.operations {
                report.push_str(&format!(
                    "  {}: {} ops, avg {:.1}ms, p99 {:.1}ms\n",
                    name, metrics.count, metrics.avg_ms, metrics.p99_ms
                ));
            }
        }

        report
    }
}

/// Convenience function to record a request to global metrics.
pub fn record_request(endpoint: &str, duration: Duration, success: bool) {
    GLOBAL_METRICS.record_request(endpoint, duration, success);
}

/// Convenience function to record an operation to global metrics.
pub fn record_operation(name: &str, duration: Duration) {
    GLOBAL_METRICS.record_operation(name, duration);
}

/// Convenience function to record a run outcome to global metrics.
pub fn record_run(outcome: RunOutcome, truncated: bool) {
    GLOBAL_METRICS.record_run(outcome, truncated);
}
