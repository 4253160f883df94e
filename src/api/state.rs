// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Application state shared across all API handlers.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::analysis::{build_engine, AnalysisAdapter, AnalysisEngine};
use crate::config::ResolvedConfig;
use crate::docs::DocFormatter;
use crate::sandbox::{ExecutionSandbox, RunLimiter, SubprocessSandbox};

/// Collaborators and limits for request handling.
///
/// Cloned per request; everything inside is shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ResolvedConfig>,
    pub analysis: AnalysisAdapter,
    pub docs: DocFormatter,
    pub sandbox: Arc<dyn ExecutionSandbox>,
    pub limiter: RunLimiter,
    /// Cancelled on server shutdown; every run holds a child token.
    pub shutdown: CancellationToken,
    pub started: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// State with the engine and sandbox the configuration selects.
    pub fn from_config(config: ResolvedConfig, shutdown: CancellationToken) -> Self {
        let engine = build_engine(&config);
        let sandbox = Arc::new(SubprocessSandbox::new(config.sandbox.clone()));
        Self::new(config, engine, sandbox, shutdown)
    }

    /// State with explicit collaborators.
    pub fn new(
        config: ResolvedConfig,
        engine: Arc<dyn AnalysisEngine>,
        sandbox: Arc<dyn ExecutionSandbox>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            analysis: AnalysisAdapter::new(engine, config.analysis_timeout()),
            docs: DocFormatter::new(),
            sandbox,
            limiter: RunLimiter::from_settings(&config.sandbox),
            shutdown,
            started: Instant::now(),
            started_at: Utc::now(),
            config: Arc::new(config),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
