// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! `/health` and `/metrics`.

use axum::{extract::State, Json};

use crate::api::error::ApiError;
use crate::api::models::HealthResponse;
use crate::api::state::AppState;
use crate::telemetry::{MetricsSnapshot, GLOBAL_METRICS};

/// Liveness plus the numbers an operator checks first.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        engine: state.analysis.engine_name(),
        started_at: state.started_at,
        uptime_secs: state.uptime_secs(),
        active_runs: state.limiter.active(),
        max_concurrent_runs: state.limiter.capacity(),
    })
}

/// In-process metrics snapshot.
pub async fn metrics() -> Json<MetricsSnapshot> {
    Json(GLOBAL_METRICS.snapshot())
}

/// JSON 404 for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
