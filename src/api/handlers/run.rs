// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! `/run`: execute a snippet in the sandbox.

use axum::{extract::State, Json};
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::api::middleware::JsonBody;
use crate::api::models::parse_run_request;
use crate::api::state::AppState;
use crate::telemetry::RequestSpan;
use crate::types::ExecutionResult;

/// Run a snippet. The snippet's own failure is still a 200.
///
/// If the client goes away the handler future is dropped, which kills the
/// interpreter's process group.
pub async fn run(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<Json<ExecutionResult>> {
    let span = RequestSpan::start("run");
    let result = async {
        let request = parse_run_request(&body, state.config.max_code_bytes)?;
        span.record_code_size(request.code.len());

        let _permit = state.limiter.acquire().await?;
        let time_limit = state.config.sandbox.effective_timeout(request.timeout_ms);
        debug!(
            time_limit_ms = time_limit.as_millis() as u64,
            active_runs = state.limiter.active(),
            "Run admitted"
        );

        let result = state
            .sandbox
            .execute(&request.code, time_limit, state.shutdown.child_token())
            .await?;
        Ok::<_, ApiError>(Json(result))
    }
    .await;
    span.finish_with_result(&result);
    result
}
