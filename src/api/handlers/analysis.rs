// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! `/autocomplete` and `/hover`.

use axum::{extract::State, Json};

use crate::api::error::{ApiError, ApiResult};
use crate::api::middleware::JsonBody;
use crate::api::models::{parse_analysis_request, AutocompleteResponse, HoverResponse};
use crate::api::state::AppState;
use crate::telemetry::RequestSpan;
use crate::types::LookupMode;

/// Completion suggestions at the cursor.
pub async fn autocomplete(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<Json<AutocompleteResponse>> {
    let span = RequestSpan::start("autocomplete");
    let result = async {
        let request = parse_analysis_request(&body, state.config.max_code_bytes)?;
        span.record_code_size(request.code.len());

        let suggestions = state
            .analysis
            .complete(&request.code, request.line, request.column)
            .await?;
        span.record_result_count(suggestions.len());
        Ok::<_, ApiError>(Json(AutocompleteResponse { suggestions }))
    }
    .await;
    span.finish_with_result(&result);
    result
}

/// Hover documentation for the symbol under the cursor.
pub async fn hover(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<Json<HoverResponse>> {
    let span = RequestSpan::start("hover");
    let result = async {
        let request = parse_analysis_request(&body, state.config.max_code_bytes)?;
        span.record_code_size(request.code.len());

        let definitions = state
            .analysis
            .lookup(&request.code, request.line, request.column, LookupMode::Goto)
            .await?;
        let contents: Vec<_> = definitions.iter().map(|d| state.docs.hover(d)).collect();
        span.record_result_count(contents.len());
        Ok::<_, ApiError>(Json(HoverResponse { contents }))
    }
    .await;
    span.finish_with_result(&result);
    result
}
