// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! API route definitions

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ResolvedConfig;
use crate::telemetry::REQUEST_ID_HEADER;

use super::handlers::{analysis, health, run};
use super::middleware::{correlation_id, json_errors, make_span, panic_response};
use super::state::AppState;

/// API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/autocomplete", post(analysis::autocomplete))
        .route("/hover", post(analysis::hover))
        .route("/run", post(run::run))
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .fallback(health::not_found)
}

/// The full application: routes plus the middleware stack.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();
    api_routes()
        .layer(DefaultBodyLimit::max(config.max_request_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(json_errors))
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(cors(&config))
        .layer(middleware::from_fn(correlation_id))
        .with_state(state)
}

/// CORS for browser editors: any origin unless a list is configured.
pub fn cors(config: &ResolvedConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
