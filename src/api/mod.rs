// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! HTTP/JSON API.
//!
//! | Method | Path            | Body                     |
//! |--------|-----------------|--------------------------|
//! | POST   | `/autocomplete` | `{code, line, column}`   |
//! | POST   | `/hover`        | `{code, line, column}`   |
//! | POST   | `/run`          | `{code, timeoutMs?}`     |
//! | GET    | `/health`       |                          |
//! | GET    | `/metrics`      |                          |
//!
//! Every response body is JSON, errors included (`{error, field?}`).

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Serve the API on `listener` until `shutdown` is cancelled.
///
/// In-flight runs hold child tokens of `shutdown`, so they are killed
/// before connections drain.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    info!(
        address = %listener.local_addr()?,
        engine = state.analysis.engine_name(),
        max_concurrent_runs = state.limiter.capacity(),
        "snipd listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            info!("Shutting down, draining connections");
        })
        .await
}

/// Cancel `token` on Ctrl-C or SIGTERM.
pub async fn shutdown_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C"),
        _ = terminate => info!("Received SIGTERM"),
    }
    token.cancel();
}
