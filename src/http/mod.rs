//! Dashboard HTTP API.
//!
//! Serves the supervisor dashboard's JSON endpoints and a server-sent
//! events stream of store changes on `http_port`.

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::state::AppState;
use crate::{AppError, Result};

/// Serve the dashboard API until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` if the port cannot be bound or the server fails.
pub async fn serve_http(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let bind = SocketAddr::from(([127, 0, 0, 1], state.config.http_port));
    let router = routes::router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind HTTP on {bind}: {err}")))?;

    info!(%bind, "starting dashboard HTTP API");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Config(format!("HTTP server error: {err}")))?;

    info!("dashboard HTTP API shut down");
    Ok(())
}
