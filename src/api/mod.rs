//! Read-only status API.
//!
//! # Responsibilities
//! - Serve the latest dashboard snapshot as JSON
//! - Stop with the rest of the daemon on shutdown

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use self::handlers::*;
use crate::lifecycle::shutdown::signalled;
use crate::monitor::SnapshotBoard;

pub fn router(board: Arc<SnapshotBoard>) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/history", get(get_history))
        .route("/healthz", get(healthz))
        .with_state(board)
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on `listener` until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    board: Arc<SnapshotBoard>,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Status API listening");

    axum::serve(listener, router(board))
        .with_graceful_shutdown(signalled(shutdown))
        .await?;

    tracing::info!("Status API stopped");
    Ok(())
}
