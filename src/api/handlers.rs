use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::health::HealthStatus;
use crate::monitor::{MetricsView, PlotSeries, SnapshotBoard};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub status: HealthStatus,
    pub label: &'static str,
    pub metrics: MetricsView,
    pub last_update_ms: Option<u64>,
    pub next_download_ms: Option<u64>,
}

pub async fn get_status(State(board): State<Arc<SnapshotBoard>>) -> Json<StatusResponse> {
    let snapshot = board.snapshot();
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        status: snapshot.status,
        label: snapshot.label,
        metrics: snapshot.metrics,
        last_update_ms: snapshot.last_update_ms,
        next_download_ms: snapshot.next_download_ms,
    })
}

pub async fn get_history(State(board): State<Arc<SnapshotBoard>>) -> Json<PlotSeries> {
    Json(board.snapshot().series.clone())
}

pub async fn healthz() -> &'static str {
    "ok"
}
