//! Presentation model and sinks.
//!
//! # Responsibilities
//! - Shape monitor state into what a dashboard draws
//! - Bound plot cost (redraw gate, downsampling)
//! - Keep the latest snapshot for the status API
//!
//! # Design Decisions
//! - Metrics and status go out on every update; plot series only when due
//! - Downsampling affects plotting only, never stored history

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::health::HealthStatus;
use crate::history::{HistorySeries, TimeSeriesPoint};

/// Latest metric values. `None` renders as "no data".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsView {
    pub rtt_ms: Option<u64>,
    pub success_pct: Option<u8>,
    pub download_kbps: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: u64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlotSeries {
    pub rtt: Vec<PlotPoint>,
    pub download: Vec<PlotPoint>,
}

impl PlotSeries {
    pub fn from_history(rtt: &HistorySeries, download: &HistorySeries, max_points: usize) -> Self {
        Self {
            rtt: downsample(rtt.points(), max_points),
            download: downsample(download.points(), max_points),
        }
    }
}

/// Average equal-count buckets so at most `max_points` remain.
pub fn downsample(points: &[TimeSeriesPoint], max_points: usize) -> Vec<PlotPoint> {
    let max_points = max_points.max(1);
    if points.len() <= max_points {
        return points
            .iter()
            .map(|p| PlotPoint {
                x: p.timestamp,
                y: p.value as f64,
            })
            .collect();
    }

    let bucket = points.len().div_ceil(max_points);
    points
        .chunks(bucket)
        .map(|chunk| {
            let n = chunk.len() as u128;
            let x = chunk.iter().map(|p| u128::from(p.timestamp)).sum::<u128>() / n;
            let y = chunk.iter().map(|p| p.value as f64).sum::<f64>() / chunk.len() as f64;
            PlotPoint { x: x as u64, y }
        })
        .collect()
}

/// One push to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardUpdate {
    pub metrics: MetricsView,
    pub status: HealthStatus,
    /// Present only when the plots should be redrawn.
    pub series: Option<PlotSeries>,
    pub last_update_ms: u64,
    /// `None` means a download is due soon.
    pub next_download_ms: Option<u64>,
}

/// Consumer of dashboard updates.
pub trait PresentationSink: Send + Sync + 'static {
    fn publish(&self, update: &DashboardUpdate);
}

/// Time-modulo redraw throttle: passes when `now % refresh < tick`.
///
/// With a 1s tick and a 10s refresh this lets roughly one tick in ten through.
#[derive(Debug, Clone, Copy)]
pub struct RedrawGate {
    refresh_ms: u64,
    tick_ms: u64,
}

impl RedrawGate {
    pub fn new(refresh_ms: u64, tick_ms: u64) -> Self {
        Self {
            refresh_ms: refresh_ms.max(1),
            tick_ms,
        }
    }

    pub fn should_redraw(&self, now_ms: u64) -> bool {
        now_ms % self.refresh_ms < self.tick_ms
    }
}

/// What the status API serves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub metrics: MetricsView,
    pub status: HealthStatus,
    pub label: &'static str,
    pub last_update_ms: Option<u64>,
    pub next_download_ms: Option<u64>,
    pub series: PlotSeries,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self {
            metrics: MetricsView::default(),
            status: HealthStatus::Unknown,
            label: HealthStatus::Unknown.label(),
            last_update_ms: None,
            next_download_ms: None,
            series: PlotSeries::default(),
        }
    }
}

/// Keeps the latest snapshot, carrying plot series over updates that omit them.
#[derive(Debug, Default)]
pub struct SnapshotBoard {
    current: ArcSwap<DashboardSnapshot>,
}

impl SnapshotBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.current.load_full()
    }
}

impl PresentationSink for SnapshotBoard {
    fn publish(&self, update: &DashboardUpdate) {
        self.current.rcu(|previous| DashboardSnapshot {
            metrics: update.metrics,
            status: update.status,
            label: update.status.label(),
            last_update_ms: Some(update.last_update_ms),
            next_download_ms: update.next_download_ms,
            series: update
                .series
                .clone()
                .unwrap_or_else(|| previous.series.clone()),
        });
    }
}
