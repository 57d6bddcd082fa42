//! The single owned context shared by both loops.

use crate::health::HealthStatus;
use crate::history::{HistorySeries, PersistedDocument, TimeSeriesPoint};
use crate::monitor::presentation::MetricsView;
use crate::probe::{DownloadOutcome, ProbeOutcome};
use crate::reliability::ReliabilityWindow;

/// Histories, reliability window and the last derived status.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorState {
    pub rtt_history: HistorySeries,
    pub download_history: HistorySeries,
    pub reliability: ReliabilityWindow,
    pub last_status: HealthStatus,
    pub last_update_ms: Option<u64>,
}

impl MonitorState {
    pub fn new(window_size: usize) -> Self {
        Self {
            rtt_history: HistorySeries::new(),
            download_history: HistorySeries::new(),
            reliability: ReliabilityWindow::new(window_size),
            last_status: HealthStatus::Unknown,
            last_update_ms: None,
        }
    }

    pub fn from_document(doc: PersistedDocument, window_size: usize) -> Self {
        Self {
            rtt_history: doc.rtt_history,
            download_history: doc.download_history,
            reliability: ReliabilityWindow::from_outcomes(doc.last_probe_results, window_size),
            last_status: HealthStatus::Unknown,
            last_update_ms: None,
        }
    }

    pub fn to_document(&self, now_ms: u64) -> PersistedDocument {
        PersistedDocument {
            rtt_history: self.rtt_history.clone(),
            download_history: self.download_history.clone(),
            last_probe_results: self.reliability.to_vec(),
            last_save: now_ms,
        }
    }

    /// Every outcome feeds the window; only successes add an RTT point.
    pub fn record_probe(&mut self, outcome: ProbeOutcome) {
        self.reliability.record(outcome);
        if let Some(rtt) = outcome.rtt_sample() {
            self.rtt_history.append(TimeSeriesPoint::new(outcome.timestamp, rtt));
        }
    }

    /// Returns whether a point was stored.
    pub fn record_download(&mut self, outcome: DownloadOutcome) -> bool {
        match outcome.speed_sample() {
            Some(speed) => {
                self.download_history.append(TimeSeriesPoint::new(outcome.timestamp, speed));
                true
            }
            None => false,
        }
    }

    pub fn trim(&mut self, now_ms: u64, retention_ms: u64) {
        let dropped = self.rtt_history.trim(now_ms, retention_ms)
            + self.download_history.trim(now_ms, retention_ms);
        if dropped > 0 {
            tracing::debug!(dropped, "Trimmed history past retention");
        }
    }

    /// Record `status`, returning the previous one if it changed.
    pub fn observe_status(&mut self, status: HealthStatus) -> Option<HealthStatus> {
        let previous = std::mem::replace(&mut self.last_status, status);
        (previous != status).then_some(previous)
    }

    /// Latest displayed values: last stored RTT and speed, current success rate.
    pub fn metrics(&self) -> MetricsView {
        MetricsView {
            rtt_ms: self.rtt_history.latest_value(),
            success_pct: self.reliability.success_rate(),
            download_kbps: self.download_history.latest_value(),
        }
    }

    /// When the next download is due, or `None` if none has succeeded yet.
    pub fn next_download_ms(&self, download_interval_ms: u64) -> Option<u64> {
        self.download_history
            .latest()
            .map(|p| p.timestamp.saturating_add(download_interval_ms))
    }
}
