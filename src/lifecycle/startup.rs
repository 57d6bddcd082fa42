//! Startup wiring.
//!
//! # Responsibilities
//! - Build the HTTP runners from endpoint and timing config
//! - Pick the persistence slot (file or memory)
//! - Assemble a `Monitor` publishing to a `SnapshotBoard`

use std::path::Path;
use std::sync::Arc;

use crate::config::{MonitorConfig, StorageConfig};
use crate::history::HistoryStore;
use crate::monitor::{Monitor, SnapshotBoard};
use crate::probe::{self, DownloadRunner, LatencyRunner};
use crate::schedule::Clock;

/// The monitor type the daemon runs.
pub type HttpMonitor = Monitor<LatencyRunner, DownloadRunner>;

/// Runners sharing one HTTP client.
pub fn http_runners(
    config: &MonitorConfig,
    clock: Arc<dyn Clock>,
) -> Result<(LatencyRunner, DownloadRunner), reqwest::Error> {
    let client = probe::build_client()?;
    let latency = LatencyRunner::from_config(client.clone(), &config.endpoints, &config.timing, clock.clone());
    let download = DownloadRunner::from_config(client, &config.endpoints, &config.timing, clock);
    Ok((latency, download))
}

pub fn history_store(config: &StorageConfig) -> HistoryStore {
    if config.enabled {
        HistoryStore::on_disk(Path::new(&config.directory), config.key.clone())
    } else {
        tracing::warn!("Storage disabled, history will not survive a restart");
        HistoryStore::in_memory(config.key.clone())
    }
}

/// Build the daemon's monitor and the board its updates land on.
pub fn build_monitor(
    config: &MonitorConfig,
    clock: Arc<dyn Clock>,
) -> Result<(HttpMonitor, Arc<SnapshotBoard>), reqwest::Error> {
    let (latency, download) = http_runners(config, clock.clone())?;
    let board = Arc::new(SnapshotBoard::new());
    let monitor = Monitor::new(
        config,
        latency,
        download,
        history_store(&config.storage),
        board.clone(),
        clock,
    );

    tracing::info!(
        probe_url = %config.endpoints.probe_url,
        download_url = %config.endpoints.download_url,
        probe_interval_ms = config.timing.probe_interval_ms,
        download_interval_ms = config.timing.download_interval_ms,
        "Monitor configured"
    );
    Ok((monitor, board))
}
