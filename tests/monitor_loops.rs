//! Both monitor loops running against local mock endpoints.

use std::sync::Arc;
use std::time::Duration;

use netmon::config::MonitorConfig;
use netmon::health::HealthStatus;
use netmon::history::{HistoryStore, PersistedDocument};
use netmon::lifecycle::startup::{http_runners, HttpMonitor};
use netmon::monitor::{Monitor, SnapshotBoard};
use netmon::schedule::SystemClock;

mod common;

struct Harness {
    monitor: HttpMonitor,
    board: Arc<SnapshotBoard>,
    probe_endpoint: common::MockEndpoint,
    download_endpoint: common::MockEndpoint,
}

async fn harness(store: HistoryStore, probe_ms: u64, download_ms: u64) -> Harness {
    let probe_endpoint = common::start_fixed(204, Vec::new()).await;
    let download_endpoint = common::start_payload(32 * 1024).await;

    let mut config = MonitorConfig::default();
    config.endpoints.probe_url = probe_endpoint.url("/generate_204");
    config.endpoints.download_url = download_endpoint.url("/payload");
    config.endpoints.expected_download_bytes = Some(32 * 1024);
    config.timing.probe_interval_ms = probe_ms;
    config.timing.download_interval_ms = download_ms;
    config.timing.probe_timeout_ms = 1_000;
    config.timing.download_timeout_ms = 2_000;

    let clock = Arc::new(SystemClock);
    let (latency, download) = http_runners(&config, clock.clone()).unwrap();
    let board = Arc::new(SnapshotBoard::new());
    let monitor = Monitor::new(&config, latency, download, store, board.clone(), clock);

    Harness {
        monitor,
        board,
        probe_endpoint,
        download_endpoint,
    }
}

#[tokio::test]
async fn test_loops_tick_independently() {
    let h = harness(HistoryStore::in_memory("loops"), 50, 200).await;
    let handle = h.monitor.start();

    tokio::time::sleep(Duration::from_millis(450)).await;
    handle.shutdown().await.unwrap();

    let probes = h.probe_endpoint.hits();
    let downloads = h.download_endpoint.hits();
    assert!(probes >= 4, "expected several probes, got {}", probes);
    assert!((1..=4).contains(&downloads), "unexpected download count {}", downloads);
    assert!(probes > downloads);

    let state = h.monitor.state();
    assert!(!state.rtt_history.is_empty());
    // Ticks cut short by shutdown hit the endpoint without recording.
    assert!((1..=downloads).contains(&state.download_history.len()));
    assert_eq!(state.reliability.success_rate(), Some(100));
    assert!(state.reliability.len() <= 8);
}

#[tokio::test]
async fn test_board_reflects_monitor() {
    let h = harness(HistoryStore::in_memory("board"), 50, 10_000).await;
    let handle = h.monitor.start();

    tokio::time::sleep(Duration::from_millis(300)).await;
    let snapshot = h.board.snapshot();
    handle.shutdown().await.unwrap();

    assert_ne!(snapshot.status, HealthStatus::Unknown);
    assert!(snapshot.metrics.rtt_ms.is_some());
    assert_eq!(snapshot.metrics.success_pct, Some(100));
    assert!(snapshot.last_update_ms.is_some());
}

#[tokio::test]
async fn test_cancel_probe_loop_leaves_download_loop_running() {
    let h = harness(HistoryStore::in_memory("cancel"), 50, 50).await;
    let handle = h.monitor.start();

    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.cancel_probe_loop();
    assert!(handle.probe_loop_cancelled());
    assert!(!handle.download_loop_cancelled());

    // Let any in-flight probe finish before sampling.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let probes = h.probe_endpoint.hits();
    let downloads = h.download_endpoint.hits();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.probe_endpoint.hits(), probes);
    assert!(h.download_endpoint.hits() > downloads);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_persists_and_restart_restores() {
    let dir = tempfile::tempdir().unwrap();

    let h = harness(HistoryStore::on_disk(dir.path(), "netmon_data"), 50, 10_000).await;
    let handle = h.monitor.start();
    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.shutdown().await.unwrap();

    let before = h.monitor.state();
    let text = std::fs::read_to_string(dir.path().join("netmon_data.json")).unwrap();
    let doc: PersistedDocument = serde_json::from_str(&text).unwrap();
    assert_eq!(doc.rtt_history.len(), before.rtt_history.len());
    assert_eq!(doc.last_probe_results.len(), before.reliability.len());
    assert!(doc.last_save > 0);

    let restarted = harness(HistoryStore::on_disk(dir.path(), "netmon_data"), 50, 10_000).await;
    let restored = restarted.monitor.state();
    assert_eq!(restored.rtt_history, before.rtt_history);
    assert_eq!(restored.download_history, before.download_history);
    assert_eq!(restored.reliability.to_vec(), before.reliability.to_vec());
}
