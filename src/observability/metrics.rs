//! Metrics collection and exposition.
//!
//! # Metrics
//! - `netmon_probes_total` (counter): probe outcomes by result
//! - `netmon_downloads_total` (counter): download outcomes by result
//! - `netmon_rtt_ms` (gauge): last successful RTT
//! - `netmon_download_kbps` (gauge): last successful download speed
//! - `netmon_success_rate_percent` (gauge): reliability window success rate
//! - `netmon_health_status` (gauge): 0=unknown, 1=good, 2=warn, 3=bad
//! - `netmon_history_points` (gauge): stored points per series
//! - `netmon_storage_failures_total` (counter): failed loads/saves
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::HealthStatus;
use crate::probe::{DownloadOutcome, ErrorKind, ProbeOutcome};

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

fn result_label(ok: bool, error: Option<ErrorKind>) -> &'static str {
    match (ok, error) {
        (true, _) => "ok",
        (false, Some(kind)) => kind.as_str(),
        (false, None) => ErrorKind::Other.as_str(),
    }
}

pub fn record_probe(outcome: &ProbeOutcome) {
    metrics::counter!("netmon_probes_total", "result" => result_label(outcome.ok, outcome.error))
        .increment(1);
    if let Some(rtt) = outcome.rtt_sample() {
        metrics::gauge!("netmon_rtt_ms").set(rtt as f64);
    }
}

pub fn record_download(outcome: &DownloadOutcome) {
    metrics::counter!("netmon_downloads_total", "result" => result_label(outcome.ok, outcome.error))
        .increment(1);
    if let Some(speed) = outcome.speed_sample() {
        metrics::gauge!("netmon_download_kbps").set(speed as f64);
    }
}

pub fn record_health(status: HealthStatus, success_pct: Option<u8>) {
    metrics::gauge!("netmon_health_status").set(status.as_gauge());
    if let Some(pct) = success_pct {
        metrics::gauge!("netmon_success_rate_percent").set(f64::from(pct));
    }
}

pub fn record_history(rtt_points: usize, download_points: usize) {
    metrics::gauge!("netmon_history_points", "series" => "rtt").set(rtt_points as f64);
    metrics::gauge!("netmon_history_points", "series" => "download").set(download_points as f64);
}

pub fn record_storage_failure(op: &'static str) {
    metrics::counter!("netmon_storage_failures_total", "op" => op).increment(1);
}
