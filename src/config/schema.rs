//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the network monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Probe and download endpoints.
    pub endpoints: EndpointConfig,

    /// Classification threshold tables.
    pub thresholds: ThresholdConfig,

    /// Loop intervals, runner timeouts and history retention.
    pub timing: TimingConfig,

    /// Reliability window settings.
    pub reliability: ReliabilityConfig,

    /// Persisted history slot.
    pub storage: StorageConfig,

    /// Presentation throttling and plot sizing.
    pub presentation: PresentationConfig,

    /// Read-only status API.
    pub api: ApiConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
    /// Liveness endpoint probed with HEAD (a "204" style URL).
    pub probe_url: String,

    /// Fixed-size payload fetched with GET for throughput.
    pub download_url: String,

    /// Exact body length the download must deliver, if known.
    pub expected_download_bytes: Option<u64>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            probe_url: "https://www.gstatic.com/generate_204".to_string(),
            download_url: "https://speed.cloudflare.com/__down?bytes=131072".to_string(),
            expected_download_bytes: None,
        }
    }
}

/// Threshold tables for the three classified metrics.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ThresholdConfig {
    pub rtt: RttThresholds,
    pub success: SuccessThresholds,
    pub download: DownloadThresholds,
}

/// RTT thresholds (lower is better).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RttThresholds {
    /// Good at or below this many milliseconds.
    pub good_ms: u64,
    /// Warn at or below this many milliseconds, bad above.
    pub warn_ms: u64,
}

impl Default for RttThresholds {
    fn default() -> Self {
        Self {
            good_ms: 200,
            warn_ms: 500,
        }
    }
}

/// Success-rate thresholds in percent (higher is better).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SuccessThresholds {
    pub good_pct: u8,
    pub warn_pct: u8,
}

impl Default for SuccessThresholds {
    fn default() -> Self {
        Self {
            good_pct: 98,
            warn_pct: 95,
        }
    }
}

/// Download-speed thresholds in KB/s (higher is better).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DownloadThresholds {
    pub good_kbps: u64,
    pub warn_kbps: u64,
}

impl Default for DownloadThresholds {
    fn default() -> Self {
        Self {
            good_kbps: 250,
            warn_kbps: 100,
        }
    }
}

/// Timing configuration, all values in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Fast (latency) loop period.
    pub probe_interval_ms: u64,

    /// Slow (download) loop period.
    pub download_interval_ms: u64,

    /// Budget for a single latency probe.
    pub probe_timeout_ms: u64,

    /// Budget for a single download, body included.
    pub download_timeout_ms: u64,

    /// Points at or older than `now - retention_ms` are discarded.
    pub retention_ms: u64,
}

impl TimingConfig {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn download_interval(&self) -> Duration {
        Duration::from_millis(self.download_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_millis(self.download_timeout_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            probe_interval_ms: 1_000,
            download_interval_ms: 1_800_000,
            probe_timeout_ms: 6_000,
            download_timeout_ms: 12_000,
            retention_ms: 86_400_000,
        }
    }
}

/// Reliability window configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReliabilityConfig {
    /// Number of most recent probe outcomes kept for the success rate.
    pub window_size: usize,
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self { window_size: 8 }
    }
}

/// Persistence slot configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Persist to disk. When false an in-memory slot is used.
    pub enabled: bool,

    /// Directory holding the slot file.
    pub directory: String,

    /// Slot name; the file is `<directory>/<key>.json`.
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: ".".to_string(),
            key: "netmon_data".to_string(),
        }
    }
}

/// Presentation configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PresentationConfig {
    /// Plot series are attached to fast-loop updates roughly this often.
    pub chart_refresh_ms: u64,

    /// Upper bound on plotted points per series (24h / 5min = 288).
    pub max_plot_points: usize,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            chart_refresh_ms: 10_000,
            max_plot_points: 288,
        }
    }
}

/// Status API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Serve the status API.
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:8787").
    pub bind_address: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8787".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
