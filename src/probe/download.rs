//! Download throughput runner.
//!
//! # Responsibilities
//! - GET a fixed-size payload and read the whole body
//! - Compute KB/s over request start → last body byte
//! - Reject partial bodies; only a complete response inside the budget counts
//!
//! # Design Decisions
//! - Same timeout/cancellation semantics as the latency probe
//! - A non-2xx response is a failed measurement: an error page is not the payload

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{EndpointConfig, TimingConfig};
use crate::probe::deadline::{self, ProbeError};
use crate::probe::outcome::DownloadOutcome;
use crate::schedule::Clock;

/// Something that can take one throughput sample.
pub trait ThroughputProbe: Send + Sync + 'static {
    fn measure(&self, cancel: &CancellationToken) -> impl Future<Output = DownloadOutcome> + Send;
}

/// Download `url` once and report its speed.
///
/// `expected_bytes` pins the body length; otherwise a declared
/// `Content-Length` is enforced when the server sends one.
pub async fn measure_download(
    client: &Client,
    url: &str,
    expected_bytes: Option<u64>,
    timeout: Duration,
    cancel: &CancellationToken,
    clock: &dyn Clock,
) -> DownloadOutcome {
    let started = Instant::now();

    let result = deadline::within(timeout, cancel, async {
        let response = client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status));
        }

        let declared = response.content_length();
        let body = response.bytes().await?;
        let received = body.len() as u64;

        if let Some(expected) = expected_bytes.or(declared) {
            if received != expected {
                return Err(ProbeError::Truncated { expected, received });
            }
        }
        Ok::<_, ProbeError>(received)
    })
    .await;

    match result {
        Ok(bytes) => {
            let elapsed = started.elapsed();
            let speed = speed_kbps(bytes, elapsed);
            tracing::debug!(
                url = %url,
                bytes,
                elapsed_ms = elapsed.as_millis() as u64,
                speed_kbps = speed,
                "Download measured"
            );
            DownloadOutcome::success(speed, clock.now_ms())
        }
        Err(e) => {
            let kind = e.kind();
            tracing::warn!(url = %url, kind = kind.as_str(), error = %e, "Download failed");
            DownloadOutcome::failure(kind, clock.now_ms())
        }
    }
}

/// `round(bytes / 1024 / seconds)`.
pub fn speed_kbps(bytes: u64, elapsed: Duration) -> u64 {
    let seconds = elapsed.as_secs_f64().max(1e-6);
    ((bytes as f64 / 1024.0) / seconds).round() as u64
}

/// HTTP throughput prober bound to one payload URL.
#[derive(Clone)]
pub struct DownloadRunner {
    client: Client,
    url: String,
    expected_bytes: Option<u64>,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl DownloadRunner {
    pub fn new(
        client: Client,
        url: impl Into<String>,
        expected_bytes: Option<u64>,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            expected_bytes,
            timeout,
            clock,
        }
    }

    pub fn from_config(
        client: Client,
        endpoints: &EndpointConfig,
        timing: &TimingConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            client,
            endpoints.download_url.clone(),
            endpoints.expected_download_bytes,
            timing.download_timeout(),
            clock,
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ThroughputProbe for DownloadRunner {
    async fn measure(&self, cancel: &CancellationToken) -> DownloadOutcome {
        measure_download(
            &self.client,
            &self.url,
            self.expected_bytes,
            self.timeout,
            cancel,
            self.clock.as_ref(),
        )
        .await
    }
}
