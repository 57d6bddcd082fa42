//! Latency probe runner.
//!
//! # Responsibilities
//! - Issue a minimal HEAD request against the liveness endpoint
//! - Measure elapsed time from request start to response receipt
//! - Fold timeouts, cancellation and transport errors into a failed outcome
//!
//! # Design Decisions
//! - Any HTTP response counts as reachable, whatever the status code
//! - Caching is disabled per request so every probe reaches the network

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{EndpointConfig, TimingConfig};
use crate::probe::deadline::{self, ProbeError};
use crate::probe::outcome::ProbeOutcome;
use crate::schedule::Clock;

/// Something that can take one latency sample.
pub trait LatencyProbe: Send + Sync + 'static {
    fn probe(&self, cancel: &CancellationToken) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Probe `url` once, giving up after `timeout` or when `cancel` fires.
pub async fn probe(
    client: &Client,
    url: &str,
    timeout: Duration,
    cancel: &CancellationToken,
    clock: &dyn Clock,
) -> ProbeOutcome {
    let started = Instant::now();

    let result = deadline::within(timeout, cancel, async {
        let response = client
            .head(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;
        Ok::<_, ProbeError>(response.status())
    })
    .await;

    match result {
        Ok(status) => {
            let rtt_ms = round_ms(started.elapsed());
            tracing::debug!(url = %url, rtt_ms, status = %status, "Probe succeeded");
            ProbeOutcome::success(rtt_ms, clock.now_ms())
        }
        Err(e) => {
            let kind = e.kind();
            tracing::warn!(url = %url, kind = kind.as_str(), error = %e, "Probe failed");
            ProbeOutcome::failure(kind, clock.now_ms())
        }
    }
}

fn round_ms(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

/// HTTP latency prober bound to one endpoint.
#[derive(Clone)]
pub struct LatencyRunner {
    client: Client,
    url: String,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl LatencyRunner {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            url: url.into(),
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
        Self::new(client, endpoints.probe_url.clone(), timing.probe_timeout(), clock)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl LatencyProbe for LatencyRunner {
    async fn probe(&self, cancel: &CancellationToken) -> ProbeOutcome {
        probe(&self.client, &self.url, self.timeout, cancel, self.clock.as_ref()).await
    }
}
