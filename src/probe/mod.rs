//! Network measurement runners.
//!
//! # Data Flow
//! ```text
//! latency.rs:
//!     HEAD probe_url ──deadline.rs──▶ ProbeOutcome { ok, rtt, timestamp, error }
//!
//! download.rs:
//!     GET download_url, read full body ──deadline.rs──▶ DownloadOutcome { ok, speed, ... }
//! ```
//!
//! # Design Decisions
//! - Runners never return errors; failures become failed outcomes
//! - Every call takes a cancellation token and a time budget
//! - Traits (`LatencyProbe`, `ThroughputProbe`) let the monitor run against
//!   any measurement source

pub mod deadline;
pub mod download;
pub mod latency;
pub mod outcome;

pub use deadline::ProbeError;
pub use download::{measure_download, DownloadRunner, ThroughputProbe};
pub use latency::{probe, LatencyProbe, LatencyRunner};
pub use outcome::{DownloadOutcome, ErrorKind, ProbeOutcome};

/// Build the HTTP client shared by both runners.
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("netmon/", env!("CARGO_PKG_VERSION")))
        .build()
}
