//! Network health status.
//!
//! # States
//! - Unknown: no metric has data yet
//! - Good / Warn / Bad: worst per-metric vote
//!
//! # Ordering
//! ```text
//! Unknown < Good < Warn < Bad
//! ```
//! Aggregation is `max` over the votes, so a single `Bad` dominates and
//! `Unknown` only survives when there were no votes at all.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Unknown,
    Good,
    Warn,
    Bad,
}

impl HealthStatus {
    /// Worst of `votes`, or `Unknown` if there are none.
    pub fn worst_of(votes: impl IntoIterator<Item = HealthStatus>) -> HealthStatus {
        votes.into_iter().max().unwrap_or(HealthStatus::Unknown)
    }

    /// Badge text.
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Good => "Good",
            HealthStatus::Warn => "Warning",
            HealthStatus::Bad => "Poor",
            HealthStatus::Unknown => "Checking...",
        }
    }

    /// Numeric encoding for gauges.
    pub fn as_gauge(&self) -> f64 {
        match self {
            HealthStatus::Unknown => 0.0,
            HealthStatus::Good => 1.0,
            HealthStatus::Warn => 2.0,
            HealthStatus::Bad => 3.0,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthStatus::Unknown => "unknown",
            HealthStatus::Good => "good",
            HealthStatus::Warn => "warn",
            HealthStatus::Bad => "bad",
        };
        f.write_str(s)
    }
}
