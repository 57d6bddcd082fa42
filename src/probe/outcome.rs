//! Probe and download outcomes.

use serde::{Deserialize, Deserializer, Serialize};

/// Why a measurement failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Exceeded its budget (or was aborted) and was cancelled.
    Timeout,
    /// Any transport failure: DNS, refused connection, reset, bad body.
    Other,
}

impl<'de> Deserialize<'de> for ErrorKind {
    /// Older documents stored a free-form message here; anything that is not
    /// `Timeout` reads back as `Other`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "Timeout" => ErrorKind::Timeout,
            _ => ErrorKind::Other,
        })
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Other => "other",
        }
    }
}

/// Result of one latency probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub ok: bool,
    /// Round-trip time in whole milliseconds, present only on success.
    #[serde(default)]
    pub rtt: Option<u64>,
    /// Epoch milliseconds at completion.
    pub timestamp: u64,
    #[serde(default)]
    pub error: Option<ErrorKind>,
}

impl ProbeOutcome {
    pub fn success(rtt_ms: u64, timestamp: u64) -> Self {
        Self {
            ok: true,
            rtt: Some(rtt_ms),
            timestamp,
            error: None,
        }
    }

    pub fn failure(kind: ErrorKind, timestamp: u64) -> Self {
        Self {
            ok: false,
            rtt: None,
            timestamp,
            error: Some(kind),
        }
    }

    /// The RTT sample carried by this outcome, if it succeeded.
    pub fn rtt_sample(&self) -> Option<u64> {
        if self.ok {
            self.rtt
        } else {
            None
        }
    }
}

/// Result of one throughput measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub ok: bool,
    /// Speed in KB/s, present only on success.
    #[serde(default)]
    pub speed: Option<u64>,
    pub timestamp: u64,
    #[serde(default)]
    pub error: Option<ErrorKind>,
}

impl DownloadOutcome {
    pub fn success(speed_kbps: u64, timestamp: u64) -> Self {
        Self {
            ok: true,
            speed: Some(speed_kbps),
            timestamp,
            error: None,
        }
    }

    pub fn failure(kind: ErrorKind, timestamp: u64) -> Self {
        Self {
            ok: false,
            speed: None,
            timestamp,
            error: Some(kind),
        }
    }

    pub fn speed_sample(&self) -> Option<u64> {
        if self.ok {
            self.speed
        } else {
            None
        }
    }
}
