//! The persisted history document.

use serde::{Deserialize, Serialize};

use crate::history::series::HistorySeries;
use crate::probe::ProbeOutcome;

/// Everything that survives a restart, stored as one JSON blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedDocument {
    pub rtt_history: HistorySeries,
    pub download_history: HistorySeries,
    /// Most recent probe outcomes, oldest first.
    pub last_probe_results: Vec<ProbeOutcome>,
    /// Epoch milliseconds of the save that wrote this document.
    pub last_save: u64,
}

impl PersistedDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored document and bring it in line with the current policy.
    pub fn from_json(
        text: &str,
        now_ms: u64,
        retention_ms: u64,
        window_size: usize,
    ) -> Result<Self, serde_json::Error> {
        let mut doc: Self = serde_json::from_str(text)?;
        doc.apply_retention(now_ms, retention_ms, window_size);
        Ok(doc)
    }

    /// Trim both series and keep only the last `window_size` probe results.
    ///
    /// A document written under a longer window or retention is accepted.
    pub fn apply_retention(&mut self, now_ms: u64, retention_ms: u64, window_size: usize) {
        self.rtt_history.trim(now_ms, retention_ms);
        self.download_history.trim(now_ms, retention_ms);

        let excess = self.last_probe_results.len().saturating_sub(window_size);
        self.last_probe_results.drain(..excess);
    }
}
