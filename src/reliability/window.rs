//! Fixed-capacity ring of recent probe outcomes.

use std::collections::VecDeque;

use crate::probe::ProbeOutcome;

/// The last `capacity` probe outcomes, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ReliabilityWindow {
    capacity: usize,
    entries: VecDeque<ProbeOutcome>,
}

impl ReliabilityWindow {
    pub const DEFAULT_CAPACITY: usize = 8;

    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Rebuild from persisted outcomes, keeping only the newest `capacity`.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = ProbeOutcome>, capacity: usize) -> Self {
        let mut window = Self::new(capacity);
        for outcome in outcomes {
            window.record(outcome);
        }
        window
    }

    /// Append, evicting the oldest entry once full.
    pub fn record(&mut self, outcome: ProbeOutcome) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(outcome);
    }

    /// `round(100 * ok / len)` over the entries currently held.
    ///
    /// The denominator is the current length, so the first few probes after
    /// startup are rated over fewer samples. `None` while empty.
    pub fn success_rate(&self) -> Option<u8> {
        let total = self.entries.len() as u64;
        if total == 0 {
            return None;
        }
        let ok = self.entries.iter().filter(|o| o.ok).count() as u64;
        // Integer round-half-up of 100 * ok / total.
        Some(((200 * ok + total) / (2 * total)) as u8)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<ProbeOutcome> {
        self.entries.iter().copied().collect()
    }
}

impl Default for ReliabilityWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
