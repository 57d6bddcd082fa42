//! Time series with a retention window.

use serde::{Deserialize, Serialize};

/// One measurement at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Epoch milliseconds.
    pub timestamp: u64,
    pub value: u64,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: u64, value: u64) -> Self {
        Self { timestamp, value }
    }
}

/// Insertion-ordered points. Only retention removes points, and only by age.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistorySeries {
    points: Vec<TimeSeriesPoint>,
}

impl HistorySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the end. Order is the caller's; nothing is sorted.
    pub fn append(&mut self, point: TimeSeriesPoint) {
        self.points.push(point);
    }

    /// Drop every point with `timestamp <= now - retention_ms`.
    ///
    /// Scans the whole series each call. Returns how many points were removed.
    pub fn trim(&mut self, now_ms: u64, retention_ms: u64) -> usize {
        let Some(cutoff) = now_ms.checked_sub(retention_ms) else {
            return 0;
        };
        let before = self.points.len();
        self.points.retain(|p| p.timestamp > cutoff);
        before - self.points.len()
    }

    pub fn latest(&self) -> Option<&TimeSeriesPoint> {
        self.points.last()
    }

    pub fn latest_value(&self) -> Option<u64> {
        self.latest().map(|p| p.value)
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<TimeSeriesPoint> for HistorySeries {
    fn from_iter<I: IntoIterator<Item = TimeSeriesPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
