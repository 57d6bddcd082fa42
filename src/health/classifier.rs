//! Threshold classification of current readings.

use serde::Serialize;

use crate::config::ThresholdConfig;
use crate::health::status::HealthStatus;

/// The three classified metrics. `None` means no data, which casts no vote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Readings {
    pub rtt_ms: Option<u64>,
    pub success_pct: Option<u8>,
    pub download_kbps: Option<u64>,
}

/// Maps readings onto threshold tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthClassifier {
    thresholds: ThresholdConfig,
}

impl HealthClassifier {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// Lower is better.
    pub fn classify_rtt(&self, rtt_ms: u64) -> HealthStatus {
        let t = &self.thresholds.rtt;
        if rtt_ms <= t.good_ms {
            HealthStatus::Good
        } else if rtt_ms <= t.warn_ms {
            HealthStatus::Warn
        } else {
            HealthStatus::Bad
        }
    }

    /// Higher is better.
    pub fn classify_success(&self, pct: u8) -> HealthStatus {
        let t = &self.thresholds.success;
        if pct >= t.good_pct {
            HealthStatus::Good
        } else if pct >= t.warn_pct {
            HealthStatus::Warn
        } else {
            HealthStatus::Bad
        }
    }

    /// Higher is better.
    pub fn classify_download(&self, kbps: u64) -> HealthStatus {
        let t = &self.thresholds.download;
        if kbps >= t.good_kbps {
            HealthStatus::Good
        } else if kbps >= t.warn_kbps {
            HealthStatus::Warn
        } else {
            HealthStatus::Bad
        }
    }

    /// Worst vote across the metrics that have data.
    pub fn classify(&self, readings: &Readings) -> HealthStatus {
        let votes = [
            readings.rtt_ms.map(|v| self.classify_rtt(v)),
            readings.success_pct.map(|v| self.classify_success(v)),
            readings.download_kbps.map(|v| self.classify_download(v)),
        ];
        HealthStatus::worst_of(votes.into_iter().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use HealthStatus::*;

    fn classify(rtt: Option<u64>, success: Option<u8>, download: Option<u64>) -> HealthStatus {
        HealthClassifier::default().classify(&Readings {
            rtt_ms: rtt,
            success_pct: success,
            download_kbps: download,
        })
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let c = HealthClassifier::default();
        assert_eq!(c.classify_rtt(200), Good);
        assert_eq!(c.classify_rtt(201), Warn);
        assert_eq!(c.classify_rtt(500), Warn);
        assert_eq!(c.classify_rtt(501), Bad);

        assert_eq!(c.classify_success(98), Good);
        assert_eq!(c.classify_success(97), Warn);
        assert_eq!(c.classify_success(95), Warn);
        assert_eq!(c.classify_success(94), Bad);

        assert_eq!(c.classify_download(250), Good);
        assert_eq!(c.classify_download(249), Warn);
        assert_eq!(c.classify_download(100), Warn);
        assert_eq!(c.classify_download(99), Bad);
    }

    #[test]
    fn test_aggregation_tie_breaks() {
        assert_eq!(classify(Some(900), Some(100), None), Bad);
        assert_eq!(classify(None, Some(96), Some(300)), Warn);
        assert_eq!(classify(None, None, None), Unknown);
        assert_eq!(classify(None, None, Some(300)), Good);
        assert_eq!(classify(None, Some(10), None), Bad);
    }

    #[test]
    fn test_end_to_end_readings() {
        assert_eq!(classify(Some(150), Some(99), Some(300)), Good);
        assert_eq!(classify(Some(600), Some(99), Some(300)), Bad);
        assert_eq!(classify(Some(150), Some(96), Some(50)), Bad);
        assert_eq!(classify(Some(150), Some(96), Some(150)), Warn);
    }

    #[test]
    fn test_custom_thresholds() {
        let mut thresholds = ThresholdConfig::default();
        thresholds.rtt.good_ms = 50;
        thresholds.rtt.warn_ms = 80;
        let c = HealthClassifier::new(thresholds);
        assert_eq!(c.classify_rtt(60), Warn);
        assert_eq!(c.classify_rtt(150), Bad);
    }
}
