//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Endpoint URLs parse and use http/https
//! - Validate value ranges (intervals, timeouts, window > 0)
//! - Threshold pairs are ordered consistently
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::MonitorConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid URL `{value}` ({reason})")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field}: good threshold {good} and warn threshold {warn} are out of order")]
    ThresholdOrder {
        field: &'static str,
        good: u64,
        warn: u64,
    },

    #[error("{field}: {value}% is not a percentage")]
    NotAPercentage { field: &'static str, value: u8 },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url("endpoints.probe_url", &config.endpoints.probe_url, &mut errors);
    check_url("endpoints.download_url", &config.endpoints.download_url, &mut errors);

    let timing = &config.timing;
    for (field, value) in [
        ("timing.probe_interval_ms", timing.probe_interval_ms),
        ("timing.download_interval_ms", timing.download_interval_ms),
        ("timing.probe_timeout_ms", timing.probe_timeout_ms),
        ("timing.download_timeout_ms", timing.download_timeout_ms),
        ("timing.retention_ms", timing.retention_ms),
        ("presentation.chart_refresh_ms", config.presentation.chart_refresh_ms),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }
    if config.reliability.window_size == 0 {
        errors.push(ValidationError::Zero("reliability.window_size"));
    }
    if config.presentation.max_plot_points == 0 {
        errors.push(ValidationError::Zero("presentation.max_plot_points"));
    }

    let thresholds = &config.thresholds;
    if thresholds.rtt.good_ms > thresholds.rtt.warn_ms {
        errors.push(ValidationError::ThresholdOrder {
            field: "thresholds.rtt",
            good: thresholds.rtt.good_ms,
            warn: thresholds.rtt.warn_ms,
        });
    }
    if thresholds.success.good_pct < thresholds.success.warn_pct {
        errors.push(ValidationError::ThresholdOrder {
            field: "thresholds.success",
            good: u64::from(thresholds.success.good_pct),
            warn: u64::from(thresholds.success.warn_pct),
        });
    }
    for (field, value) in [
        ("thresholds.success.good_pct", thresholds.success.good_pct),
        ("thresholds.success.warn_pct", thresholds.success.warn_pct),
    ] {
        if value > 100 {
            errors.push(ValidationError::NotAPercentage { field, value });
        }
    }
    if thresholds.download.good_kbps < thresholds.download.warn_kbps {
        errors.push(ValidationError::ThresholdOrder {
            field: "thresholds.download",
            good: thresholds.download.good_kbps,
            warn: thresholds.download.warn_kbps,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
