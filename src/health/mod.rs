//! Health classification subsystem.
//!
//! # Data Flow
//! ```text
//! current RTT, success rate, latest download speed
//!     → classifier.rs (per-metric vote against threshold tables)
//!     → status.rs (worst vote wins)
//!     → HealthStatus { Good, Warn, Bad, Unknown }
//! ```
//!
//! # Design Decisions
//! - Status is derived on every fast-loop tick, never stored
//! - A metric without data casts no vote
//! - Threshold boundaries are inclusive on the good side

pub mod classifier;
pub mod status;

pub use classifier::{HealthClassifier, Readings};
pub use status::HealthStatus;
