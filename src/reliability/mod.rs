//! Probe reliability tracking.
//!
//! # Responsibilities
//! - Observe every probe outcome, success or failure
//! - Keep only the most recent window (8 by default)
//! - Derive the success-rate percentage used by the classifier
//!
//! # Design Decisions
//! - Timeouts are failures like any other transport error
//! - The window is persisted with the history and truncated on load

pub mod window;

pub use window::ReliabilityWindow;
