//! Clock and periodic scheduling.
//!
//! # Data Flow
//! ```text
//! Scheduler::every(name, period, tick)
//!     → tokio task: tick now, then every period
//!     → TaskHandle (cancel / abort / stopped)
//!
//! Clock::now_ms()
//!     → outcome timestamps, retention cutoffs, redraw gate
//! ```

pub mod clock;
pub mod periodic;

pub use clock::{Clock, ManualClock, SystemClock};
pub use periodic::{Scheduler, TaskHandle};
