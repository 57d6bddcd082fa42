//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build runners + store → Restore history → Start loops
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop API + watcher → Stop loops → Final persist → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Only startup errors are fatal
//! - The final persist happens after both loops are stopped

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
