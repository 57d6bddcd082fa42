//! Monitor orchestration.
//!
//! # Data Flow
//! ```text
//! Scheduler (fast, 1s)                 Scheduler (slow, 30min)
//!     → LatencyProbe                       → ThroughputProbe
//!     → state.rs                           → state.rs
//!         reliability window                   download history
//!         RTT history
//!     → HealthClassifier
//!     → trim, persist (HistoryStore)       → trim, persist
//!     → PresentationSink                   → PresentationSink
//! ```
//!
//! # Design Decisions
//! - One owned `MonitorState` behind a mutex; no globals
//! - The two loops are independent: separate periods, separate cancellation
//! - Health uses the latest stored download speed, which may be up to one
//!   slow-loop period old

pub mod orchestrator;
pub mod presentation;
pub mod state;

pub use orchestrator::{Monitor, MonitorHandle};
pub use presentation::{
    DashboardSnapshot, DashboardUpdate, MetricsView, PlotPoint, PlotSeries, PresentationSink,
    RedrawGate, SnapshotBoard,
};
pub use state::MonitorState;
