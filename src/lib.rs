//! Client-side network health monitor library.

pub mod config;
pub mod schedule;

// Measurement
pub mod probe;
pub mod reliability;
pub mod health;

// State and orchestration
pub mod history;
pub mod monitor;

// Cross-cutting concerns
pub mod api;
pub mod lifecycle;
pub mod observability;

pub use config::schema::MonitorConfig;
pub use health::{HealthClassifier, HealthStatus};
pub use lifecycle::Shutdown;
pub use monitor::{Monitor, MonitorHandle, SnapshotBoard};
