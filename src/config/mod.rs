//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//!     → handed to the monitor at startup
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → threshold tables swapped into the running monitor
//! ```
//!
//! # Design Decisions
//! - Only thresholds are applied live; loop timing needs a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ApiConfig, DownloadThresholds, EndpointConfig, MonitorConfig, ObservabilityConfig,
    PresentationConfig, ReliabilityConfig, RttThresholds, StorageConfig, SuccessThresholds,
    ThresholdConfig, TimingConfig,
};
