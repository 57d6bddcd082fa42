//! Measurement history.
//!
//! # Data Flow
//! ```text
//! successful outcome
//!     → series.rs (append point, trim by age)
//!     → document.rs (rtt + download series, last probe results, last save)
//!     → store.rs (JSON text in one key-value slot)
//!
//! startup:
//!     store.rs load → document.rs retention pass → monitor state
//! ```
//!
//! # Design Decisions
//! - Retention is by age only (24h by default); there is no count cap
//! - Loading re-applies retention so an old document never resurrects stale points
//! - Storage failures are reported to the caller, never panics

pub mod document;
pub mod series;
pub mod store;

pub use document::PersistedDocument;
pub use series::{HistorySeries, TimeSeriesPoint};
pub use store::{BlobStore, FileStore, HistoryStore, MemoryStore, StorageError};
