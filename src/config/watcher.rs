//! Configuration file watcher for threshold hot reload.
//!
//! # Design Decisions
//! - Only threshold tables are forwarded; the monitor swaps them in live
//! - Changes to timing, endpoints or storage are logged as needing a restart
//! - A file that fails to load or validate leaves the running values in place

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::{MonitorConfig, ThresholdConfig};

/// Watches the config file and emits new threshold tables.
pub struct ConfigWatcher {
    path: PathBuf,
    current: MonitorConfig,
    update_tx: mpsc::UnboundedSender<ThresholdConfig>,
}

impl ConfigWatcher {
    /// `current` is the configuration the monitor was started with.
    ///
    /// Returns the watcher and a receiver for changed threshold tables.
    pub fn new(path: &Path, current: MonitorConfig) -> (Self, mpsc::UnboundedReceiver<ThresholdConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                current,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let mut current = self.current;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        if let Some(thresholds) = reload(&path, &mut current) {
                            let _ = tx.send(thresholds);
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Re-read `path` and return the threshold tables if they differ from `current`.
///
/// `current` tracks the last successfully loaded file, so each change is
/// reported once.
pub fn reload(path: &Path, current: &mut MonitorConfig) -> Option<ThresholdConfig> {
    let new_config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to reload config, keeping current thresholds");
            return None;
        }
    };

    let restart_only = [
        ("endpoints", new_config.endpoints != current.endpoints),
        ("timing", new_config.timing != current.timing),
        ("reliability", new_config.reliability != current.reliability),
        ("storage", new_config.storage != current.storage),
        ("api", new_config.api != current.api),
    ];
    for (section, changed) in restart_only {
        if changed {
            tracing::warn!(section, "Config section changed; takes effect after restart");
        }
    }

    let changed = new_config.thresholds != current.thresholds;
    let thresholds = new_config.thresholds;
    *current = new_config;

    if changed {
        tracing::info!(path = ?path, "Threshold change detected");
        Some(thresholds)
    } else {
        None
    }
}
