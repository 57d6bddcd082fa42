//! netmon: client-side network health monitor.
//!
//! # Architecture Overview
//!
//! ```text
//!     ┌──────────────────────────────────────────────────────────────┐
//!     │                          NETMON                              │
//!     │                                                              │
//!     │  fast loop (1s)           slow loop (30min)                  │
//!     │  ┌──────────────┐         ┌────────────────┐                 │
//!     │  │ LatencyProbe │ HEAD    │ ThroughputProbe│ GET             │
//!     │  └──────┬───────┘         └───────┬────────┘                 │
//!     │         ▼                         ▼                          │
//!     │  ┌────────────────────────────────────────────┐              │
//!     │  │ MonitorState                               │              │
//!     │  │  reliability window │ RTT │ download hist. │              │
//!     │  └──────┬──────────────────────────┬──────────┘              │
//!     │         ▼                          ▼                         │
//!     │  HealthClassifier           HistoryStore (JSON slot)         │
//!     │         │                                                    │
//!     │         ▼                                                    │
//!     │  SnapshotBoard ──▶ status API (/status, /history, /healthz)  │
//!     └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use netmon::config::validation::validate_config;
use netmon::config::watcher::ConfigWatcher;
use netmon::config::{load_config, ConfigError, MonitorConfig};
use netmon::lifecycle::shutdown::signalled;
use netmon::lifecycle::signals::wait_for_signal;
use netmon::lifecycle::startup::build_monitor;
use netmon::lifecycle::Shutdown;
use netmon::observability::{logging, metrics};
use netmon::schedule::SystemClock;

#[derive(Parser)]
#[command(name = "netmon")]
#[command(about = "Client-side network health monitor", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the latency probe URL.
    #[arg(long)]
    probe_url: Option<String>,

    /// Override the download test URL.
    #[arg(long)]
    download_url: Option<String>,

    /// Override the directory holding the history slot.
    #[arg(long)]
    state_dir: Option<String>,

    /// Override the status API bind address.
    #[arg(long)]
    bind: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut MonitorConfig) {
        if let Some(url) = &self.probe_url {
            config.endpoints.probe_url = url.clone();
        }
        if let Some(url) = &self.download_url {
            config.endpoints.download_url = url.clone();
        }
        if let Some(dir) = &self.state_dir {
            config.storage.directory = dir.clone();
        }
        if let Some(bind) = &self.bind {
            config.api.bind_address = bind.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };
    // The watcher compares reloads against the file, not the overridden values.
    let file_config = config.clone();
    args.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "netmon starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let (monitor, board) = build_monitor(&config, Arc::new(SystemClock))?;

    let api = if config.api.enabled {
        let listener = TcpListener::bind(&config.api.bind_address).await?;
        let rx = shutdown.subscribe();
        let board = board.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = netmon::api::serve(listener, board, rx).await {
                tracing::error!(error = %e, "Status API failed");
            }
        }))
    } else {
        None
    };

    // Hot reload applies threshold tables only.
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path, file_config);
            let guard = match watcher.run() {
                Ok(guard) => Some(guard),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    None
                }
            };
            let monitor = monitor.clone();
            let stop = signalled(shutdown.subscribe());
            tokio::spawn(async move {
                tokio::pin!(stop);
                loop {
                    tokio::select! {
                        _ = &mut stop => break,
                        update = updates.recv() => match update {
                            Some(thresholds) => monitor.apply_thresholds(thresholds),
                            None => break,
                        },
                    }
                }
            });
            guard
        }
        None => None,
    };

    let handle = monitor.start();

    wait_for_signal().await;
    tracing::info!("Shutting down");

    shutdown.trigger();
    if let Err(e) = handle.shutdown().await {
        tracing::error!(error = %e, "Final persist failed");
    }
    if let Some(api) = api {
        let _ = api.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
