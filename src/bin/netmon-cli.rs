use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use netmon::config::{load_config, MonitorConfig};
use netmon::health::{HealthClassifier, Readings};
use netmon::lifecycle::startup::http_runners;
use netmon::probe::{LatencyProbe, ThroughputProbe};
use netmon::reliability::ReliabilityWindow;
use netmon::schedule::SystemClock;

#[derive(Parser)]
#[command(name = "netmon-cli")]
#[command(about = "Query a running netmon or take a one-off measurement", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8787")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current metrics and health status
    Status,
    /// Plot series for the retained history
    History,
    /// Run one latency probe and one download locally
    Probe {
        /// TOML configuration supplying endpoints, timeouts and thresholds
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let res = reqwest::get(format!("{}/status", cli.url)).await?;
            print_response(res).await?;
        }
        Commands::History => {
            let res = reqwest::get(format!("{}/history", cli.url)).await?;
            print_response(res).await?;
        }
        Commands::Probe { config } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => MonitorConfig::default(),
            };
            let report = probe_once(&config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

async fn probe_once(config: &MonitorConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let (latency, download) = http_runners(config, Arc::new(SystemClock))?;
    let cancel = CancellationToken::new();

    let probe = latency.probe(&cancel).await;
    let transfer = download.measure(&cancel).await;

    let mut window = ReliabilityWindow::new(config.reliability.window_size);
    window.record(probe);

    let status = HealthClassifier::new(config.thresholds).classify(&Readings {
        rtt_ms: probe.rtt_sample(),
        success_pct: window.success_rate(),
        download_kbps: transfer.speed_sample(),
    });

    Ok(json!({
        "probe": probe,
        "download": transfer,
        "status": status,
        "label": status.label(),
    }))
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: netmon returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
