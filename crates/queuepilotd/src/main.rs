//! queuepilotd — the QueuePilot daemon.
//!
//! Assembles the collaborators and runs the evaluation loop:
//! - Graphite-style render client (metrics source)
//! - Forecast service client
//! - Deployment API client (scale / rollback / build history)
//! - Instance inventory client
//! - Scaler (decision engine + rollback registry)
//!
//! # Usage
//!
//! ```text
//! queuepilotd --config queuepilot.toml --interval 60
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use queuepilot_core::QueuePilotConfig;
use queuepilot_deploy::{DeployApiClient, InventoryClient};
use queuepilot_engine::Scaler;
use queuepilot_forecast::ForecastClient;
use queuepilot_metrics::GraphiteClient;

#[derive(Parser)]
#[command(name = "queuepilotd", about = "QueuePilot autoscaling daemon")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "queuepilot.toml")]
    config: PathBuf,

    /// Seconds between evaluation passes.
    #[arg(long, default_value = "60")]
    interval: u64,

    /// Log scale actions without issuing them (overrides the config).
    #[arg(long)]
    noop: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,queuepilotd=debug,queuepilot=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = QueuePilotConfig::from_file(&cli.config)?;
    if cli.noop {
        config.deploy.noop = true;
    }
    info!(
        config = ?cli.config,
        services = config.services.len(),
        noop = config.deploy.noop,
        "configuration loaded"
    );

    // ── Collaborators ──────────────────────────────────────────

    let metrics = GraphiteClient::new(config.metrics.addr.clone());
    info!(addr = %config.metrics.addr, "metrics source configured");

    let forecaster = ForecastClient::new(config.forecast.addr.clone());
    info!(addr = %config.forecast.addr, "forecast service configured");

    let deploy = DeployApiClient::new(config.deploy.api_addr.clone(), config.deploy.noop);
    info!(addr = %config.deploy.api_addr, "deploy backend configured");

    let inventory = InventoryClient::new(config.inventory.addr.clone());
    info!(addr = %config.inventory.addr, "instance inventory configured");

    let interval = Duration::from_secs(cli.interval);
    let mut scaler = Scaler::new(config, metrics, forecaster, deploy, inventory);

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // The loop observes shutdown between passes; a pass in progress runs
    // to completion so no deploy call is abandoned mid-flight.
    scaler.run(interval, shutdown_rx).await;

    info!("queuepilotd stopped");
    Ok(())
}
