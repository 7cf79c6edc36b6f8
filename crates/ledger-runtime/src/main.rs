//! # Settlement Ledger
//!
//! Entry point: configuration, logging, then the runtime.

use anyhow::{Context, Result};
use ledger_runtime::{LedgerRuntime, RuntimeConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Failed to load configuration")?;
    ledger_telemetry::init_logging(&config.telemetry).context("Failed to initialize logging")?;

    let runtime = LedgerRuntime::new(config)?;
    info!("Ledger is running. Press Ctrl+C to stop.");
    runtime.run(shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, draining in-flight requests"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C; shutting down"),
    }
}
