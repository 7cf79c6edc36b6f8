//! # Settlement Ledger Runtime
//!
//! Wires the settlement service behind the claims gateway.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`PL_CONFIG` TOML file, then `PL_*` overrides)
//! 2. Initialize logging
//! 3. Open the store and wire the settlement service (`container/`)
//! 4. Serve the gateway until Ctrl+C, then drain in-flight requests
//!
//! ## Modules
//!
//! - `config` - RuntimeConfig and its loading rules
//! - `container` - collaborator construction in dependency order
//! - `visits` - draft visit import from the capture path

pub mod config;
pub mod container;
pub mod visits;

use anyhow::{Context, Result};
use pl_02_claims_gateway::ClaimsGateway;
use std::future::Future;
use tracing::info;

pub use config::{ConfigError, RuntimeConfig, StorageBackend, StorageConfig, VisitsConfig};
pub use container::LedgerContainer;
pub use visits::{import_draft_visits, ImportSummary};

/// The assembled runtime: container plus gateway.
pub struct LedgerRuntime {
    container: LedgerContainer,
    gateway: ClaimsGateway,
}

impl LedgerRuntime {
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let container = LedgerContainer::new(&config)?;
        let gateway = ClaimsGateway::new(config.gateway.clone(), container.service.clone())
            .context("Failed to build claims gateway")?;
        Ok(Self { container, gateway })
    }

    pub fn container(&self) -> &LedgerContainer {
        &self.container
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("===========================================");
        info!("  Settlement Ledger Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(addr = %self.gateway.config().http_addr(), "Starting claims gateway");

        let LedgerRuntime { container, gateway } = self;
        let served = gateway.serve(shutdown).await;
        drop(container);
        served.context("Claims gateway failed")?;

        info!("Shutdown complete");
        Ok(())
    }
}
