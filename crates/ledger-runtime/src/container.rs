//! # Ledger Container
//!
//! Builds every collaborator from `RuntimeConfig` and hands out the wired
//! settlement service. Dependency order:
//!
//! 1. Store (memory or RocksDB)
//! 2. Repository over the store, doubling as the visit source, seeded
//!    from the configured draft import
//! 3. Caller verifier from the configured token table
//! 4. Post-commit hooks (flagged-visit relay)
//! 5. Settlement service

use crate::config::{RuntimeConfig, StorageBackend};
use crate::visits::import_draft_visits;
use anyhow::Result;
use pl_01_settlement_ledger::{
    FlaggedVisitRelay, InMemoryLedgerStore, LedgerRepository, LedgerStore, PostCommitHook,
    SettlementDeps, SettlementService, StaticTokenVerifier, TracingDispatcher,
};
use shared_types::SystemTimeSource;
use std::sync::Arc;
use tracing::{info, warn};

/// Wired settlement collaborators.
pub struct LedgerContainer {
    pub store: Arc<dyn LedgerStore>,
    pub repository: LedgerRepository,
    pub service: Arc<SettlementService>,
}

impl LedgerContainer {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let store = open_store(config)?;
        let repository = LedgerRepository::new(Arc::clone(&store));
        match &config.visits.import_file {
            Some(path) => {
                import_draft_visits(&repository, path)?;
            }
            None => warn!("No draft visit import configured; only stored visits can be settled"),
        }

        let verifier = StaticTokenVerifier::new(config.gateway.tokens.clone());
        if verifier.is_empty() {
            warn!("No bearer tokens configured; every submission will be rejected");
        }

        let relay: Arc<dyn PostCommitHook> =
            Arc::new(FlaggedVisitRelay::new(Arc::new(TracingDispatcher)));

        let service = Arc::new(SettlementService::new(
            config.ledger.clone(),
            SettlementDeps {
                store: Arc::clone(&store),
                visits: Arc::new(repository.clone()),
                identity: Arc::new(verifier),
                clock: Arc::new(SystemTimeSource),
                hooks: vec![relay],
            },
        ));

        info!(
            backend = %config.storage.backend,
            tokens = config.gateway.tokens.len(),
            max_commit_attempts = config.ledger.max_commit_attempts,
            "Settlement service wired"
        );

        Ok(Self {
            store,
            repository,
            service,
        })
    }
}

fn open_store(config: &RuntimeConfig) -> Result<Arc<dyn LedgerStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory store; claims are lost on restart");
            Ok(Arc::new(InMemoryLedgerStore::new()))
        }
        StorageBackend::Rocksdb => open_rocksdb(config),
    }
}

#[cfg(feature = "rocksdb")]
fn open_rocksdb(config: &RuntimeConfig) -> Result<Arc<dyn LedgerStore>> {
    use anyhow::Context;
    use pl_01_settlement_ledger::{RocksDbConfig, RocksDbLedgerStore};

    std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!(
            "Failed to create data dir {}",
            config.storage.data_dir.display()
        )
    })?;
    let rocks = RocksDbConfig {
        path: config.storage.data_dir.clone(),
        sync_writes: config.storage.sync_writes,
        ..Default::default()
    };
    let store = RocksDbLedgerStore::open(rocks).context("Failed to open RocksDB ledger store")?;
    info!(path = %config.storage.data_dir.display(), "Opened RocksDB ledger store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "rocksdb"))]
fn open_rocksdb(_config: &RuntimeConfig) -> Result<Arc<dyn LedgerStore>> {
    anyhow::bail!("rocksdb backend requires building with `--features rocksdb`")
}
