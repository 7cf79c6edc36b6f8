//! # RocksDB Ledger Store
//!
//! Production `LedgerStore` over RocksDB's `OptimisticTransactionDB`.
//!
//! ## Features
//!
//! - Optimistic transactions with snapshot validation at commit
//! - `get_for_update` so every key read participates in conflict checking
//! - Snappy compression
//! - fsync on commit for durability (configurable)
//!
//! RocksDB reports a failed optimistic validation as `Busy` or `TryAgain`;
//! both surface as `StoreError::Conflict` so the coordinator retries.

use crate::domain::errors::StoreError;
use crate::ports::outbound::{LedgerStore, StoreTransaction};
use rocksdb::{
    Direction, ErrorKind, IteratorMode, OptimisticTransactionDB, OptimisticTransactionOptions,
    Options, Transaction, WriteOptions,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// RocksDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RocksDbConfig {
    /// Database directory.
    pub path: PathBuf,
    /// fsync each commit (default: true).
    pub sync_writes: bool,
    /// Write buffer size in bytes (default: 64MB).
    pub write_buffer_size: usize,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/ledger"),
            sync_writes: true,
            write_buffer_size: 64 * 1024 * 1024,
        }
    }
}

impl RocksDbConfig {
    /// Config for tests: small buffers, no fsync.
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_writes: false,
            write_buffer_size: 4 * 1024 * 1024,
        }
    }
}

/// RocksDB-backed ledger store.
pub struct RocksDbLedgerStore {
    db: OptimisticTransactionDB,
    config: RocksDbConfig,
}

impl RocksDbLedgerStore {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let db = OptimisticTransactionDB::open(&opts, &config.path)
            .map_err(|e| StoreError::Io(format!("failed to open RocksDB: {e}")))?;

        info!(path = %config.path.display(), "Opened ledger store");
        Ok(Self { db, config })
    }

    pub fn config(&self) -> &RocksDbConfig {
        &self.config
    }
}

fn map_err(op: &str, e: rocksdb::Error) -> StoreError {
    match e.kind() {
        ErrorKind::Busy | ErrorKind::TryAgain => StoreError::Conflict,
        _ => StoreError::Io(format!("RocksDB {op} failed: {e}")),
    }
}

impl LedgerStore for RocksDbLedgerStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        let mut txn_opts = OptimisticTransactionOptions::default();
        txn_opts.set_snapshot(true);

        Ok(Box::new(RocksDbTransaction {
            txn: self.db.transaction_opt(&write_opts, &txn_opts),
        }))
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.db.get(key).map_err(|e| map_err("get", e))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let mut results = Vec::new();
        for item in self
            .db
            .iterator(IteratorMode::From(prefix, Direction::Forward))
        {
            let (key, value) = item.map_err(|e| map_err("scan", e))?;
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }
        Ok(results)
    }
}

struct RocksDbTransaction<'db> {
    txn: Transaction<'db, OptimisticTransactionDB>,
}

impl StoreTransaction for RocksDbTransaction<'_> {
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.txn
            .get_for_update(key, true)
            .map_err(|e| map_err("get_for_update", e))
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.txn.put(key, value).map_err(|e| map_err("put", e))
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.txn.commit().map_err(|e| map_err("commit", e))
    }
}
