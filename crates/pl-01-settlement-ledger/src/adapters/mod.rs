//! # Adapters Layer
//!
//! Implementations of the outbound ports.
//!
//! - `memory_store` - in-memory optimistic store (tests, single node)
//! - `rocksdb_store` - RocksDB optimistic store (feature `rocksdb`)
//! - `repository` - typed record access and the visit source
//! - `identity` - static bearer-token verifier
//! - `notification` - flagged-visit relay and logging dispatcher

pub mod identity;
pub mod memory_store;
pub mod notification;
pub mod repository;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

pub use identity::{constant_time_compare, StaticTokenVerifier, TokenGrant};
pub use memory_store::InMemoryLedgerStore;
pub use notification::{FlaggedVisitRelay, TracingDispatcher};
pub use repository::{LedgerRepository, LedgerTxn};
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbConfig, RocksDbLedgerStore};
