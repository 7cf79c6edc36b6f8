//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Settlement Ledger service.
//!
//! These are the interfaces the host application supplies. In-memory
//! implementations live in `adapters/` for tests and single-node runs.

use crate::domain::entities::VisitRecord;
use crate::domain::errors::{DispatchError, HookError, IdentityError, StoreError};
use crate::domain::value_objects::{CallerIdentity, CommittedSubmission, Urgency};
use async_trait::async_trait;
use serde::Serialize;
use shared_types::{ClaimId, FacilityId, MemberId, VisitId};

/// Key-value store with optimistic transactions.
///
/// Production: `RocksDbLedgerStore` (feature `rocksdb`)
/// Testing: `InMemoryLedgerStore`
pub trait LedgerStore: Send + Sync {
    /// Open an optimistic transaction.
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError>;

    /// Read a committed value outside any transaction.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Committed entries under `prefix`, ordered by key.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;
}

/// One optimistic transaction.
///
/// ## Atomicity Guarantee (INVARIANT-3)
///
/// Writes are buffered until `commit`. Commit applies ALL of them or, if
/// any key read or written has changed since it was first touched,
/// NONE of them and returns `StoreError::Conflict`. Dropping a transaction
/// without committing discards it.
pub trait StoreTransaction {
    /// Read a key, observing this transaction's own buffered writes.
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Buffer a write.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Result of a batched visit load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitLookup {
    pub found: Vec<VisitRecord>,
    pub missing: Vec<VisitId>,
}

/// Read access to the external visit draft store.
#[async_trait]
pub trait VisitSource: Send + Sync {
    async fn load_visits(&self, ids: &[VisitId]) -> Result<VisitLookup, StoreError>;
}

/// Resolves a bearer token to a caller identity.
#[async_trait]
pub trait CallerVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, IdentityError>;
}

/// Payload handed to the downstream notification dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedVisitNotice {
    pub visit_id: VisitId,
    pub member_id: MemberId,
    pub member_name: String,
    pub facility_id: FacilityId,
    pub facility_name: String,
    pub claim_id: ClaimId,
    pub urgency: Urgency,
    pub reasons: Vec<String>,
    pub payload: serde_json::Value,
}

/// External flagged-visit notification channel. At most one attempt is
/// made per notice.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notice: &FlaggedVisitNotice) -> Result<(), DispatchError>;
}

/// Side effect run after a successful commit.
///
/// Hooks are invoked in order; a failing hook is logged and the remaining
/// hooks still run. Nothing a hook does can reverse the commit.
#[async_trait]
pub trait PostCommitHook: Send + Sync {
    fn name(&self) -> &'static str;

    async fn after_commit(&self, committed: &CommittedSubmission) -> Result<(), HookError>;
}
