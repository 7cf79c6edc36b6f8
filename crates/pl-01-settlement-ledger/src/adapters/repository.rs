//! # Ledger Repository
//!
//! Typed record access over a `LedgerStore`. Records are JSON encoded under
//! the key layout:
//!
//! | Record | Key |
//! |--------|-----|
//! | VisitRecord | `visit/<visitId>` |
//! | Claim | `claim/<claimKey>` |
//! | MonthlyLock | `lock/<memberId>/<YYYY-MM>` |
//! | SignOffAttestation | `signoff/<signOffId>` |

use crate::domain::entities::{Claim, MonthlyLock, SignOffAttestation, VisitRecord};
use crate::domain::errors::StoreError;
use crate::ports::outbound::{LedgerStore, StoreTransaction, VisitLookup, VisitSource};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{ClaimId, MemberId, MonthKey, SignOffId, VisitId};
use std::sync::Arc;

pub const VISIT_PREFIX: &str = "visit/";
pub const CLAIM_PREFIX: &str = "claim/";
pub const LOCK_PREFIX: &str = "lock/";
pub const SIGN_OFF_PREFIX: &str = "signoff/";

pub fn visit_key(id: &VisitId) -> Vec<u8> {
    format!("{VISIT_PREFIX}{id}").into_bytes()
}

pub fn claim_record_key(id: &ClaimId) -> Vec<u8> {
    format!("{CLAIM_PREFIX}{id}").into_bytes()
}

pub fn lock_key(member_id: &MemberId, month: MonthKey) -> Vec<u8> {
    format!("{LOCK_PREFIX}{member_id}/{month}").into_bytes()
}

pub fn sign_off_key(id: &SignOffId) -> Vec<u8> {
    format!("{SIGN_OFF_PREFIX}{id}").into_bytes()
}

fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(record).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
        key: String::from_utf8_lossy(key).into_owned(),
        message: e.to_string(),
    })
}

/// Typed view of one open store transaction.
pub struct LedgerTxn<'a> {
    inner: Box<dyn StoreTransaction + 'a>,
}

impl<'a> LedgerTxn<'a> {
    pub fn begin(store: &'a dyn LedgerStore) -> Result<Self, StoreError> {
        Ok(Self {
            inner: store.begin()?,
        })
    }

    fn read<T: DeserializeOwned>(&mut self, key: &[u8]) -> Result<Option<T>, StoreError> {
        match self.inner.get(key)? {
            Some(bytes) => decode(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&mut self, key: &[u8], record: &T) -> Result<(), StoreError> {
        let bytes = encode(record)?;
        self.inner.put(key, &bytes)
    }

    pub fn claim(&mut self, id: &ClaimId) -> Result<Option<Claim>, StoreError> {
        self.read(&claim_record_key(id))
    }

    pub fn monthly_lock(
        &mut self,
        member_id: &MemberId,
        month: MonthKey,
    ) -> Result<Option<MonthlyLock>, StoreError> {
        self.read(&lock_key(member_id, month))
    }

    pub fn visit(&mut self, id: &VisitId) -> Result<Option<VisitRecord>, StoreError> {
        self.read(&visit_key(id))
    }

    pub fn put_claim(&mut self, claim: &Claim) -> Result<(), StoreError> {
        self.write(&claim_record_key(&claim.id), claim)
    }

    pub fn put_monthly_lock(&mut self, lock: &MonthlyLock) -> Result<(), StoreError> {
        self.write(&lock_key(&lock.member_id, lock.month_key), lock)
    }

    pub fn put_sign_off(&mut self, sign_off: &SignOffAttestation) -> Result<(), StoreError> {
        self.write(&sign_off_key(&sign_off.id), sign_off)
    }

    pub fn put_visit(&mut self, visit: &VisitRecord) -> Result<(), StoreError> {
        self.write(&visit_key(&visit.id), visit)
    }

    pub fn commit(self) -> Result<(), StoreError> {
        self.inner.commit()
    }
}

/// Committed-state queries plus the draft-visit write path.
#[derive(Clone)]
pub struct LedgerRepository {
    store: Arc<dyn LedgerStore>,
}

impl LedgerRepository {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    fn read<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, StoreError> {
        match self.store.get(key)? {
            Some(bytes) => decode(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>, StoreError> {
        self.store
            .prefix_scan(prefix.as_bytes())?
            .iter()
            .map(|(key, bytes)| decode(key, bytes))
            .collect()
    }

    pub fn claim(&self, id: &ClaimId) -> Result<Option<Claim>, StoreError> {
        self.read(&claim_record_key(id))
    }

    pub fn monthly_lock(
        &self,
        member_id: &MemberId,
        month: MonthKey,
    ) -> Result<Option<MonthlyLock>, StoreError> {
        self.read(&lock_key(member_id, month))
    }

    pub fn sign_off(&self, id: &SignOffId) -> Result<Option<SignOffAttestation>, StoreError> {
        self.read(&sign_off_key(id))
    }

    pub fn visit(&self, id: &VisitId) -> Result<Option<VisitRecord>, StoreError> {
        self.read(&visit_key(id))
    }

    /// Every monthly lock, ordered by member then month.
    pub fn monthly_locks(&self) -> Result<Vec<MonthlyLock>, StoreError> {
        self.scan(LOCK_PREFIX)
    }

    pub fn claims(&self) -> Result<Vec<Claim>, StoreError> {
        self.scan(CLAIM_PREFIX)
    }

    pub fn sign_offs(&self) -> Result<Vec<SignOffAttestation>, StoreError> {
        self.scan(SIGN_OFF_PREFIX)
    }

    /// Store a draft visit on behalf of the external capture path.
    pub fn insert_draft_visit(&self, visit: &VisitRecord) -> Result<(), StoreError> {
        let mut txn = LedgerTxn::begin(self.store.as_ref())?;
        txn.put_visit(visit)?;
        txn.commit()
    }

    /// Store a draft visit unless one with the same id exists. Returns
    /// whether it was written. An existing record keeps its status.
    pub fn insert_draft_visit_if_absent(&self, visit: &VisitRecord) -> Result<bool, StoreError> {
        let mut txn = LedgerTxn::begin(self.store.as_ref())?;
        if txn.visit(&visit.id)?.is_some() {
            return Ok(false);
        }
        txn.put_visit(visit)?;
        txn.commit()?;
        Ok(true)
    }
}

#[async_trait]
impl VisitSource for LedgerRepository {
    async fn load_visits(&self, ids: &[VisitId]) -> Result<VisitLookup, StoreError> {
        let mut lookup = VisitLookup::default();
        for id in ids {
            match self.visit(id)? {
                Some(visit) => lookup.found.push(visit),
                None => lookup.missing.push(id.clone()),
            }
        }
        Ok(lookup)
    }
}
