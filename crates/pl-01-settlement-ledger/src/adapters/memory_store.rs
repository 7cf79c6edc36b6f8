//! # In-Memory Optimistic Store
//!
//! Versioned key-value map with optimistic transactions, for tests and
//! single-node runs.
//!
//! Every committed write bumps the key's version. A transaction remembers
//! the version of each key the first time it reads or writes it; at commit
//! the whole transaction is rejected with `StoreError::Conflict` if any of
//! those versions moved. First committer wins.

use crate::domain::errors::StoreError;
use crate::ports::outbound::{LedgerStore, StoreTransaction};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

/// Version reported for a key that has never been written.
const ABSENT: u64 = 0;

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    version: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<Vec<u8>, Entry>,
    last_version: u64,
    forced_conflicts: u32,
    commits: u64,
}

impl Inner {
    fn version_of(&self, key: &[u8]) -> u64 {
        self.entries.get(key).map_or(ABSENT, |e| e.version)
    }
}

/// In-memory `LedgerStore` with per-key versioning.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: Mutex<Inner>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next `n` commits to fail with `StoreError::Conflict`.
    pub fn inject_commit_conflicts(&self, n: u32) {
        self.inner.lock().forced_conflicts = n;
    }

    /// Number of transactions committed so far.
    pub fn commit_count(&self) -> u64 {
        self.inner.lock().commits
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
        Ok(Box::new(InMemoryTransaction {
            store: self,
            observed: HashMap::new(),
            writes: BTreeMap::new(),
        }))
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.lock().entries.get(key).map(|e| e.value.clone()))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect())
    }
}

struct InMemoryTransaction<'a> {
    store: &'a InMemoryLedgerStore,
    /// Version of each touched key when it was first touched.
    observed: HashMap<Vec<u8>, u64>,
    writes: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl StoreTransaction for InMemoryTransaction<'_> {
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(buffered) = self.writes.get(key) {
            return Ok(Some(buffered.clone()));
        }
        let inner = self.store.inner.lock();
        let entry = inner.entries.get(key);
        self.observed
            .entry(key.to_vec())
            .or_insert_with(|| entry.map_or(ABSENT, |e| e.version));
        Ok(entry.map(|e| e.value.clone()))
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        if !self.observed.contains_key(key) {
            let version = self.store.inner.lock().version_of(key);
            self.observed.insert(key.to_vec(), version);
        }
        self.writes.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTransaction {
            store,
            observed,
            writes,
        } = *self;
        let mut inner = store.inner.lock();

        if inner.forced_conflicts > 0 {
            inner.forced_conflicts -= 1;
            return Err(StoreError::Conflict);
        }

        let stale = observed
            .iter()
            .any(|(key, version)| inner.version_of(key) != *version);
        if stale {
            return Err(StoreError::Conflict);
        }

        for (key, value) in writes {
            inner.last_version += 1;
            let version = inner.last_version;
            inner.entries.insert(key, Entry { value, version });
        }
        inner.commits += 1;
        Ok(())
    }
}
