//! # Visit-Claim Settlement Ledger
//!
//! **Subsystem ID:** 1
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Converts a social worker's drafted facility visits into a billable,
//! auditable claim. A single submission writes the monthly member locks, the
//! claim, the staff sign-off attestation and the finalized visit records in
//! one optimistic transaction.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | No visit billed twice | `domain/eligibility.rs` + in-transaction re-check in `service/transaction.rs` |
//! | INVARIANT-2 | One billed visit per member per calendar month | `service/transaction.rs` - monthly lock conflict scan |
//! | INVARIANT-3 | All-or-nothing submission | `ports/outbound.rs` - `StoreTransaction::commit()` |
//! | INVARIANT-4 | Resubmission never duplicates a claim | `domain/claim_key.rs` + `ClaimAlreadyExists` check |
//! | INVARIANT-5 | `total = count × rate + (count > 0 ? flat fee : 0)` | `domain/amount.rs` |
//! | INVARIANT-6 | `draft → signed_off` is one-way | `domain/entities.rs` - `VisitRecord::finalize()` |
//!
//! ## Submission Protocol
//!
//! ```text
//! caller ──verify──→ validate request ──load visits──→ replay check
//!                                                          │
//!                                                     eligibility
//!                                                          │
//!              ┌───────────────── optimistic transaction ──┴──────────┐
//!              │ 1. read claim (exists → ClaimAlreadyExists)           │
//!              │ 2. read monthly locks for every (member, month)       │
//!              │ 3. conflicts → MonthlyMemberVisitAlreadyCompleted     │
//!              │ 4. write locks, claim, attestation, finalized visits  │
//!              │ 5. commit (store conflict → retry from 1, bounded)    │
//!              └──────────────────────────────┬────────────────────────┘
//!                                             ↓
//!                               post-commit hooks (best effort)
//! ```
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - in-memory + RocksDB stores, repository, relay      │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - SettlementApi trait                        │
//! │  ports/outbound.rs - LedgerStore, VisitSource, CallerVerifier,  │
//! │                      NotificationDispatcher, PostCommitHook     │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs     - VisitRecord, MonthlyLock, Claim, ...  │
//! │  domain/request.rs      - SubmitClaimRequest validation         │
//! │  domain/eligibility.rs  - per-visit eligibility rules           │
//! │  domain/claim_key.rs    - deterministic claim key               │
//! │  domain/amount.rs       - claim amount calculator               │
//! │  domain/flags.rs        - flag evaluation from raw payload      │
//! │  domain/errors.rs       - LedgerError, ValidationError, ...     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{
    FlaggedVisitRelay, InMemoryLedgerStore, LedgerRepository, LedgerTxn, StaticTokenVerifier,
    TokenGrant, TracingDispatcher,
};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbLedgerStore};
pub use domain::*;
pub use ports::*;
pub use service::{SettlementDeps, SettlementService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
