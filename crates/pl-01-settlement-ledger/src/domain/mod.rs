//! # Domain Layer - Settlement Ledger
//!
//! Pure business logic: no I/O, no clocks, no store access.
//!
//! ## Components
//!
//! - `entities`: VisitRecord, MonthlyLock, Claim, SignOffAttestation
//! - `value_objects`: ClaimAmounts, LockConflict, SubmissionReceipt, Urgency
//! - `request`: SubmitClaimRequest and its validated form
//! - `eligibility`: per-visit eligibility rules
//! - `claim_key`: deterministic claim key derivation
//! - `amount`: claim amount calculator
//! - `flags`: flag evaluation from the raw assessment payload
//! - `config`: LedgerConfig
//! - `errors`: LedgerError, ValidationError, StoreError

pub mod amount;
pub mod claim_key;
pub mod config;
pub mod eligibility;
pub mod entities;
pub mod errors;
pub mod flags;
pub mod request;
pub mod value_objects;

pub use amount::*;
pub use claim_key::*;
pub use config::*;
pub use eligibility::*;
pub use entities::*;
pub use errors::*;
pub use flags::*;
pub use request::*;
pub use value_objects::*;
