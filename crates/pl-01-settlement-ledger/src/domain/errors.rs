//! # Domain Errors
//!
//! Error types for the settlement ledger.
//!
//! ## Design Principles
//!
//! - Conflicts are typed variants carrying the detail a caller needs to
//!   render a precise message; nothing is signalled by string matching.
//! - Every variant classifies into exactly one `ErrorKind`.
//! - No panics in domain logic (use Result instead)

use super::entities::ClaimStatus;
use super::value_objects::LockConflict;
use shared_types::{ClaimId, VisitId, WorkerId};
use thiserror::Error;

/// Request or selection problems detected before any transaction opens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("facilityId is required")]
    MissingFacility,

    #[error("claimDay must be YYYY-MM-DD (got '{0}')")]
    InvalidClaimDay(String),

    #[error("selectedVisitIds must not be empty")]
    EmptySelection,

    #[error("selectedVisitIds contains a blank id")]
    BlankVisitId,

    #[error("too many visits selected: {count} (max {max})")]
    TooManyVisits { count: usize, max: usize },

    #[error("staffName is required")]
    MissingStaffName,

    #[error("signature is required")]
    MissingSignature,

    #[error("signedAt must be an ISO-8601 timestamp (got '{0}')")]
    InvalidSignedAt(String),

    #[error("invalid geolocation: {0}")]
    InvalidGeolocation(String),

    /// Stale client state: one or more selected visits may not be signed
    /// off. The failed rule is logged, not returned.
    #[error("selected visits are not eligible for sign-off; refresh and try again")]
    IneligibleSelection,
}

/// Storage failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Optimistic concurrency check failed; the transaction may be retried.
    #[error("optimistic transaction conflict")]
    Conflict,

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("corrupt record at '{key}': {message}")]
    Corrupt { key: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Caller verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("token not recognised")]
    InvalidToken,

    #[error("identity lookup unavailable: {0}")]
    Unavailable(String),
}

/// A notification could not be handed to the downstream dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("dispatcher rejected notification: {0}")]
    Rejected(String),

    #[error("dispatcher unreachable: {0}")]
    Unreachable(String),
}

/// A post-commit hook failed. Never affects the committed claim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("{failed} of {attempted} notification(s) failed")]
    PartialDispatch { attempted: usize, failed: usize },

    #[error("{0}")]
    Other(String),
}

/// Error taxonomy used for response shaping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    NotFound,
    Conflict,
    Transient,
    Internal,
}

/// Outcome of a failed settlement operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("caller token missing or invalid")]
    Unauthorized,

    #[error("caller {0} is not authorized to submit claims")]
    Forbidden(WorkerId),

    #[error("selected visits not found: {missing:?}")]
    VisitsNotFound { missing: Vec<VisitId> },

    #[error("claim {0} not found")]
    ClaimNotFound(ClaimId),

    /// A claim already exists at the derived key; nothing was written.
    #[error("claim {claim_id} already exists with status {status}")]
    ClaimAlreadyExists { claim_id: ClaimId, status: ClaimStatus },

    /// One or more members already have a completed visit this month;
    /// nothing was written.
    #[error("{} member(s) already have a completed visit this month", .conflicts.len())]
    MonthlyMemberVisitAlreadyCompleted { conflicts: Vec<LockConflict> },

    /// The store kept reporting optimistic conflicts.
    #[error("transaction aborted after {attempts} attempt(s); retry the request")]
    Transient { attempts: u32 },

    #[error("identity service unavailable: {0}")]
    IdentityUnavailable(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::Unauthorized | LedgerError::Forbidden(_) => ErrorKind::Authorization,
            LedgerError::VisitsNotFound { .. } | LedgerError::ClaimNotFound(_) => {
                ErrorKind::NotFound
            }
            LedgerError::ClaimAlreadyExists { .. }
            | LedgerError::MonthlyMemberVisitAlreadyCompleted { .. } => ErrorKind::Conflict,
            LedgerError::Transient { .. } | LedgerError::Store(StoreError::Conflict) => {
                ErrorKind::Transient
            }
            LedgerError::IdentityUnavailable(_)
            | LedgerError::Store(_)
            | LedgerError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(ValidationError::IneligibleSelection) => "IneligibleSelection",
            LedgerError::Validation(_) => "InvalidRequest",
            LedgerError::Unauthorized => "Unauthorized",
            LedgerError::Forbidden(_) => "Forbidden",
            LedgerError::VisitsNotFound { .. } => "VisitsNotFound",
            LedgerError::ClaimNotFound(_) => "ClaimNotFound",
            LedgerError::ClaimAlreadyExists { .. } => "ClaimAlreadyExists",
            LedgerError::MonthlyMemberVisitAlreadyCompleted { .. } => {
                "MonthlyMemberVisitAlreadyCompleted"
            }
            LedgerError::Transient { .. } | LedgerError::Store(StoreError::Conflict) => {
                "TransientFailure"
            }
            LedgerError::IdentityUnavailable(_)
            | LedgerError::Store(_)
            | LedgerError::Internal(_) => "InternalError",
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}
