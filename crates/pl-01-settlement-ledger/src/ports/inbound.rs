//! # Inbound Ports (Driving Ports)
//!
//! The primary API for the Settlement Ledger subsystem.

use crate::domain::entities::Claim;
use crate::domain::errors::LedgerError;
use crate::domain::request::SubmitClaimRequest;
use crate::domain::value_objects::{CallerIdentity, SubmissionReceipt};
use async_trait::async_trait;
use shared_types::ClaimId;

/// Primary API for the Settlement Ledger subsystem.
///
/// Implementations must enforce all domain invariants.
#[async_trait]
pub trait SettlementApi: Send + Sync {
    /// Resolve a bearer token to a caller allowed to submit claims.
    ///
    /// Lets a driving adapter reject a caller before reading the request
    /// body. `submit_claim` and `get_claim` perform the same check.
    ///
    /// ## Errors
    ///
    /// - `Unauthorized`: token missing or not recognised
    /// - `Forbidden`: caller known but not allowed to submit
    async fn authenticate(
        &self,
        bearer_token: Option<&str>,
    ) -> Result<CallerIdentity, LedgerError>;

    /// Convert the selected draft visits into a claim.
    ///
    /// ## Atomicity (INVARIANT-3)
    ///
    /// Locks, claim, attestation and finalized visits land together or not
    /// at all.
    ///
    /// ## Errors
    ///
    /// - `Unauthorized`: token missing or not recognised
    /// - `Forbidden`: caller known but not allowed to submit
    /// - `Validation`: malformed request or ineligible selection
    /// - `VisitsNotFound`: one or more selected ids do not exist
    /// - `ClaimAlreadyExists`: a claim is already stored at the derived key
    /// - `MonthlyMemberVisitAlreadyCompleted`: member/month already owned
    /// - `Transient`: optimistic conflicts persisted past the retry budget
    async fn submit_claim(
        &self,
        bearer_token: Option<&str>,
        request: SubmitClaimRequest,
    ) -> Result<SubmissionReceipt, LedgerError>;

    /// Read back a claim owned by the caller.
    ///
    /// ## Errors
    ///
    /// - `Unauthorized` / `Forbidden`: as for `submit_claim`
    /// - `ClaimNotFound`: no claim at this key for this caller
    async fn get_claim(
        &self,
        bearer_token: Option<&str>,
        claim_id: &ClaimId,
    ) -> Result<Claim, LedgerError>;
}
