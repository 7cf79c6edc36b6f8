//! # Value Objects
//!
//! Small immutable values passed between the coordinator, its callers and
//! its collaborators.

use super::entities::{Claim, ClaimStatus, Geolocation, SignOffAttestation, VisitRecord};
use serde::{Deserialize, Serialize};
use shared_types::{ClaimDay, ClaimId, FacilityId, MemberId, SignOffId, VisitId, WorkerId};
use std::fmt;

/// Amounts embedded verbatim into a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimAmounts {
    pub visit_count: u32,
    pub per_visit_rate: u64,
    pub per_day_flat_fee: u64,
    pub total_amount: u64,
}

/// A member whose month is already owned by another visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockConflict {
    pub member_id: MemberId,
    pub member_name: String,
    pub existing_visit_id: VisitId,
}

/// Outcome of evaluating a visit's raw payload for downstream notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagAssessment {
    pub flagged: bool,
    pub reasons: Vec<String>,
}

/// Urgency attached to a flagged-visit notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Urgent,
    Routine,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Urgent => write!(f, "urgent"),
            Urgency::Routine => write!(f, "routine"),
        }
    }
}

/// Verified caller, as returned by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub worker_id: WorkerId,
    pub display_name: String,
    /// False when the caller is known but may not submit claims.
    pub authorized: bool,
}

/// Everything a successful commit wrote, handed to post-commit hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedSubmission {
    pub claim: Claim,
    pub sign_off: SignOffAttestation,
    pub visits: Vec<VisitRecord>,
}

impl CommittedSubmission {
    pub fn flagged_visits(&self) -> impl Iterator<Item = &VisitRecord> {
        self.visits.iter().filter(|v| v.flagged)
    }
}

/// Success body returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub success: bool,
    pub claim_id: ClaimId,
    pub sign_off_id: SignOffId,
    pub facility_id: FacilityId,
    pub claim_day: ClaimDay,
    pub total_visits: u32,
    pub total_amount: u64,
    pub status: ClaimStatus,
    pub location_verified: bool,
    pub geolocation: Option<Geolocation>,
}

impl From<&CommittedSubmission> for SubmissionReceipt {
    fn from(committed: &CommittedSubmission) -> Self {
        Self {
            success: true,
            claim_id: committed.claim.id.clone(),
            sign_off_id: committed.sign_off.id.clone(),
            facility_id: committed.claim.facility_id.clone(),
            claim_day: committed.claim.claim_day,
            total_visits: committed.claim.visit_count,
            total_amount: committed.claim.total_amount,
            status: committed.claim.status,
            location_verified: committed.sign_off.location_verified,
            geolocation: committed.sign_off.geolocation,
        }
    }
}
