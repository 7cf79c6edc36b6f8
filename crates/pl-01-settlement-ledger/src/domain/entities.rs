//! # Domain Entities
//!
//! The four record kinds the ledger reads and writes: visit records, monthly
//! member locks, claims and sign-off attestations.

use super::errors::ValidationError;
use super::value_objects::FlagAssessment;
use serde::{Deserialize, Serialize};
use shared_types::{
    ClaimDay, ClaimId, FacilityId, MemberId, MonthKey, SignOffId, Timestamp, VisitId, WorkerId,
};
use std::collections::BTreeMap;
use std::fmt;

/// Visit lifecycle. `Draft → SignedOff` happens exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Draft,
    SignedOff,
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitStatus::Draft => write!(f, "draft"),
            VisitStatus::SignedOff => write!(f, "signed_off"),
        }
    }
}

/// Claim lifecycle.
///
/// The ledger only ever writes `Submitted`; `Paid` is set by downstream
/// billing and is read here solely to refuse re-billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Submitted,
    Paid,
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimStatus::Submitted => write!(f, "submitted"),
            ClaimStatus::Paid => write!(f, "paid"),
        }
    }
}

/// Device location captured with a sign-off.
///
/// Unknown fields are rejected rather than ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// Sign-off metadata stamped onto a visit when it is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSignOff {
    pub sign_off_id: SignOffId,
    pub signed_off_at: Timestamp,
    pub staff_name: String,
}

/// Parameters for creating a draft visit. Also the wire shape of a visit
/// handed over by the capture path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DraftVisitParams {
    pub id: VisitId,
    pub worker_id: WorkerId,
    pub facility_id: FacilityId,
    pub facility_name: String,
    pub member_id: MemberId,
    pub member_name: String,
    #[serde(default)]
    pub room_number: Option<String>,
    pub claim_day: ClaimDay,
    #[serde(default)]
    pub raw_payload: serde_json::Value,
}

/// One visit by one worker to one member at one facility on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub id: VisitId,
    pub worker_id: WorkerId,
    pub facility_id: FacilityId,
    pub facility_name: String,
    pub member_id: MemberId,
    pub member_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    pub claim_day: ClaimDay,
    pub status: VisitStatus,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub flag_reasons: Vec<String>,
    /// Opaque assessment payload, passed through to notifications.
    #[serde(default)]
    pub raw_payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<ClaimId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_status: Option<ClaimStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_off: Option<VisitSignOff>,
}

impl VisitRecord {
    /// Create a visit in `Draft`.
    pub fn draft(params: DraftVisitParams) -> Self {
        Self {
            id: params.id,
            worker_id: params.worker_id,
            facility_id: params.facility_id,
            facility_name: params.facility_name,
            member_id: params.member_id,
            member_name: params.member_name,
            room_number: params.room_number,
            claim_day: params.claim_day,
            status: VisitStatus::Draft,
            flagged: false,
            flag_reasons: Vec::new(),
            raw_payload: params.raw_payload,
            claim_id: None,
            claim_status: None,
            sign_off: None,
        }
    }

    pub fn month_key(&self) -> MonthKey {
        self.claim_day.month_key()
    }

    /// True when the visit is already attached to a claim or signed off.
    pub fn is_billed(&self) -> bool {
        self.status == VisitStatus::SignedOff
            || self.sign_off.is_some()
            || self.claim_id.is_some()
            || self.claim_status.is_some()
    }

    /// Move the visit to `SignedOff`, attaching the claim and sign-off.
    ///
    /// Fails if the visit has left `Draft`; the transition never reverses.
    pub fn finalize(
        &mut self,
        claim_id: ClaimId,
        sign_off: VisitSignOff,
        flags: FlagAssessment,
    ) -> Result<(), ValidationError> {
        if self.is_billed() {
            return Err(ValidationError::IneligibleSelection);
        }
        self.status = VisitStatus::SignedOff;
        self.claim_id = Some(claim_id);
        self.claim_status = Some(ClaimStatus::Submitted);
        self.sign_off = Some(sign_off);
        self.flagged = flags.flagged;
        self.flag_reasons = flags.reasons;
        Ok(())
    }
}

/// Uniqueness record: which visit owns a member's billable month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyLock {
    pub member_id: MemberId,
    pub month_key: MonthKey,
    pub visit_id: VisitId,
    pub claim_id: ClaimId,
    pub worker_id: WorkerId,
    pub facility_id: FacilityId,
    pub claim_day: ClaimDay,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MonthlyLock {
    /// Lock a member's month for `visit`.
    pub fn acquire(visit: &VisitRecord, claim_id: &ClaimId, now: Timestamp) -> Self {
        Self {
            member_id: visit.member_id.clone(),
            month_key: visit.month_key(),
            visit_id: visit.id.clone(),
            claim_id: claim_id.clone(),
            worker_id: visit.worker_id.clone(),
            facility_id: visit.facility_id.clone(),
            claim_day: visit.claim_day,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a re-affirmation by the owning visit; `created_at` is kept.
    pub fn reaffirm(&self, visit: &VisitRecord, claim_id: &ClaimId, now: Timestamp) -> Self {
        Self {
            created_at: self.created_at,
            ..Self::acquire(visit, claim_id, now)
        }
    }

    pub fn is_owned_by(&self, visit_id: &VisitId) -> bool {
        &self.visit_id == visit_id
    }
}

/// Per-attestation summary embedded in the claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOffSummary {
    pub staff_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_title: Option<String>,
    pub signed_at: Timestamp,
    pub location_verified: bool,
}

/// A billable aggregation of one worker's visits at one facility on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: ClaimId,
    pub worker_id: WorkerId,
    pub worker_name: String,
    pub facility_id: FacilityId,
    pub facility_name: String,
    pub claim_day: ClaimDay,
    pub visit_ids: Vec<VisitId>,
    pub visit_count: u32,
    pub per_visit_rate: u64,
    pub per_day_flat_fee: u64,
    pub total_amount: u64,
    pub status: ClaimStatus,
    pub submitted_at: Timestamp,
    pub sign_offs: BTreeMap<SignOffId, SignOffSummary>,
}

/// Immutable receipt of the facility staff attestation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOffAttestation {
    pub id: SignOffId,
    pub claim_id: ClaimId,
    pub facility_id: FacilityId,
    pub worker_id: WorkerId,
    pub claim_day: ClaimDay,
    pub visit_ids: Vec<VisitId>,
    pub staff_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_title: Option<String>,
    pub signature_text: String,
    pub signed_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<Geolocation>,
    pub location_verified: bool,
    pub attestation_text: String,
    pub submitted_at: Timestamp,
}

impl SignOffAttestation {
    pub fn summary(&self) -> SignOffSummary {
        SignOffSummary {
            staff_name: self.staff_name.clone(),
            staff_title: self.staff_title.clone(),
            signed_at: self.signed_at,
            location_verified: self.location_verified,
        }
    }
}
