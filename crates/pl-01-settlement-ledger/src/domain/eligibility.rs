//! # Eligibility Validator
//!
//! Every selected visit must independently pass every rule before any write
//! is attempted. The caller only ever sees `IneligibleSelection`; the
//! specific rule is logged.

use super::entities::{VisitRecord, VisitStatus};
use super::errors::ValidationError;
use shared_types::{ClaimDay, FacilityId, WorkerId};
use std::fmt;
use tracing::warn;

/// The request parameters every selected visit is checked against.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityContext<'a> {
    pub worker_id: &'a WorkerId,
    pub facility_id: &'a FacilityId,
    pub claim_day: ClaimDay,
}

/// Rule a visit failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibilityReason {
    NotDraft,
    WrongWorker,
    WrongFacility,
    WrongDay,
    AlreadyClaimed,
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IneligibilityReason::NotDraft => "visit is not in draft",
            IneligibilityReason::WrongWorker => "visit belongs to another worker",
            IneligibilityReason::WrongFacility => "visit is for another facility",
            IneligibilityReason::WrongDay => "visit is for another day",
            IneligibilityReason::AlreadyClaimed => {
                "visit is already signed off or attached to a claim"
            }
        };
        f.write_str(text)
    }
}

pub fn check_visit(
    visit: &VisitRecord,
    ctx: &EligibilityContext<'_>,
) -> Result<(), IneligibilityReason> {
    if visit.status != VisitStatus::Draft {
        return Err(IneligibilityReason::NotDraft);
    }
    if &visit.worker_id != ctx.worker_id {
        return Err(IneligibilityReason::WrongWorker);
    }
    if &visit.facility_id != ctx.facility_id {
        return Err(IneligibilityReason::WrongFacility);
    }
    if visit.claim_day != ctx.claim_day {
        return Err(IneligibilityReason::WrongDay);
    }
    if visit.is_billed() {
        return Err(IneligibilityReason::AlreadyClaimed);
    }
    Ok(())
}

/// Check every visit; the first failure rejects the whole selection.
pub fn validate_selection(
    visits: &[VisitRecord],
    ctx: &EligibilityContext<'_>,
) -> Result<(), ValidationError> {
    for visit in visits {
        if let Err(reason) = check_visit(visit, ctx) {
            warn!(
                visit_id = %visit.id,
                worker_id = %ctx.worker_id,
                facility_id = %ctx.facility_id,
                claim_day = %ctx.claim_day,
                %reason,
                "Rejecting ineligible visit selection"
            );
            return Err(ValidationError::IneligibleSelection);
        }
    }
    Ok(())
}
