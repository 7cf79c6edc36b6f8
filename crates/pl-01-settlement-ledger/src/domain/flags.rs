//! # Flag Evaluation
//!
//! Recomputes a visit's `flagged` / `flag_reasons` from its raw assessment
//! payload when the visit is finalized. Recognised payload fields:
//!
//! | Field | Condition | Reason |
//! |-------|-----------|--------|
//! | `concerns[*].severity` | equals `critical` (any case) | `critical_concern` |
//! | `actionRequired` | `true` | `action_required` |
//! | `facilityReviewFlag` | `true` | `facility_review` |
//!
//! Anything else in the payload is ignored.

use super::entities::VisitRecord;
use super::value_objects::{FlagAssessment, Urgency};
use serde_json::Value;

pub const REASON_CRITICAL_CONCERN: &str = "critical_concern";
pub const REASON_ACTION_REQUIRED: &str = "action_required";
pub const REASON_FACILITY_REVIEW: &str = "facility_review";

pub fn evaluate_flags(payload: &Value) -> FlagAssessment {
    let mut reasons = Vec::new();

    let critical = payload
        .get("concerns")
        .and_then(Value::as_array)
        .map(|concerns| {
            concerns.iter().any(|c| {
                c.get("severity")
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.eq_ignore_ascii_case("critical"))
            })
        })
        .unwrap_or(false);
    if critical {
        reasons.push(REASON_CRITICAL_CONCERN.to_string());
    }

    if flag_set(payload, "actionRequired") {
        reasons.push(REASON_ACTION_REQUIRED.to_string());
    }
    if flag_set(payload, "facilityReviewFlag") {
        reasons.push(REASON_FACILITY_REVIEW.to_string());
    }

    FlagAssessment {
        flagged: !reasons.is_empty(),
        reasons,
    }
}

fn flag_set(payload: &Value, field: &str) -> bool {
    payload.get(field).and_then(Value::as_bool).unwrap_or(false)
}

/// Critical concerns are urgent; every other flag is routine.
pub fn classify_urgency(visit: &VisitRecord) -> Urgency {
    if visit.flag_reasons.iter().any(|r| r == REASON_CRITICAL_CONCERN) {
        Urgency::Urgent
    } else {
        Urgency::Routine
    }
}
