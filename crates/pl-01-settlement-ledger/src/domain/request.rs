//! # Submission Request
//!
//! The wire shape of a claim submission and its validation into a
//! `ValidatedSubmission`. All checks here run before any store access.

use super::config::LedgerConfig;
use super::entities::Geolocation;
use super::errors::ValidationError;
use serde::{Deserialize, Serialize};
use shared_types::{ClaimDay, FacilityId, Timestamp, VisitId};
use std::collections::HashSet;

/// Claim submission body as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitClaimRequest {
    pub facility_id: String,
    pub claim_day: String,
    pub selected_visit_ids: Vec<String>,
    pub staff_name: String,
    pub staff_title: Option<String>,
    pub signature: String,
    pub signed_at: Option<String>,
    pub geolocation: Option<Geolocation>,
}

/// A submission whose fields are all present and well-formed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub facility_id: FacilityId,
    pub claim_day: ClaimDay,
    /// Selected ids in request order, duplicates removed.
    pub visit_ids: Vec<VisitId>,
    pub staff_name: String,
    pub staff_title: Option<String>,
    pub signature: String,
    /// `None` means "stamp with the submission time".
    pub signed_at: Option<Timestamp>,
    pub geolocation: Option<Geolocation>,
}

impl SubmitClaimRequest {
    pub fn validate(self, config: &LedgerConfig) -> Result<ValidatedSubmission, ValidationError> {
        let facility_id = self.facility_id.trim();
        if facility_id.is_empty() {
            return Err(ValidationError::MissingFacility);
        }

        let claim_day = ClaimDay::parse(self.claim_day.trim())
            .map_err(|_| ValidationError::InvalidClaimDay(self.claim_day.clone()))?;

        if self.selected_visit_ids.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        let mut seen = HashSet::with_capacity(self.selected_visit_ids.len());
        let mut visit_ids = Vec::with_capacity(self.selected_visit_ids.len());
        for raw in &self.selected_visit_ids {
            let id = raw.trim();
            if id.is_empty() {
                return Err(ValidationError::BlankVisitId);
            }
            if seen.insert(id) {
                visit_ids.push(VisitId::new(id));
            }
        }
        if visit_ids.len() > config.max_selected_visits {
            return Err(ValidationError::TooManyVisits {
                count: visit_ids.len(),
                max: config.max_selected_visits,
            });
        }

        let staff_name = self.staff_name.trim();
        if staff_name.is_empty() {
            return Err(ValidationError::MissingStaffName);
        }
        let signature = self.signature.trim();
        if signature.is_empty() {
            return Err(ValidationError::MissingSignature);
        }

        let signed_at = match self.signed_at.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                chrono::DateTime::parse_from_rfc3339(raw)
                    .map_err(|_| ValidationError::InvalidSignedAt(raw.to_string()))?
                    .with_timezone(&chrono::Utc),
            ),
        };

        if let Some(geo) = &self.geolocation {
            check_geolocation(geo)?;
        }

        let staff_title = self
            .staff_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(ValidatedSubmission {
            facility_id: FacilityId::new(facility_id),
            claim_day,
            visit_ids,
            staff_name: staff_name.to_string(),
            staff_title,
            signature: signature.to_string(),
            signed_at,
            geolocation: self.geolocation,
        })
    }
}

fn check_geolocation(geo: &Geolocation) -> Result<(), ValidationError> {
    if !geo.latitude.is_finite() || !(-90.0..=90.0).contains(&geo.latitude) {
        return Err(ValidationError::InvalidGeolocation(format!(
            "latitude {} out of range",
            geo.latitude
        )));
    }
    if !geo.longitude.is_finite() || !(-180.0..=180.0).contains(&geo.longitude) {
        return Err(ValidationError::InvalidGeolocation(format!(
            "longitude {} out of range",
            geo.longitude
        )));
    }
    if let Some(accuracy) = geo.accuracy {
        if !accuracy.is_finite() || accuracy < 0.0 {
            return Err(ValidationError::InvalidGeolocation(format!(
                "accuracy {accuracy} must be a non-negative number"
            )));
        }
    }
    Ok(())
}

/// A location counts as verified when it is present and its reported
/// accuracy, if any, is within `threshold_m`.
pub fn location_verified(geolocation: Option<&Geolocation>, threshold_m: f64) -> bool {
    match geolocation {
        None => false,
        Some(geo) => {
            check_geolocation(geo).is_ok() && geo.accuracy.map_or(true, |a| a <= threshold_m)
        }
    }
}
