//! # Claim Key Deriver
//!
//! A claim is addressed by `claim_<worker>_<YYYYMMDD>_<facility digest>`.
//! Retries of the same logical submission always land on the same key, so
//! a second attempt finds the first claim instead of creating another.
//!
//! The facility digest is the first 10 hex characters of SHA-256 over the
//! facility id. It keeps keys short and identifier-safe; it is not a
//! security boundary.

use sha2::{Digest, Sha256};
use shared_types::{ClaimDay, ClaimId, FacilityId, WorkerId};

pub const CLAIM_KEY_PREFIX: &str = "claim";

/// Hex characters of the facility digest kept in the key.
pub const FACILITY_DIGEST_HEX_LEN: usize = 10;

pub fn facility_digest(facility_id: &FacilityId) -> String {
    let digest = Sha256::digest(facility_id.as_str().as_bytes());
    let mut short = hex::encode(&digest[..FACILITY_DIGEST_HEX_LEN.div_ceil(2)]);
    short.truncate(FACILITY_DIGEST_HEX_LEN);
    short
}

pub fn derive_claim_key(
    worker_id: &WorkerId,
    claim_day: ClaimDay,
    facility_id: &FacilityId,
) -> ClaimId {
    ClaimId::new(format!(
        "{}_{}_{}_{}",
        CLAIM_KEY_PREFIX,
        worker_id,
        claim_day.compact(),
        facility_digest(facility_id)
    ))
}
