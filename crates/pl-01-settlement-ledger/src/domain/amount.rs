//! # Claim Amount Calculator
//!
//! `total = visit_count × per_visit_rate + (visit_count ≥ 1 ? per_day_flat_fee : 0)`
//!
//! The flat fee is charged once per submission, not once per calendar day
//! across submissions. Rates are fixed; there is no rate-plan configuration.

use super::value_objects::ClaimAmounts;

/// Fee per billed visit, in whole currency units.
pub const PER_VISIT_RATE: u64 = 45;

/// Flat fee charged once per non-empty submission, in whole currency units.
pub const PER_DAY_FLAT_FEE: u64 = 20;

/// Compute the amounts for a submission of `visit_count` visits at the
/// standard rates.
pub fn calculate_claim_amount(visit_count: u32) -> ClaimAmounts {
    calculate_with_rates(visit_count, PER_VISIT_RATE, PER_DAY_FLAT_FEE)
}

pub fn calculate_with_rates(
    visit_count: u32,
    per_visit_rate: u64,
    per_day_flat_fee: u64,
) -> ClaimAmounts {
    let visit_total = u64::from(visit_count).saturating_mul(per_visit_rate);
    let flat_fee = if visit_count > 0 { per_day_flat_fee } else { 0 };

    ClaimAmounts {
        visit_count,
        per_visit_rate,
        per_day_flat_fee,
        total_amount: visit_total.saturating_add(flat_fee),
    }
}
