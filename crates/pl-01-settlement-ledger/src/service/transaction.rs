//! # Transaction Coordinator
//!
//! Runs one submission as a single optimistic transaction and retries the
//! whole transaction when the store reports a commit-time conflict.
//!
//! ## Ordering
//!
//! Within an attempt every check happens before any write:
//!
//! 1. claim existence
//! 2. visit re-read (missing / already billed)
//! 3. monthly lock conflicts, including collisions inside the batch
//!
//! Only then are locks, claim, attestation and visits written, and the
//! transaction committed.

use crate::adapters::repository::LedgerTxn;
use crate::domain::entities::{Claim, MonthlyLock, SignOffAttestation, VisitRecord, VisitSignOff};
use crate::domain::errors::{LedgerError, StoreError, ValidationError};
use crate::domain::flags::evaluate_flags;
use crate::domain::value_objects::{CommittedSubmission, LockConflict};
use crate::ports::outbound::LedgerStore;
use shared_types::{MemberId, MonthKey, Timestamp, VisitId};
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Everything computed before the transaction opens. Never regenerated
/// between attempts.
#[derive(Debug, Clone)]
pub(crate) struct SubmissionPlan {
    pub claim: Claim,
    pub sign_off: SignOffAttestation,
    pub now: Timestamp,
}

/// Run the submission transaction, retrying on optimistic conflicts.
///
/// `max_attempts` counts the first attempt. Exhausting it yields
/// `LedgerError::Transient`.
pub(crate) fn commit_with_retry(
    store: &dyn LedgerStore,
    plan: &SubmissionPlan,
    max_attempts: u32,
) -> Result<CommittedSubmission, LedgerError> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match run_attempt(store, plan) {
            Err(LedgerError::Store(StoreError::Conflict)) if attempt < max_attempts => {
                warn!(
                    claim_id = %plan.claim.id,
                    attempt,
                    max_attempts,
                    "Optimistic conflict, retrying submission transaction"
                );
            }
            Err(LedgerError::Store(StoreError::Conflict)) => {
                error!(
                    claim_id = %plan.claim.id,
                    attempts = attempt,
                    "Submission transaction kept conflicting, giving up"
                );
                return Err(LedgerError::Transient { attempts: attempt });
            }
            other => return other,
        }
    }
}

fn run_attempt(
    store: &dyn LedgerStore,
    plan: &SubmissionPlan,
) -> Result<CommittedSubmission, LedgerError> {
    let mut txn = LedgerTxn::begin(store)?;

    if let Some(existing) = txn.claim(&plan.claim.id)? {
        debug!(claim_id = %existing.id, status = %existing.status, "Claim already exists");
        return Err(LedgerError::ClaimAlreadyExists {
            claim_id: existing.id,
            status: existing.status,
        });
    }

    let mut visits = Vec::with_capacity(plan.claim.visit_ids.len());
    let mut missing = Vec::new();
    for id in &plan.claim.visit_ids {
        match txn.visit(id)? {
            Some(visit) => visits.push(visit),
            None => missing.push(id.clone()),
        }
    }
    if !missing.is_empty() {
        return Err(LedgerError::VisitsNotFound { missing });
    }

    let mut conflicts = Vec::new();
    let mut batch_owner: HashMap<(MemberId, MonthKey), &VisitId> = HashMap::new();
    let mut current_locks = Vec::with_capacity(visits.len());
    for visit in &visits {
        let slot = (visit.member_id.clone(), visit.month_key());
        if let Some(earlier) = batch_owner.get(&slot) {
            conflicts.push(LockConflict {
                member_id: visit.member_id.clone(),
                member_name: visit.member_name.clone(),
                existing_visit_id: (*earlier).clone(),
            });
            current_locks.push(None);
            continue;
        }
        batch_owner.insert(slot, &visit.id);

        let lock = txn.monthly_lock(&visit.member_id, visit.month_key())?;
        if let Some(lock) = &lock {
            if !lock.is_owned_by(&visit.id) {
                conflicts.push(LockConflict {
                    member_id: visit.member_id.clone(),
                    member_name: visit.member_name.clone(),
                    existing_visit_id: lock.visit_id.clone(),
                });
            }
        }
        current_locks.push(lock);
    }
    if !conflicts.is_empty() {
        debug!(
            claim_id = %plan.claim.id,
            conflicts = conflicts.len(),
            "Monthly member locks already held"
        );
        return Err(LedgerError::MonthlyMemberVisitAlreadyCompleted { conflicts });
    }

    if visits.iter().any(VisitRecord::is_billed) {
        return Err(ValidationError::IneligibleSelection.into());
    }

    for (visit, current) in visits.iter().zip(&current_locks) {
        let lock = match current {
            Some(lock) => lock.reaffirm(visit, &plan.claim.id, plan.now),
            None => MonthlyLock::acquire(visit, &plan.claim.id, plan.now),
        };
        txn.put_monthly_lock(&lock)?;
    }

    txn.put_claim(&plan.claim)?;
    txn.put_sign_off(&plan.sign_off)?;

    let mut finalized = Vec::with_capacity(visits.len());
    for mut visit in visits {
        let flags = evaluate_flags(&visit.raw_payload);
        visit.finalize(
            plan.claim.id.clone(),
            VisitSignOff {
                sign_off_id: plan.sign_off.id.clone(),
                signed_off_at: plan.now,
                staff_name: plan.sign_off.staff_name.clone(),
            },
            flags,
        )?;
        txn.put_visit(&visit)?;
        finalized.push(visit);
    }

    txn.commit()?;

    Ok(CommittedSubmission {
        claim: plan.claim.clone(),
        sign_off: plan.sign_off.clone(),
        visits: finalized,
    })
}
