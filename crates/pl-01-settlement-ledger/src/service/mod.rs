//! # Settlement Service
//!
//! The main service implementing `SettlementApi`.
//!
//! ## Architecture
//!
//! This service:
//! 1. Verifies the caller before touching the store
//! 2. Validates the request and derives the claim key; a replay of a
//!    committed submission is answered with `ClaimAlreadyExists`
//! 3. Checks eligibility of the selected visits, computes amounts and runs
//!    the transaction coordinator on the blocking pool
//! 4. Runs post-commit hooks, whose failures are logged only

mod transaction;

use crate::adapters::repository::LedgerRepository;
use crate::domain::amount::calculate_claim_amount;
use crate::domain::claim_key::derive_claim_key;
use crate::domain::config::LedgerConfig;
use crate::domain::eligibility::{validate_selection, EligibilityContext};
use crate::domain::entities::{Claim, ClaimStatus, SignOffAttestation, VisitRecord};
use crate::domain::errors::{ErrorKind, IdentityError, LedgerError, ValidationError};
use crate::domain::request::{location_verified, SubmitClaimRequest, ValidatedSubmission};
use crate::domain::value_objects::{CallerIdentity, CommittedSubmission, SubmissionReceipt};
use crate::ports::inbound::SettlementApi;
use crate::ports::outbound::{CallerVerifier, LedgerStore, PostCommitHook, VisitSource};
use async_trait::async_trait;
use shared_types::{ClaimId, SignOffId, TimeSource, Timestamp, VisitId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{field, info, info_span, warn, Instrument, Span};
use transaction::{commit_with_retry, SubmissionPlan};

/// Dependencies for SettlementService
pub struct SettlementDeps {
    pub store: Arc<dyn LedgerStore>,
    pub visits: Arc<dyn VisitSource>,
    pub identity: Arc<dyn CallerVerifier>,
    pub clock: Arc<dyn TimeSource>,
    pub hooks: Vec<Arc<dyn PostCommitHook>>,
}

/// The Settlement Service.
pub struct SettlementService {
    config: LedgerConfig,
    store: Arc<dyn LedgerStore>,
    visits: Arc<dyn VisitSource>,
    identity: Arc<dyn CallerVerifier>,
    clock: Arc<dyn TimeSource>,
    hooks: Vec<Arc<dyn PostCommitHook>>,
}

impl SettlementService {
    pub fn new(config: LedgerConfig, deps: SettlementDeps) -> Self {
        Self {
            config,
            store: deps.store,
            visits: deps.visits,
            identity: deps.identity,
            clock: deps.clock,
            hooks: deps.hooks,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Committed-state queries over the same store.
    pub fn repository(&self) -> LedgerRepository {
        LedgerRepository::new(Arc::clone(&self.store))
    }

    async fn verify_caller(
        &self,
        bearer_token: Option<&str>,
    ) -> Result<CallerIdentity, LedgerError> {
        let token = bearer_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(LedgerError::Unauthorized)?;

        let identity = self.identity.verify(token).await.map_err(|e| match e {
            IdentityError::InvalidToken => LedgerError::Unauthorized,
            IdentityError::Unavailable(reason) => LedgerError::IdentityUnavailable(reason),
        })?;

        if !identity.authorized {
            warn!(worker_id = %identity.worker_id, "Caller not authorized to submit claims");
            return Err(LedgerError::Forbidden(identity.worker_id));
        }
        Ok(identity)
    }

    /// Load the selected visits in selection order.
    async fn load_selection(
        &self,
        submission: &ValidatedSubmission,
    ) -> Result<Vec<VisitRecord>, LedgerError> {
        let lookup = self.visits.load_visits(&submission.visit_ids).await?;
        if !lookup.missing.is_empty() {
            return Err(LedgerError::VisitsNotFound {
                missing: lookup.missing,
            });
        }

        let mut by_id: HashMap<_, _> = lookup
            .found
            .into_iter()
            .map(|visit| (visit.id.clone(), visit))
            .collect();
        let mut ordered = Vec::with_capacity(submission.visit_ids.len());
        let mut missing = Vec::new();
        for id in &submission.visit_ids {
            match by_id.remove(id) {
                Some(visit) => ordered.push(visit),
                None => missing.push(id.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(LedgerError::VisitsNotFound { missing });
        }
        Ok(ordered)
    }

    /// A retry of a committed submission: the claim exists and already
    /// holds every selected visit. Reported as the conflict it is rather
    /// than as a stale selection.
    fn reject_replay(
        &self,
        claim_id: &ClaimId,
        submission: &ValidatedSubmission,
    ) -> Result<(), LedgerError> {
        if let Some(existing) = self.repository().claim(claim_id)? {
            let held: HashSet<&VisitId> = existing.visit_ids.iter().collect();
            if submission.visit_ids.iter().all(|id| held.contains(id)) {
                return Err(LedgerError::ClaimAlreadyExists {
                    claim_id: existing.id,
                    status: existing.status,
                });
            }
        }
        Ok(())
    }

    fn build_plan(
        &self,
        caller: &CallerIdentity,
        submission: ValidatedSubmission,
        visits: &[VisitRecord],
        claim_id: ClaimId,
        now: Timestamp,
    ) -> Result<SubmissionPlan, LedgerError> {
        let visit_count = u32::try_from(visits.len())
            .map_err(|_| LedgerError::Internal("visit count overflow".into()))?;
        let amounts = calculate_claim_amount(visit_count);
        let facility_name = visits
            .first()
            .map(|v| v.facility_name.clone())
            .unwrap_or_default();
        let verified = location_verified(
            submission.geolocation.as_ref(),
            self.config.location_accuracy_threshold_m,
        );

        let sign_off = SignOffAttestation {
            id: SignOffId::new(uuid::Uuid::new_v4().to_string()),
            claim_id: claim_id.clone(),
            facility_id: submission.facility_id.clone(),
            worker_id: caller.worker_id.clone(),
            claim_day: submission.claim_day,
            visit_ids: submission.visit_ids.clone(),
            attestation_text: attestation_text(
                &submission,
                &caller.display_name,
                &facility_name,
                visits.len(),
            ),
            staff_name: submission.staff_name,
            staff_title: submission.staff_title,
            signature_text: submission.signature,
            signed_at: submission.signed_at.unwrap_or(now),
            geolocation: submission.geolocation,
            location_verified: verified,
            submitted_at: now,
        };

        let mut sign_offs = BTreeMap::new();
        sign_offs.insert(sign_off.id.clone(), sign_off.summary());

        let claim = Claim {
            id: claim_id,
            worker_id: caller.worker_id.clone(),
            worker_name: caller.display_name.clone(),
            facility_id: submission.facility_id,
            facility_name,
            claim_day: submission.claim_day,
            visit_ids: submission.visit_ids,
            visit_count: amounts.visit_count,
            per_visit_rate: amounts.per_visit_rate,
            per_day_flat_fee: amounts.per_day_flat_fee,
            total_amount: amounts.total_amount,
            status: ClaimStatus::Submitted,
            submitted_at: now,
            sign_offs,
        };

        Ok(SubmissionPlan {
            claim,
            sign_off,
            now,
        })
    }

    async fn run_hooks(&self, committed: &CommittedSubmission) {
        for hook in &self.hooks {
            if let Err(e) = hook.after_commit(committed).await {
                warn!(
                    hook = hook.name(),
                    claim_id = %committed.claim.id,
                    error = %e,
                    "Post-commit hook failed"
                );
            }
        }
    }

    async fn submit(
        &self,
        caller: CallerIdentity,
        request: SubmitClaimRequest,
    ) -> Result<SubmissionReceipt, LedgerError> {
        let submission = request.validate(&self.config)?;
        let claim_id = derive_claim_key(
            &caller.worker_id,
            submission.claim_day,
            &submission.facility_id,
        );
        Span::current().record("claim_id", field::display(&claim_id));

        // Visits first: a racer that sees them signed off is then certain
        // to see the claim committed with them.
        let visits = self.load_selection(&submission).await?;
        self.reject_replay(&claim_id, &submission)?;

        let ctx = EligibilityContext {
            worker_id: &caller.worker_id,
            facility_id: &submission.facility_id,
            claim_day: submission.claim_day,
        };
        validate_selection(&visits, &ctx)?;

        let now = self.clock.now();
        let plan = self.build_plan(&caller, submission, &visits, claim_id, now)?;

        let store = Arc::clone(&self.store);
        let max_attempts = self.config.max_commit_attempts;
        let span = Span::current();
        let committed = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            commit_with_retry(store.as_ref(), &plan, max_attempts)
        })
        .await
        .map_err(|e| LedgerError::Internal(format!("submission task failed: {e}")))??;

        info!(
            claim_id = %committed.claim.id,
            visits = committed.claim.visit_count,
            total_amount = committed.claim.total_amount,
            flagged = committed.flagged_visits().count(),
            "Claim submitted"
        );

        self.run_hooks(&committed).await;
        Ok(SubmissionReceipt::from(&committed))
    }
}

fn attestation_text(
    submission: &ValidatedSubmission,
    worker_name: &str,
    facility_name: &str,
    visit_count: usize,
) -> String {
    let signer = match &submission.staff_title {
        Some(title) => format!("{} ({})", submission.staff_name, title),
        None => submission.staff_name.clone(),
    };
    let facility = if facility_name.is_empty() {
        submission.facility_id.to_string()
    } else {
        facility_name.to_string()
    };
    format!(
        "I, {signer}, attest that {worker_name} visited {visit_count} resident(s) \
         at {facility} on {}.",
        submission.claim_day
    )
}

#[async_trait]
impl SettlementApi for SettlementService {
    async fn authenticate(
        &self,
        bearer_token: Option<&str>,
    ) -> Result<CallerIdentity, LedgerError> {
        self.verify_caller(bearer_token).await
    }

    async fn submit_claim(
        &self,
        bearer_token: Option<&str>,
        request: SubmitClaimRequest,
    ) -> Result<SubmissionReceipt, LedgerError> {
        let caller = self.verify_caller(bearer_token).await?;
        let span = info_span!(
            "claim_submission",
            worker_id = %caller.worker_id,
            facility_id = %request.facility_id.trim(),
            claim_day = %request.claim_day.trim(),
            claim_id = field::Empty,
        );
        let result = self.submit(caller, request).instrument(span.clone()).await;
        if let Err(e) = &result {
            let _entered = span.enter();
            match e {
                LedgerError::Validation(ValidationError::IneligibleSelection) => {
                    info!(code = e.code(), "Submission rejected: stale selection")
                }
                _ if e.kind() == ErrorKind::Internal || e.is_retryable() => {
                    warn!(code = e.code(), error = %e, "Submission failed")
                }
                _ => info!(code = e.code(), error = %e, "Submission rejected"),
            }
        }
        result
    }

    async fn get_claim(
        &self,
        bearer_token: Option<&str>,
        claim_id: &ClaimId,
    ) -> Result<Claim, LedgerError> {
        let caller = self.verify_caller(bearer_token).await?;
        match self.repository().claim(claim_id)? {
            Some(claim) if claim.worker_id == caller.worker_id => Ok(claim),
            _ => Err(LedgerError::ClaimNotFound(claim_id.clone())),
        }
    }
}
