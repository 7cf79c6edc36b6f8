//! # Flagged-Visit Notifications
//!
//! `FlaggedVisitRelay` is the post-commit hook that hands each flagged
//! visit of a committed submission to a `NotificationDispatcher`. One
//! attempt per visit; failures are logged and counted, never retried.

use crate::domain::errors::{DispatchError, HookError};
use crate::domain::flags::classify_urgency;
use crate::domain::value_objects::{CommittedSubmission, Urgency};
use crate::ports::outbound::{FlaggedVisitNotice, NotificationDispatcher, PostCommitHook};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Dispatcher that only records notices in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDispatcher;

#[async_trait]
impl NotificationDispatcher for TracingDispatcher {
    async fn dispatch(&self, notice: &FlaggedVisitNotice) -> Result<(), DispatchError> {
        match notice.urgency {
            Urgency::Urgent => warn!(
                visit_id = %notice.visit_id,
                member_id = %notice.member_id,
                facility_id = %notice.facility_id,
                claim_id = %notice.claim_id,
                reasons = ?notice.reasons,
                "Urgent flagged visit"
            ),
            Urgency::Routine => info!(
                visit_id = %notice.visit_id,
                member_id = %notice.member_id,
                facility_id = %notice.facility_id,
                claim_id = %notice.claim_id,
                reasons = ?notice.reasons,
                "Flagged visit"
            ),
        }
        Ok(())
    }
}

pub struct FlaggedVisitRelay {
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl FlaggedVisitRelay {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Notices for every flagged visit, in submission order.
    pub fn notices(committed: &CommittedSubmission) -> Vec<FlaggedVisitNotice> {
        committed
            .flagged_visits()
            .map(|visit| FlaggedVisitNotice {
                visit_id: visit.id.clone(),
                member_id: visit.member_id.clone(),
                member_name: visit.member_name.clone(),
                facility_id: visit.facility_id.clone(),
                facility_name: visit.facility_name.clone(),
                claim_id: committed.claim.id.clone(),
                urgency: classify_urgency(visit),
                reasons: visit.flag_reasons.clone(),
                payload: visit.raw_payload.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl PostCommitHook for FlaggedVisitRelay {
    fn name(&self) -> &'static str {
        "flagged_visit_relay"
    }

    async fn after_commit(&self, committed: &CommittedSubmission) -> Result<(), HookError> {
        let notices = Self::notices(committed);
        let mut failed = 0;
        for notice in &notices {
            if let Err(e) = self.dispatcher.dispatch(notice).await {
                failed += 1;
                warn!(
                    visit_id = %notice.visit_id,
                    claim_id = %notice.claim_id,
                    error = %e,
                    "Flagged-visit notification failed"
                );
            }
        }
        if failed > 0 {
            return Err(HookError::PartialDispatch {
                attempted: notices.len(),
                failed,
            });
        }
        Ok(())
    }
}
