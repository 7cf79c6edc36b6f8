//! # Settlement Scenarios
//!
//! Full submissions through `SettlementApi` against the in-memory store,
//! asserting on committed state rather than on return values alone.

#[cfg(test)]
mod tests {
    use crate::fixtures::{request, TestLedger, SUSPENDED_TOKEN, W1_TOKEN, W2_TOKEN};
    use pl_01_settlement_ledger::{
        ClaimStatus, LedgerError, LedgerTxn, LockConflict, SettlementApi, SubmissionReceipt,
        Urgency, ValidationError, VisitStatus,
    };
    use serde_json::json;
    use shared_types::{MemberId, MonthKey, TimeSource, VisitId};

    fn january() -> MonthKey {
        MonthKey::new(2025, 1).unwrap()
    }

    /// W1 visits members A and B at F1 on 2025-01-10 and submits both.
    async fn submit_first_day(ledger: &TestLedger) -> SubmissionReceipt {
        ledger.seed("v-a1", "w1", "F1", "A", "2025-01-10");
        ledger.seed("v-b1", "w1", "F1", "B", "2025-01-10");
        ledger
            .service
            .submit_claim(Some(W1_TOKEN), request("F1", "2025-01-10", &["v-a1", "v-b1"]))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_two_visits_lock_both_members() {
        let ledger = TestLedger::new();
        let receipt = submit_first_day(&ledger).await;

        assert!(receipt.success);
        assert_eq!(receipt.total_visits, 2);
        assert_eq!(receipt.total_amount, 110);
        assert_eq!(receipt.status, ClaimStatus::Submitted);

        for (member, visit) in [("A", "v-a1"), ("B", "v-b1")] {
            let lock = ledger
                .repo
                .monthly_lock(&MemberId::new(member), january())
                .unwrap()
                .unwrap();
            assert_eq!(lock.visit_id, VisitId::new(visit));
            assert_eq!(lock.claim_id, receipt.claim_id);

            let stored = ledger.visit(visit);
            assert_eq!(stored.status, VisitStatus::SignedOff);
            assert_eq!(stored.claim_id.as_ref(), Some(&receipt.claim_id));
            assert_eq!(stored.claim_status, Some(ClaimStatus::Submitted));
            assert_eq!(
                stored.sign_off.as_ref().map(|s| &s.sign_off_id),
                Some(&receipt.sign_off_id)
            );
        }

        let claim = ledger.repo.claim(&receipt.claim_id).unwrap().unwrap();
        assert_eq!(claim.visit_ids, vec![VisitId::new("v-a1"), VisitId::new("v-b1")]);
        assert_eq!(claim.per_visit_rate, 45);
        assert_eq!(claim.per_day_flat_fee, 20);
        assert!(claim.sign_offs.contains_key(&receipt.sign_off_id));

        let attestation = ledger.repo.sign_off(&receipt.sign_off_id).unwrap().unwrap();
        assert_eq!(attestation.claim_id, receipt.claim_id);
        assert_eq!(attestation.visit_ids, claim.visit_ids);
        assert_eq!(attestation.signed_at, ledger.clock.now());
    }

    #[tokio::test]
    async fn test_exact_retry_is_claim_already_exists() {
        let ledger = TestLedger::new();
        let receipt = submit_first_day(&ledger).await;
        let commits = ledger.store.commit_count();

        let err = ledger
            .service
            .submit_claim(Some(W1_TOKEN), request("F1", "2025-01-10", &["v-a1", "v-b1"]))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::ClaimAlreadyExists {
                claim_id: receipt.claim_id,
                status: ClaimStatus::Submitted,
            }
        );
        assert_eq!(ledger.store.commit_count(), commits);
        assert_eq!(ledger.repo.claims().unwrap().len(), 1);
        assert_eq!(ledger.repo.sign_offs().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_of_paid_claim_reports_paid() {
        let ledger = TestLedger::new();
        let receipt = submit_first_day(&ledger).await;

        let store = ledger.repo.store().clone();
        let mut txn = LedgerTxn::begin(store.as_ref()).unwrap();
        let mut claim = txn.claim(&receipt.claim_id).unwrap().unwrap();
        claim.status = ClaimStatus::Paid;
        txn.put_claim(&claim).unwrap();
        txn.commit().unwrap();

        let err = ledger
            .service
            .submit_claim(Some(W1_TOKEN), request("F1", "2025-01-10", &["v-a1", "v-b1"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::ClaimAlreadyExists {
                status: ClaimStatus::Paid,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_monthly_conflict_aborts_whole_submission() {
        let ledger = TestLedger::new();
        submit_first_day(&ledger).await;
        ledger.seed("v-a2", "w1", "F2", "A", "2025-01-20");
        ledger.seed("v-c2", "w1", "F2", "C", "2025-01-20");
        let keys = ledger.store.len();
        let commits = ledger.store.commit_count();

        let err = ledger
            .service
            .submit_claim(Some(W1_TOKEN), request("F2", "2025-01-20", &["v-a2", "v-c2"]))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::MonthlyMemberVisitAlreadyCompleted {
                conflicts: vec![LockConflict {
                    member_id: MemberId::new("A"),
                    member_name: "Member A".to_string(),
                    existing_visit_id: VisitId::new("v-a1"),
                }],
            }
        );

        // Nothing from the aborted submission is visible.
        assert_eq!(ledger.store.len(), keys);
        assert_eq!(ledger.store.commit_count(), commits);
        assert!(ledger
            .repo
            .monthly_lock(&MemberId::new("C"), january())
            .unwrap()
            .is_none());
        assert_eq!(ledger.visit("v-c2").status, VisitStatus::Draft);
        assert_eq!(ledger.visit("v-a2").status, VisitStatus::Draft);
        assert_eq!(ledger.repo.claims().unwrap().len(), 1);
        assert!(ledger.dispatcher.notices().is_empty());
    }

    #[tokio::test]
    async fn test_next_month_is_free_again() {
        let ledger = TestLedger::new();
        submit_first_day(&ledger).await;
        ledger.seed("v-a3", "w1", "F1", "A", "2025-02-03");

        let receipt = ledger
            .service
            .submit_claim(Some(W1_TOKEN), request("F1", "2025-02-03", &["v-a3"]))
            .await
            .unwrap();
        assert_eq!(receipt.total_amount, 65);

        let february = MonthKey::new(2025, 2).unwrap();
        let lock = ledger
            .repo
            .monthly_lock(&MemberId::new("A"), february)
            .unwrap()
            .unwrap();
        assert_eq!(lock.visit_id, VisitId::new("v-a3"));
        assert_eq!(ledger.repo.monthly_locks().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_signed_off_visit_in_new_selection_is_ineligible() {
        let ledger = TestLedger::new();
        submit_first_day(&ledger).await;
        // A forgotten visit added to the same day: amend is not supported.
        ledger.seed("v-c1", "w1", "F1", "C", "2025-01-10");
        let commits = ledger.store.commit_count();

        let err = ledger
            .service
            .submit_claim(Some(W1_TOKEN), request("F1", "2025-01-10", &["v-a1", "v-c1"]))
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::from(ValidationError::IneligibleSelection));
        assert_eq!(ledger.store.commit_count(), commits);
        assert_eq!(ledger.visit("v-c1").status, VisitStatus::Draft);
    }

    #[tokio::test]
    async fn test_foreign_visit_is_ineligible() {
        let ledger = TestLedger::new();
        ledger.seed("v-w2", "w2", "F1", "A", "2025-01-10");

        let err = ledger
            .service
            .submit_claim(Some(W1_TOKEN), request("F1", "2025-01-10", &["v-w2"]))
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::from(ValidationError::IneligibleSelection));

        // The owner can still submit it.
        ledger
            .service
            .submit_claim(Some(W2_TOKEN), request("F1", "2025-01-10", &["v-w2"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_selection_never_touches_store() {
        let ledger = TestLedger::new();
        let err = ledger
            .service
            .submit_claim(Some(W1_TOKEN), request("F1", "2025-01-10", &[]))
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::from(ValidationError::EmptySelection));
        assert_eq!(ledger.store.commit_count(), 0);
        assert!(ledger.store.is_empty());
    }

    #[tokio::test]
    async fn test_suspended_worker_writes_nothing() {
        let ledger = TestLedger::new();
        ledger.seed("v-x", "w9", "F1", "A", "2025-01-10");
        let commits = ledger.store.commit_count();

        let err = ledger
            .service
            .submit_claim(Some(SUSPENDED_TOKEN), request("F1", "2025-01-10", &["v-x"]))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Forbidden(_)));
        assert_eq!(ledger.store.commit_count(), commits);
    }

    #[tokio::test]
    async fn test_flagged_visits_reach_dispatcher() {
        let ledger = TestLedger::new();
        ledger.seed_with_payload(
            "v-crit",
            "w1",
            "F1",
            "A",
            "2025-01-10",
            json!({ "concerns": [{ "severity": "Critical", "note": "fall risk" }] }),
        );
        ledger.seed_with_payload(
            "v-act",
            "w1",
            "F1",
            "B",
            "2025-01-10",
            json!({ "actionRequired": true }),
        );
        ledger.seed("v-calm", "w1", "F1", "C", "2025-01-10");

        let receipt = ledger
            .service
            .submit_claim(
                Some(W1_TOKEN),
                request("F1", "2025-01-10", &["v-crit", "v-act", "v-calm"]),
            )
            .await
            .unwrap();
        assert_eq!(receipt.total_amount, 155);

        let notices = ledger.dispatcher.notices();
        assert_eq!(notices.len(), 2);

        assert_eq!(notices[0].visit_id, VisitId::new("v-crit"));
        assert_eq!(notices[0].urgency, Urgency::Urgent);
        assert_eq!(notices[0].reasons, vec!["critical_concern".to_string()]);
        assert_eq!(notices[0].claim_id, receipt.claim_id);
        assert_eq!(notices[0].payload["concerns"][0]["note"], "fall risk");

        assert_eq!(notices[1].visit_id, VisitId::new("v-act"));
        assert_eq!(notices[1].urgency, Urgency::Routine);

        assert!(ledger.visit("v-crit").flagged);
        assert!(!ledger.visit("v-calm").flagged);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_then_recovery() {
        let ledger = TestLedger::new();
        ledger.seed("v-a", "w1", "F1", "A", "2025-01-10");
        let commits = ledger.store.commit_count();

        ledger.store.inject_commit_conflicts(3);
        let err = ledger
            .service
            .submit_claim(Some(W1_TOKEN), request("F1", "2025-01-10", &["v-a"]))
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::Transient { attempts: 3 });
        assert!(err.is_retryable());
        assert_eq!(ledger.store.commit_count(), commits);
        assert_eq!(ledger.visit("v-a").status, VisitStatus::Draft);

        // Two conflicts fit inside the attempt budget.
        ledger.store.inject_commit_conflicts(2);
        let receipt = ledger
            .service
            .submit_claim(Some(W1_TOKEN), request("F1", "2025-01-10", &["v-a"]))
            .await
            .unwrap();
        assert_eq!(receipt.total_amount, 65);
        assert_eq!(ledger.store.commit_count(), commits + 1);
    }

    #[tokio::test]
    async fn test_claims_are_private_to_their_worker() {
        let ledger = TestLedger::new();
        let receipt = submit_first_day(&ledger).await;

        let claim = ledger
            .service
            .get_claim(Some(W1_TOKEN), &receipt.claim_id)
            .await
            .unwrap();
        assert_eq!(claim.total_amount, 110);

        let err = ledger
            .service
            .get_claim(Some(W2_TOKEN), &receipt.claim_id)
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::ClaimNotFound(receipt.claim_id));
    }
}

#[cfg(test)]
mod properties {
    //! Random submission sequences keep the monthly uniqueness rule.

    use crate::fixtures::{request, token_for, TestLedger};
    use pl_01_settlement_ledger::{SettlementApi, VisitStatus};
    use proptest::prelude::*;
    use shared_types::{MemberId, MonthKey};
    use std::collections::HashMap;

    /// (worker 1..=3, member index, month 1..=2, day 1..=28)
    fn submission() -> impl Strategy<Value = (usize, usize, u32, u32)> {
        (1usize..=3, 0usize..4, 1u32..=2, 1u32..=28)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_one_signed_off_visit_per_member_month(
            ops in prop::collection::vec(submission(), 1..16)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let ledger = TestLedger::new();
                for (n, (worker, member, month, day)) in ops.iter().enumerate() {
                    let visit_id = format!("v-{n}");
                    let facility = format!("F{worker}");
                    let day = format!("2025-{month:02}-{day:02}");
                    ledger.seed(
                        &visit_id,
                        &format!("w{worker}"),
                        &facility,
                        &format!("M{member}"),
                        &day,
                    );
                    // Rejections are expected; only committed state matters.
                    let _ = ledger
                        .service
                        .submit_claim(
                            Some(token_for(*worker)),
                            request(&facility, &day, &[visit_id.as_str()]),
                        )
                        .await;
                }

                let mut billed: HashMap<(String, MonthKey), Vec<String>> = HashMap::new();
                for n in 0..ops.len() {
                    let visit = ledger.visit(&format!("v-{n}"));
                    if visit.status == VisitStatus::SignedOff {
                        billed
                            .entry((visit.member_id.to_string(), visit.month_key()))
                            .or_default()
                            .push(visit.id.to_string());
                    }
                }

                for ((member, month), visits) in &billed {
                    prop_assert_eq!(visits.len(), 1, "{} billed twice in {}", member, month);
                    let lock = ledger
                        .repo
                        .monthly_lock(&MemberId::new(member.as_str()), *month)
                        .unwrap()
                        .unwrap();
                    prop_assert_eq!(lock.visit_id.to_string(), visits[0].clone());
                }
                prop_assert_eq!(ledger.repo.monthly_locks().unwrap().len(), billed.len());

                for claim in ledger.repo.claims().unwrap() {
                    prop_assert_eq!(
                        claim.total_amount,
                        u64::from(claim.visit_count) * 45 + 20
                    );
                }
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
