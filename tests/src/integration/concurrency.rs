//! # Racing Submitters
//!
//! Many tasks on a multi-threaded runtime submitting against one store.
//! The optimistic transaction must let exactly one writer through per
//! claim key and per member-month, and the losers must be told why.

#[cfg(test)]
mod tests {
    use crate::fixtures::{request, token_for, TestLedger, W1_TOKEN};
    use pl_01_settlement_ledger::{ClaimStatus, LedgerError, SettlementApi, VisitStatus};
    use shared_types::{MemberId, MonthKey};
    use std::sync::Arc;

    const RACERS: usize = 16;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_identical_submissions_create_one_claim() {
        let ledger = Arc::new(TestLedger::new());
        ledger.seed("v-a", "w1", "F1", "A", "2025-01-10");
        ledger.seed("v-b", "w1", "F1", "B", "2025-01-10");

        let mut handles = Vec::with_capacity(RACERS);
        for _ in 0..RACERS {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger
                    .service
                    .submit_claim(Some(W1_TOKEN), request("F1", "2025-01-10", &["v-a", "v-b"]))
                    .await
            }));
        }

        let mut winners = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(receipt) => winners.push(receipt),
                Err(LedgerError::ClaimAlreadyExists { status, .. }) => {
                    assert_eq!(status, ClaimStatus::Submitted);
                }
                Err(other) => panic!("unexpected rejection: {other:?}"),
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].total_amount, 110);

        let claims = ledger.repo.claims().unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].id, winners[0].claim_id);
        assert_eq!(ledger.repo.sign_offs().unwrap().len(), 1);
        assert_eq!(ledger.repo.monthly_locks().unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_workers_racing_for_one_member_month() {
        let ledger = Arc::new(TestLedger::new());
        // Three workers each visited member A at their own facility.
        for worker in 1..=3 {
            ledger.seed(
                &format!("v-w{worker}"),
                &format!("w{worker}"),
                &format!("F{worker}"),
                "A",
                &format!("2025-01-{:02}", 10 + worker),
            );
        }

        let mut handles = Vec::new();
        for worker in 1..=3usize {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                let facility = format!("F{worker}");
                let day = format!("2025-01-{:02}", 10 + worker);
                let visit = format!("v-w{worker}");
                ledger
                    .service
                    .submit_claim(
                        Some(token_for(worker)),
                        request(&facility, &day, &[visit.as_str()]),
                    )
                    .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(LedgerError::MonthlyMemberVisitAlreadyCompleted { conflicts }) => {
                    assert_eq!(conflicts.len(), 1);
                    assert_eq!(conflicts[0].member_id, MemberId::new("A"));
                }
                Err(other) => panic!("unexpected rejection: {other:?}"),
            }
        }
        assert_eq!(winners, 1);

        let lock = ledger
            .repo
            .monthly_lock(&MemberId::new("A"), MonthKey::new(2025, 1).unwrap())
            .unwrap()
            .unwrap();
        let owner = ledger.visit(lock.visit_id.as_str());
        assert_eq!(owner.status, VisitStatus::SignedOff);
        assert_eq!(owner.claim_id, Some(lock.claim_id.clone()));

        let signed_off = (1..=3)
            .map(|w| ledger.visit(&format!("v-w{w}")))
            .filter(|v| v.status == VisitStatus::SignedOff)
            .count();
        assert_eq!(signed_off, 1);
        assert_eq!(ledger.repo.claims().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_disjoint_submissions_all_commit() {
        let ledger = Arc::new(TestLedger::new());
        for n in 0..RACERS {
            ledger.seed(
                &format!("v-{n}"),
                "w1",
                &format!("F{n}"),
                &format!("M{n}"),
                "2025-01-10",
            );
        }

        let mut handles = Vec::with_capacity(RACERS);
        for n in 0..RACERS {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                let facility = format!("F{n}");
                let visit = format!("v-{n}");
                ledger
                    .service
                    .submit_claim(
                        Some(W1_TOKEN),
                        request(&facility, "2025-01-10", &[visit.as_str()]),
                    )
                    .await
            }));
        }

        for handle in handles {
            let receipt = handle.await.unwrap().unwrap();
            assert_eq!(receipt.total_amount, 65);
        }
        assert_eq!(ledger.repo.claims().unwrap().len(), RACERS);
        assert_eq!(ledger.repo.monthly_locks().unwrap().len(), RACERS);
        for n in 0..RACERS {
            assert_eq!(ledger.visit(&format!("v-{n}")).status, VisitStatus::SignedOff);
        }
    }
}
