//! # Settlement Ledger Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | Claim key | SHA-256 facility digest + key formatting |
//! | Request validation | Field checks and duplicate collapse |
//! | Submission | Authenticate, eligibility, optimistic commit, relay |

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use ledger_tests::fixtures::{request, TestLedger, W1_TOKEN};
use pl_01_settlement_ledger::{derive_claim_key, LedgerConfig, SettlementApi};
use shared_types::{ClaimDay, FacilityId, WorkerId};

fn bench_claim_key(c: &mut Criterion) {
    let worker = WorkerId::new("w-000123");
    let facility = FacilityId::new("rcfe-sunny-acres-0042");
    let day = ClaimDay::parse("2025-01-10").unwrap();

    c.bench_function("claim_key_derive", |b| {
        b.iter(|| derive_claim_key(black_box(&worker), black_box(day), black_box(&facility)))
    });
}

fn bench_request_validation(c: &mut Criterion) {
    let config = LedgerConfig::default();
    let mut group = c.benchmark_group("request_validation");

    for size in [1usize, 10, 100] {
        let ids: Vec<String> = (0..size).map(|i| format!("visit-{i:05}")).collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        let submission = request("F1", "2025-01-10", &ids);

        group.bench_with_input(BenchmarkId::from_parameter(size), &submission, |b, s| {
            b.iter(|| black_box(s.clone().validate(&config)).is_ok())
        });
    }
    group.finish();
}

fn bench_submission(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    let mut group = c.benchmark_group("submission");

    for size in [1usize, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            // Each iteration needs fresh draft visits.
            b.iter_batched(
                || {
                    let ledger = TestLedger::new();
                    let ids: Vec<String> = (0..size).map(|i| format!("v-{i}")).collect();
                    for (i, id) in ids.iter().enumerate() {
                        ledger.seed(id, "w1", "F1", &format!("M{i}"), "2025-01-10");
                    }
                    (ledger, ids)
                },
                |(ledger, ids)| {
                    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
                    runtime
                        .block_on(
                            ledger
                                .service
                                .submit_claim(Some(W1_TOKEN), request("F1", "2025-01-10", &ids)),
                        )
                        .unwrap()
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_claim_key,
    bench_request_validation,
    bench_submission
);
criterion_main!(benches);
