//! # BLS Aggregation Benchmarks
//!
//! Per-round costs on the aggregator side:
//!
//! | Operation | Runs | Target |
//! |-----------|------|--------|
//! | Domain tag + message hash | once per round | < 10μs |
//! | Single signature verify | once per peer reply | < 2ms |
//! | Fold into accumulator | once per accepted reply | < 50μs |
//! | Aggregate verify | once per result check | < 5ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::RngCore;
use shared_types::{Address, BlsPublicKey, BlsSignature};
use sn_bls_aggregator::domain::accumulator::SignatureAccumulator;
use sn_bls_aggregator::domain::bls::{public_key, secret_key_from_ikm, sign};
use sn_bls_aggregator::{
    build_tag, message_hash, verify_bls, verify_bls_aggregate, Claim, ClaimKind, MessageHash,
    NetworkIdentity,
};
use std::time::Duration;

fn network() -> NetworkIdentity {
    NetworkIdentity::new(421614, Address::new([0x5f; 20]))
}

fn reward_claim() -> Claim {
    Claim::RewardBalance {
        address: Address::new([0xa1; 20]),
        amount: 5_000,
        height: 90,
    }
}

/// `count` signers over the same message hash.
fn signed_set(hash: &MessageHash, count: usize) -> Vec<(BlsPublicKey, BlsSignature)> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let mut ikm = [0u8; 32];
            rng.fill_bytes(&mut ikm);
            let sk = secret_key_from_ikm(&ikm).expect("32-byte ikm");
            (public_key(&sk), sign(&sk, hash))
        })
        .collect()
}

// ============================================================================
// Hashing
// ============================================================================

fn bench_message_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("bls-hashing");
    let network = network();
    let claim = reward_claim();

    group.bench_function("build_tag", |b| {
        b.iter(|| black_box(build_tag(ClaimKind::RewardBalance, &network)))
    });

    let tag = build_tag(ClaimKind::RewardBalance, &network);
    group.bench_function("message_hash_reward", |b| {
        b.iter(|| black_box(message_hash(&tag, &claim)))
    });

    group.finish();
}

// ============================================================================
// Verification and folding
// ============================================================================

fn bench_reply_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("bls-verification");
    group.measurement_time(Duration::from_secs(10));

    let tag = build_tag(ClaimKind::RewardBalance, &network());
    let hash = message_hash(&tag, &reward_claim());
    let set = signed_set(&hash, 1);
    let (key, signature) = set[0];

    group.bench_function("verify_single_reply", |b| {
        b.iter(|| black_box(verify_bls(&hash, &signature, &key)))
    });

    for size in [10usize, 100, 900] {
        let set = signed_set(&hash, size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("fold_replies", size), &set, |b, set| {
            b.iter(|| {
                let mut accumulator = SignatureAccumulator::new();
                for (key, signature) in set {
                    accumulator
                        .fold(*key, signature)
                        .expect("distinct signers fold");
                }
                black_box(accumulator.finish())
            })
        });

        let mut accumulator = SignatureAccumulator::new();
        for (key, signature) in &set {
            accumulator
                .fold(*key, signature)
                .expect("distinct signers fold");
        }
        let (aggregate, signers) = accumulator.finish();

        group.bench_with_input(
            BenchmarkId::new("verify_aggregate", size),
            &signers,
            |b, signers| b.iter(|| black_box(verify_bls_aggregate(&hash, &aggregate, signers))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_message_hashing, bench_reply_verification);

criterion_main!(benches);
