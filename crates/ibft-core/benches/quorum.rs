//! Quorum benchmarks
//!
//! Quorum checks run on every received consensus message, so they sit on the
//! hot path of the engine:
//! - threshold derivation for growing totals
//! - `has_quorum` over validator sets of increasing size
//! - `has_prepare_quorum` with a full set of prepares

use std::sync::Arc;

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ibft_core::{
    quorum_threshold, sender_set, Address, BackendError, ConsensusMessage, ConsensusPhase, Height,
    SenderSet, ValidatorBackend, ValidatorManager, ValidatorWeightSet, VotingPower,
};
use num_bigint::BigUint;

struct FixedBackend {
    weights: ValidatorWeightSet,
}

#[async_trait]
impl ValidatorBackend for FixedBackend {
    async fn get_voting_powers(&self, _height: Height) -> Result<ValidatorWeightSet, BackendError> {
        Ok(self.weights.clone())
    }

    async fn get_miner_address(&self) -> Result<Address, BackendError> {
        Ok(address(0))
    }
}

fn address(i: u32) -> Address {
    Address::from(i.to_be_bytes())
}

fn manager(validators: u32) -> ValidatorManager {
    let weights = (0..validators)
        .map(|i| (address(i), BigUint::from(1_000_000u32 + i)))
        .collect();
    let backend = Arc::new(FixedBackend { weights });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime");
    runtime.block_on(async {
        let manager = ValidatorManager::new(backend).await.expect("manager");
        manager.initialize(1).await.expect("initialize");
        manager
    })
}

// ============ ARITHMETIC BENCHMARKS ============

fn bench_quorum_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("threshold");

    for bits in [64u32, 256, 1024].iter() {
        let total: VotingPower = BigUint::from(1u32) << *bits as usize;
        group.bench_with_input(BenchmarkId::new("bits", bits), &total, |b, total| {
            b.iter(|| quorum_threshold(black_box(total)))
        });
    }

    group.finish();
}

// ============ QUORUM CHECK BENCHMARKS ============

fn bench_has_quorum(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_quorum");

    for size in [4u32, 21, 100, 500].iter() {
        let manager = manager(*size);
        let senders: SenderSet = (0..*size).map(address).collect();
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("validators", size), &senders, |b, senders| {
            b.iter(|| manager.has_quorum(black_box(senders)))
        });
    }

    group.finish();
}

fn bench_has_prepare_quorum(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_prepare_quorum");

    for size in [4u32, 21, 100].iter() {
        let manager = manager(*size);
        let proposal = ConsensusMessage::new(address(0), 1, 0);
        let prepares: Vec<_> = (1..*size)
            .map(|i| ConsensusMessage::new(address(i), 1, 0))
            .collect();

        group.bench_with_input(BenchmarkId::new("validators", size), &prepares, |b, prepares| {
            b.iter(|| {
                manager.has_prepare_quorum(ConsensusPhase::Prepare, Some(&proposal), black_box(prepares))
            })
        });

        group.bench_with_input(BenchmarkId::new("sender_set", size), &prepares, |b, prepares| {
            b.iter(|| sender_set(black_box(prepares)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_quorum_threshold,
    bench_has_quorum,
    bench_has_prepare_quorum,
);

criterion_main!(benches);
