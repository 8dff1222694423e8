//! `agglomerate` and `remove_inclusions` benchmarks across size tiers and
//! thresholds.
#![allow(clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rag_bench::{SizeTier, generate_volume};
use rag_core::{BoundaryMedian, MomentFeatureManager, Rag, RagConfig};

fn build(tier: SizeTier) -> Rag<MomentFeatureManager> {
    let (labels, probs) = generate_volume(&tier.config(42));
    Rag::build(labels, probs, MomentFeatureManager, RagConfig::default()).expect("builds")
}

fn bench_agglomerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("agglomerate");

    for (name, tier) in [
        ("S", SizeTier::Small),
        ("M", SizeTier::Medium),
        ("L", SizeTier::Large),
    ] {
        for threshold in [0.3, 0.5, 0.7] {
            group.bench_function(BenchmarkId::new(format!("t_{threshold}"), name), |b| {
                b.iter_batched(
                    || build(tier),
                    |mut rag| {
                        let _ = rag.agglomerate(threshold, &BoundaryMedian);
                    },
                    criterion::BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_remove_inclusions(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_inclusions");
    group.sample_size(20);

    for (name, tier) in [("S", SizeTier::Small), ("M", SizeTier::Medium)] {
        group.bench_function(BenchmarkId::new("remove_inclusions", name), |b| {
            b.iter_batched(
                || build(tier),
                |mut rag| {
                    let _ = rag.remove_inclusions();
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_agglomerate, bench_remove_inclusions);
criterion_main!(benches);
