//! Raw `merge` throughput: how many individual node-pair merges per second,
//! independent of priority selection.
#![allow(clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rag_bench::{SizeTier, generate_volume};
use rag_core::{MomentFeatureManager, Rag, RagConfig};

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for (name, tier) in [("S", SizeTier::Small), ("M", SizeTier::Medium)] {
        group.bench_function(BenchmarkId::new("single_merge", name), |b| {
            b.iter_batched(
                || {
                    let (labels, probs) = generate_volume(&tier.config(42));
                    let rag: Rag<MomentFeatureManager> =
                        Rag::build(labels, probs, MomentFeatureManager, RagConfig::default()).expect("builds");
                    let edge = rag.live_edges().next().expect("at least one edge");
                    let (u, v) = rag.edge_endpoints(edge).expect("live edge has endpoints");
                    (rag, u, v)
                },
                |(mut rag, u, v)| {
                    let _ = rag.merge(u, v);
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
