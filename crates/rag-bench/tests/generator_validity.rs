//! Tests that generated volumes are well-formed across all size tiers and
//! seeds.
#![allow(clippy::expect_used)]

use rag_bench::{SizeTier, generate_volume};

fn assert_well_formed(shape: &[usize], label: &str) {
    let config = rag_bench::GeneratorConfig {
        seed: 42,
        shape: shape.to_vec(),
        blocks_per_axis: 4,
    };
    let (labels, probs) = generate_volume(&config);
    assert_eq!(labels.shape(), shape, "{label}: label shape mismatch");
    assert_eq!(probs.shape(), shape, "{label}: probability shape mismatch");
    assert!(
        labels.iter().all(|&l| l >= 1),
        "{label}: labels must be positive"
    );
    assert!(
        probs.iter().all(|&p| (0.0..=1.0).contains(&p)),
        "{label}: probabilities must lie in [0, 1]"
    );
}

#[test]
fn generated_small_is_well_formed() {
    assert_well_formed(&[16, 16], "Small");
}

#[test]
fn generated_medium_is_well_formed() {
    assert_well_formed(&[64, 64], "Medium");
}

#[test]
fn generated_large_is_well_formed() {
    assert_well_formed(&[32, 32, 32], "Large");
}

#[test]
fn generated_xlarge_is_well_formed() {
    assert_well_formed(&[64, 64, 16], "XLarge");
}

#[test]
fn generation_is_deterministic() {
    let config = SizeTier::Small.config(42);
    let (labels1, probs1) = generate_volume(&config);
    let (labels2, probs2) = generate_volume(&config);
    assert_eq!(labels1, labels2, "same seed must produce identical labels");
    assert_eq!(probs1, probs2, "same seed must produce identical probabilities");
}

#[test]
fn different_seeds_produce_different_volumes() {
    let (labels1, probs1) = generate_volume(&SizeTier::Small.config(42));
    let (labels2, probs2) = generate_volume(&SizeTier::Small.config(43));
    assert!(
        labels1 != labels2 || probs1 != probs2,
        "different seeds must produce different output"
    );
}

#[test]
fn rag_builds_from_generated_volume() {
    let (labels, probs) = generate_volume(&SizeTier::Medium.config(42));
    let rag = rag_core::Rag::build(
        labels.clone(),
        probs,
        rag_core::MomentFeatureManager,
        rag_core::RagConfig::default(),
    )
    .expect("rag should build from generated volume");
    rag_bench::correctness::check_graph_invariants(&labels, &rag)
        .expect("generated volume should satisfy graph invariants");
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(30))]

        #[test]
        fn generated_volumes_always_build(seed in 0u64..10_000) {
            let (labels, probs) = generate_volume(&SizeTier::Small.config(seed));
            let rag = rag_core::Rag::build(
                labels.clone(),
                probs,
                rag_core::MomentFeatureManager,
                rag_core::RagConfig::default(),
            )
            .expect("rag build must succeed");
            prop_assert!(rag_bench::correctness::check_graph_invariants(&labels, &rag).is_ok());
        }
    }
}
