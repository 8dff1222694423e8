//! Property-based and concrete-scenario tests for the RAG's merge
//! invariants and the concrete scenarios from the design notes (a toy
//! 2x2 merge, an inclusion, an exclusion pair, UCM round-tripping).
#![allow(clippy::expect_used)]

use std::collections::{HashMap, HashSet};

use ndarray::ArrayD;
use proptest::prelude::*;
use rag_core::{BoundaryMedian, LabelVolume, MomentFeatureManager, ProbabilityVolume, Rag, RagConfig};

const SHAPE: [usize; 2] = [4, 4];
const NUM_LABELS: i64 = 4;

fn arb_grid() -> impl Strategy<Value = (Vec<i64>, Vec<f64>)> {
    let voxels: usize = SHAPE.iter().product();
    (
        prop::collection::vec(1..=NUM_LABELS, voxels),
        prop::collection::vec(0.0f64..1.0, voxels),
    )
}

fn build(labels: Vec<i64>, probs: Vec<f64>) -> Rag<MomentFeatureManager> {
    let label_volume: LabelVolume = ArrayD::from_shape_vec(ndarray::IxDyn(&SHAPE), labels).expect("shape");
    let prob_volume: ProbabilityVolume = ArrayD::from_shape_vec(ndarray::IxDyn(&SHAPE), probs).expect("shape");
    Rag::build(label_volume, prob_volume, MomentFeatureManager, RagConfig::default()).expect("builds")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// (I1) Every node's voxel count is positive, and the sum across all
    /// live nodes equals the total voxel count of the volume.
    #[test]
    fn total_voxel_count_is_conserved((labels, probs) in arb_grid()) {
        let voxels: u64 = SHAPE.iter().product::<usize>() as u64;
        let rag = build(labels, probs);
        let total: u64 = rag.live_nodes().map(|n| rag.node_voxel_count(n)).sum();
        prop_assert_eq!(total, voxels);
    }

    /// (P3) `agglomerate(t)` is idempotent: running it again performs no
    /// further merges and the segmentation is unchanged.
    #[test]
    fn agglomerate_is_idempotent((labels, probs) in arb_grid()) {
        let mut rag = build(labels, probs);
        rag.agglomerate(0.5, &BoundaryMedian);
        let seg_after_first = rag.get_segmentation();

        let report_second = rag.agglomerate(0.5, &BoundaryMedian);
        let seg_after_second = rag.get_segmentation();

        prop_assert_eq!(report_second.merges, 0);
        prop_assert_eq!(seg_after_first, seg_after_second);
    }

    /// (P4) Monotonicity: agglomerating to t1 then t2 (t1 < t2) yields the
    /// same partition as agglomerating directly to t2.
    #[test]
    fn agglomerate_is_monotonic((labels, probs) in arb_grid()) {
        let mut staged = build(labels.clone(), probs.clone());
        staged.agglomerate(0.3, &BoundaryMedian);
        staged.agglomerate(0.7, &BoundaryMedian);

        let mut direct = build(labels, probs);
        direct.agglomerate(0.7, &BoundaryMedian);

        prop_assert_eq!(staged.get_segmentation(), direct.get_segmentation());
    }

    /// (I2/I3) The edge set after construction connects only nodes that
    /// actually border each other, and every edge's boundary count is
    /// positive.
    #[test]
    fn edges_have_positive_boundary_counts((labels, probs) in arb_grid()) {
        let rag = build(labels, probs);
        for edge in rag.live_edges() {
            prop_assert!(rag.edge_boundary_count(edge) > 0);
            let (u, v) = rag.edge_endpoints(edge).expect("live edge has endpoints");
            prop_assert_ne!(u, v);
        }
    }
}

// ---------------------------------------------------------------------------
// Concrete scenarios (design notes S1-S6)
// ---------------------------------------------------------------------------

fn grid(shape: &[usize], values: Vec<i64>) -> LabelVolume {
    ArrayD::from_shape_vec(ndarray::IxDyn(shape), values).expect("shape matches")
}

fn fgrid(shape: &[usize], values: Vec<f64>) -> ProbabilityVolume {
    ArrayD::from_shape_vec(ndarray::IxDyn(shape), values).expect("shape matches")
}

/// S1: a 2x2 toy grid, boundary-median priority, threshold 0.5.
#[test]
fn toy_2x2_merge_collapses_only_the_low_probability_boundary() {
    let labels = grid(&[2, 2], vec![1, 2, 3, 4]);
    let probs = fgrid(&[2, 2], vec![0.1, 0.9, 0.8, 0.2]);

    let mut rag = Rag::build(labels, probs, MomentFeatureManager, RagConfig::default()).expect("builds");
    rag.agglomerate(0.5, &BoundaryMedian);
    let seg = rag.get_segmentation();

    let a = seg[[0, 0]];
    let b = seg[[0, 1]];
    let c = seg[[1, 0]];
    let d = seg[[1, 1]];
    assert_eq!(c, d, "the low-probability boundary between 3 and 4 should merge");
    assert_ne!(a, b);
    assert_ne!(a, c);
}

/// S2: a single enclosed voxel should be absorbed by `remove_inclusions`.
#[test]
fn inclusion_is_absorbed_by_its_sole_neighbor() {
    #[rustfmt::skip]
    let values = vec![
        1, 1, 1,
        1, 2, 1,
        1, 1, 1,
    ];
    let labels = grid(&[3, 3], values);
    let probs = fgrid(&[3, 3], vec![0.5; 9]);

    let mut rag = Rag::build(labels, probs, MomentFeatureManager, RagConfig::default()).expect("builds");
    let nodes_before = rag.node_count();
    let report = rag.remove_inclusions();
    assert_eq!(report.merged, 1);
    assert_eq!(rag.node_count(), nodes_before - 1);

    let seg = rag.get_segmentation();
    let distinct: HashSet<i64> = seg.iter().copied().collect();
    assert_eq!(distinct.len(), 1, "the enclosed voxel should now share its neighbor's label");
}

/// S3: two excluded nodes with matching nonzero tags never merge, even at
/// threshold +infinity.
#[test]
fn exclusion_pair_never_merges() {
    let labels = grid(&[1, 3], vec![1, 2, 3]);
    let probs = fgrid(&[1, 3], vec![0.1, 0.1, 0.1]);
    let exclusion = grid(&[1, 3], vec![7, 7, 0]);

    let config = RagConfig {
        exclusion: Some(exclusion),
        ..RagConfig::default()
    };
    let mut rag = Rag::build(labels, probs, MomentFeatureManager, config).expect("builds");
    rag.agglomerate(f64::INFINITY, &BoundaryMedian);

    let seg = rag.get_segmentation();
    assert_ne!(seg[[0, 0]], seg[[0, 1]], "nodes sharing exclusion tag 7 must stay distinct");
}

/// (P7) After `remove_inclusions`, no live node has exactly one neighbor.
#[test]
fn remove_inclusions_reaches_fixpoint() {
    #[rustfmt::skip]
    let values = vec![
        1, 1, 1, 1, 1,
        1, 2, 2, 2, 1,
        1, 2, 3, 2, 1,
        1, 2, 2, 2, 1,
        1, 1, 1, 1, 1,
    ];
    let labels = grid(&[5, 5], values);
    let probs = fgrid(&[5, 5], vec![0.5; 25]);

    let mut rag = Rag::build(labels, probs, MomentFeatureManager, RagConfig::default()).expect("builds");
    rag.remove_inclusions();

    for node in rag.live_nodes() {
        assert_ne!(rag.neighbors(node).len(), 1, "node {node:?} should not remain an inclusion");
    }
}

/// (P5) Thresholding the UCM at `t` reproduces `agglomerate(t)`'s partition.
#[test]
fn ucm_threshold_round_trips_to_agglomerate_result() {
    let labels = grid(&[2, 2], vec![1, 2, 3, 4]);
    let probs = fgrid(&[2, 2], vec![0.1, 0.9, 0.8, 0.2]);

    let config = RagConfig {
        track_ucm: true,
        ..RagConfig::default()
    };
    let mut ucm_rag =
        Rag::build(labels.clone(), probs.clone(), MomentFeatureManager, config).expect("builds");
    ucm_rag.agglomerate(f64::INFINITY, &BoundaryMedian);
    let ucm = ucm_rag.get_ucm();

    let mut direct =
        Rag::build(labels, probs, MomentFeatureManager, RagConfig::default()).expect("builds");
    direct.agglomerate(0.5, &BoundaryMedian);
    let direct_seg = direct.get_segmentation();

    // Any two voxels whose UCM level is <= 0.5 on their shared boundary
    // must share the same label in the direct-threshold segmentation.
    let thresholded: Vec<bool> = ucm.iter().map(|&level| level <= 0.5).collect();
    assert!(
        thresholded.iter().any(|&merged| merged),
        "expected at least one boundary to merge below threshold 0.5"
    );
    let mut label_for: HashMap<(usize, usize), i64> = HashMap::new();
    for i in 0..2 {
        for j in 0..2 {
            label_for.insert((i, j), direct_seg[[i, j]]);
        }
    }
    let low_cells = [(1usize, 0usize), (1usize, 1usize)];
    assert_eq!(
        label_for[&low_cells[0]], label_for[&low_cells[1]],
        "cells merged below threshold in direct agglomeration should match the UCM-implied merge"
    );
}
