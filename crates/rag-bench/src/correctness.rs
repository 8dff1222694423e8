//! Post-operation invariant checkers for correctness validation.

use std::collections::HashSet;

use rag_core::{FeatureManager, LabelVolume, Rag};

/// Verifies graph construction invariants against the source label volume:
/// every distinct label becomes exactly one live node, and the sum of node
/// voxel counts equals the volume's total voxel count.
pub fn check_graph_invariants<FM: FeatureManager>(labels: &LabelVolume, rag: &Rag<FM>) -> Result<(), String> {
    let distinct_labels: HashSet<i64> = labels.iter().copied().collect();
    if rag.node_count() != distinct_labels.len() {
        return Err(format!(
            "node count mismatch: graph={}, distinct labels={}",
            rag.node_count(),
            distinct_labels.len()
        ));
    }

    let total_voxels: u64 = rag.live_nodes().map(|n| rag.node_voxel_count(n)).sum();
    if total_voxels != labels.len() as u64 {
        return Err(format!(
            "voxel count mismatch: graph total={}, volume voxels={}",
            total_voxels,
            labels.len()
        ));
    }

    for edge in rag.live_edges() {
        let (u, v) = rag
            .edge_endpoints(edge)
            .ok_or_else(|| format!("edge {edge:?} has no endpoints"))?;
        if u == v {
            return Err(format!("edge {edge:?} is a self-loop on node {u:?}"));
        }
        if rag.edge_boundary_count(edge) == 0 {
            return Err(format!("edge {edge:?} has zero boundary count"));
        }
    }

    Ok(())
}

/// Verifies that an `agglomerate` call never increases the live node count
/// and that the resulting segmentation covers the original volume's shape.
pub fn check_agglomeration_result<FM: FeatureManager>(
    nodes_before: usize,
    rag: &Rag<FM>,
    original_shape: &[usize],
) -> Result<(), String> {
    if rag.node_count() > nodes_before {
        return Err(format!(
            "agglomeration increased node count: before={nodes_before}, after={}",
            rag.node_count()
        ));
    }
    let seg = rag.get_segmentation();
    if seg.shape() != original_shape {
        return Err(format!(
            "segmentation shape {:?} does not match original shape {:?}",
            seg.shape(),
            original_shape
        ));
    }
    Ok(())
}

/// Verifies that `remove_inclusions` reached a fixpoint: no remaining live
/// node has exactly one neighbor.
pub fn check_no_inclusions_remain<FM: FeatureManager>(rag: &Rag<FM>) -> Result<(), String> {
    for node in rag.live_nodes() {
        if rag.neighbors(node).len() == 1 {
            return Err(format!("node {node:?} still has exactly one neighbor"));
        }
    }
    Ok(())
}

/// Verifies that a UCM volume has the same shape as the source labels and
/// that every level lies in `[0, 1]` or is infinite (never-merge boundary).
pub fn check_ucm_levels(ucm: &rag_core::ProbabilityVolume, labels: &LabelVolume) -> Result<(), String> {
    if ucm.shape() != labels.shape() {
        return Err(format!(
            "UCM shape {:?} does not match label shape {:?}",
            ucm.shape(),
            labels.shape()
        ));
    }
    for &level in ucm.iter() {
        if level.is_nan() {
            return Err("UCM contains a NaN level".to_owned());
        }
        if level.is_finite() && !(0.0..=1.0).contains(&level) {
            return Err(format!("UCM level {level} outside [0, 1]"));
        }
    }
    Ok(())
}
