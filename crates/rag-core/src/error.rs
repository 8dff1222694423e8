//! Error types shared across the graph, learning and priority modules.

use std::fmt;

use crate::newtypes::NodeId;

/// Errors raised while constructing or mutating a [`crate::graph::Rag`].
#[derive(Debug, Clone, PartialEq)]
pub enum RagError {
    /// The label volume and probability map have different shapes.
    ShapeMismatch {
        label_shape: Vec<usize>,
        probability_shape: Vec<usize>,
    },
    /// The label volume has zero voxels.
    EmptyVolume,
    /// A negative label was encountered; labels must be non-negative.
    NegativeLabel { value: i64 },
    /// A merge was attempted between two nodes that share a nonzero
    /// exclusion tag.
    MergeForbidden { u: NodeId, v: NodeId },
    /// Either endpoint named by a merge request no longer exists (already
    /// merged away or never created).
    UnknownNode { node: NodeId },
    /// A feature manager returned a non-finite value, or a `combine_*`
    /// call produced a result inconsistent with the additive contract.
    FeatureContractViolation { detail: String },
}

impl fmt::Display for RagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RagError::ShapeMismatch {
                label_shape,
                probability_shape,
            } => write!(
                f,
                "label volume shape {label_shape:?} does not match probability map shape {probability_shape:?}"
            ),
            RagError::EmptyVolume => write!(f, "label volume has zero voxels"),
            RagError::NegativeLabel { value } => {
                write!(f, "label volume contains negative label {value}")
            }
            RagError::MergeForbidden { u, v } => {
                write!(f, "merge of {u} and {v} is forbidden by an exclusion constraint")
            }
            RagError::UnknownNode { node } => write!(f, "node {node} does not exist"),
            RagError::FeatureContractViolation { detail } => {
                write!(f, "feature manager contract violated: {detail}")
            }
        }
    }
}

impl std::error::Error for RagError {}

/// Warnings raised by the learning engine that do not abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum LearningWarning {
    /// `max_num_epochs` was reached without the dataset stabilizing.
    ConvergenceFailure { epochs_run: usize },
    /// A merge proposed by the priority/learning mode was refused by an
    /// exclusion constraint and the corresponding edge was frozen.
    MergeForbidden { u: NodeId, v: NodeId },
}

impl fmt::Display for LearningWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearningWarning::ConvergenceFailure { epochs_run } => write!(
                f,
                "learning did not converge after {epochs_run} epochs; returning partial dataset"
            ),
            LearningWarning::MergeForbidden { u, v } => {
                write!(f, "proposed merge of {u} and {v} was forbidden; edge frozen")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_forbidden_message_names_both_nodes() {
        let err = RagError::MergeForbidden {
            u: NodeId::from_index(0),
            v: NodeId::from_index(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("n1"));
        assert!(msg.contains("n2"));
    }

    #[test]
    fn shape_mismatch_message_contains_both_shapes() {
        let err = RagError::ShapeMismatch {
            label_shape: vec![2, 2],
            probability_shape: vec![2, 3],
        };
        assert!(err.to_string().contains("[2, 2]"));
        assert!(err.to_string().contains("[2, 3]"));
    }
}
