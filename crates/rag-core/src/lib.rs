//! Agglomerative segmentation engine: region adjacency graph
//! construction, priority-driven merging, and an active-learning loop for
//! generating merge/no-merge training examples.

pub mod classifier;
pub mod error;
pub mod feature;
pub mod graph;
pub mod learning;
mod pqueue;
pub mod newtypes;
pub mod priority;
pub mod voxel;

pub use classifier::{Classifier, LogisticClassifier};
pub use error::{LearningWarning, RagError};
pub use feature::{FeatureManager, HistogramCache, MomentCache, MomentFeatureManager};
pub use graph::{AgglomerationReport, InclusionReport, MergeOutcome, Rag, RagConfig};
pub use learning::{Dataset, LabelingMode, LearningConfig, LearningEngine, LearningMode, LearningOutput, PriorityMode};
pub use newtypes::{EdgeId, ExclusionTag, NodeId};
pub use priority::{assemble_feature_vector, BoundaryMedian, ClassifierProbability, ExpectedVariationOfInformation, PriorityFn};
pub use voxel::{boundary_sample, Connectivity, LabelVolume, ProbabilityVolume};

/// Returns the crate's semantic version, as declared in `Cargo.toml`.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
