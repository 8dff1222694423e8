//! Pluggable edge-priority functions and their named registry.

use crate::classifier::Classifier;
use crate::feature::FeatureManager;
use crate::graph::Rag;
use crate::newtypes::EdgeId;

/// Computes the merge cost of an edge. Lower priority means "merge
/// sooner"; `f64::INFINITY` means "never merge".
pub trait PriorityFn<FM: FeatureManager> {
    fn priority(&self, rag: &Rag<FM>, edge: EdgeId) -> f64;

    fn name(&self) -> &'static str;
}

/// Priority equal to the median sampled boundary probability. Requires no
/// trained classifier; always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryMedian;

impl<FM: FeatureManager> PriorityFn<FM> for BoundaryMedian {
    fn priority(&self, rag: &Rag<FM>, edge: EdgeId) -> f64 {
        let fm = rag.feature_manager();
        fm.edge_median(rag.edge_cache(edge))
    }

    fn name(&self) -> &'static str {
        "boundary_median"
    }
}

/// Assembles the fixed-order feature vector handed to a classifier:
/// left-node features, right-node features, edge features, and
/// (optionally) the elementwise difference/absolute-difference of the two
/// node feature vectors.
pub fn assemble_feature_vector<FM: FeatureManager>(rag: &Rag<FM>, edge: EdgeId) -> Vec<f64> {
    let fm = rag.feature_manager();
    #[allow(clippy::unwrap_used)]
    let (u, v) = rag.edge_endpoints(edge).unwrap();
    let left = fm.node_features(rag.node_cache(u));
    let right = fm.node_features(rag.node_cache(v));
    let edge_feats = fm.edge_features(rag, edge);

    let mut out = Vec::with_capacity(left.len() + right.len() + edge_feats.len() + left.len() * 2);
    out.extend_from_slice(&left);
    out.extend_from_slice(&right);
    out.extend_from_slice(&edge_feats);
    if fm.include_differences() {
        for (a, b) in left.iter().zip(&right) {
            out.push(a - b);
            out.push((a - b).abs());
        }
    }
    out
}

/// Priority equal to the classifier's predicted probability that the
/// merge is *wrong*: low priority means the classifier is confident the
/// merge is correct.
pub struct ClassifierProbability<'a, C> {
    pub classifier: &'a C,
}

impl<'a, FM: FeatureManager, C: Classifier> PriorityFn<FM> for ClassifierProbability<'a, C> {
    fn priority(&self, rag: &Rag<FM>, edge: EdgeId) -> f64 {
        let features = assemble_feature_vector(rag, edge);
        let p_correct = self.classifier.predict_proba(&features);
        1.0 - p_correct
    }

    fn name(&self) -> &'static str {
        "classifier_probability"
    }
}

/// Priority equal to the estimated change in Variation of Information a
/// merge would cause, weighted by the classifier's confidence.
pub struct ExpectedVariationOfInformation<'a, C> {
    pub classifier: &'a C,
    pub beta: f64,
}

impl<'a, FM: FeatureManager, C: Classifier> PriorityFn<FM> for ExpectedVariationOfInformation<'a, C> {
    fn priority(&self, rag: &Rag<FM>, edge: EdgeId) -> f64 {
        #[allow(clippy::unwrap_used)]
        let (u, v) = rag.edge_endpoints(edge).unwrap();
        let n_u = rag.node_voxel_count(u) as f64;
        let n_v = rag.node_voxel_count(v) as f64;
        let n_total = rag.live_nodes().map(|n| rag.node_voxel_count(n) as f64).sum::<f64>();
        if n_total <= 0.0 {
            return f64::INFINITY;
        }

        let features = assemble_feature_vector(rag, edge);
        let p_correct = self.classifier.predict_proba(&features);

        let h_merge = entropy_term((n_u + n_v) / n_total);
        let h_correct = entropy_term(n_u / n_total) + entropy_term(n_v / n_total);

        self.beta * (1.0 - p_correct) * h_merge - p_correct * h_correct
    }

    fn name(&self) -> &'static str {
        "expected_change_vi"
    }
}

fn entropy_term(p: f64) -> f64 {
    if p <= 0.0 {
        0.0
    } else {
        -p * p.log2()
    }
}
