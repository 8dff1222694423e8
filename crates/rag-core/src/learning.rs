//! The active-learning loop: repeated agglomeration against a ground
//! truth, emitting labeled merge/no-merge training examples.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::classifier::{Classifier, LogisticClassifier};
use crate::error::LearningWarning;
use crate::error::RagError;
use crate::feature::FeatureManager;
use crate::graph::{Rag, RagConfig};
use crate::newtypes::{EdgeId, NodeId};
use crate::priority::{assemble_feature_vector, BoundaryMedian, ClassifierProbability, ExpectedVariationOfInformation, PriorityFn};
use crate::voxel::{LabelVolume, ProbabilityVolume};

/// How the next edge to consider is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityMode {
    Random,
    BoundaryMedian,
    Active,
}

/// How the merge/no-merge label is derived from the ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelingMode {
    Assignment,
    VoiSign,
    RandSign,
}

/// Whether a proposed merge is actually executed regardless of its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningMode {
    Strict,
    Loose,
}

/// Number of newly accumulated examples between provisional-classifier
/// retrains in `active` priority mode.
const RETRAIN_EVERY: usize = 32;

#[derive(Debug, Clone)]
pub struct LearningConfig {
    pub priority_mode: PriorityMode,
    pub labeling_mode: LabelingMode,
    pub learning_mode: LearningMode,
    pub min_num_epochs: usize,
    pub max_num_epochs: usize,
    pub memory: bool,
    pub unique: bool,
    pub num_examples: Option<usize>,
    pub seed: u64,
    pub active_vi: bool,
    pub active_vi_beta: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            priority_mode: PriorityMode::BoundaryMedian,
            labeling_mode: LabelingMode::Assignment,
            learning_mode: LearningMode::Strict,
            min_num_epochs: 5,
            max_num_epochs: 20,
            memory: true,
            unique: true,
            num_examples: None,
            seed: 0,
            active_vi: false,
            active_vi_beta: 1.0,
        }
    }
}

/// A labeled dataset of edge feature vectors.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<bool>,
    pub weights: Vec<f64>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn push(&mut self, features: Vec<f64>, label: bool, weight: f64) {
        self.features.push(features);
        self.labels.push(label);
        self.weights.push(weight);
    }

    pub fn extend(&mut self, other: &Dataset) {
        self.features.extend(other.features.iter().cloned());
        self.labels.extend(other.labels.iter().copied());
        self.weights.extend(other.weights.iter().copied());
    }

    /// Removes examples whose feature vector is bit-exactly equal to an
    /// earlier one, keeping the first occurrence.
    pub fn dedup(&mut self) {
        let mut seen: Vec<&Vec<f64>> = Vec::new();
        let mut keep = vec![false; self.features.len()];
        for (i, f) in self.features.iter().enumerate() {
            if !seen.iter().any(|s| s.as_slice() == f.as_slice()) {
                seen.push(f);
                keep[i] = true;
            }
        }
        self.retain(&keep);
    }

    /// Uniformly subsamples down to `n` examples, deterministic given
    /// `seed`.
    pub fn subsample(&mut self, n: usize, seed: u64) {
        if n >= self.features.len() {
            return;
        }
        let mut indices: Vec<usize> = (0..self.features.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
        indices.truncate(n);
        let keep_set: std::collections::HashSet<usize> = indices.into_iter().collect();
        let keep: Vec<bool> = (0..self.features.len()).map(|i| keep_set.contains(&i)).collect();
        self.retain(&keep);
    }

    fn retain(&mut self, keep: &[bool]) {
        let mut idx = 0;
        self.features.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
        let mut idx = 0;
        self.labels.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
        let mut idx = 0;
        self.weights.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
    }
}

/// Result of a full [`LearningEngine::run`] invocation.
#[derive(Debug, Clone)]
pub struct LearningOutput {
    pub dataset: Dataset,
    pub per_epoch: Option<Vec<Dataset>>,
    pub warnings: Vec<LearningWarning>,
    pub epochs_run: usize,
}

/// Drives repeated agglomeration against a ground truth to emit labeled
/// training examples.
pub struct LearningEngine<FM: FeatureManager> {
    feature_manager: FM,
    graph_config: RagConfig,
    config: LearningConfig,
}

impl<FM: FeatureManager> LearningEngine<FM> {
    pub fn new(feature_manager: FM, graph_config: RagConfig, config: LearningConfig) -> Self {
        Self {
            feature_manager,
            graph_config,
            config,
        }
    }

    pub fn run(
        &self,
        labels: LabelVolume,
        probabilities: ProbabilityVolume,
        ground_truth: LabelVolume,
    ) -> Result<LearningOutput, RagError> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut classifier = LogisticClassifier::default();
        let mut classifier_ready = false;

        let mut aggregated = Dataset::default();
        let mut per_epoch = Vec::new();
        let mut warnings = Vec::new();
        let mut epochs_run = 0usize;
        let mut last_retrain_count = 0usize;

        loop {
            epochs_run += 1;
            let mut rag = Rag::build(
                labels.clone(),
                probabilities.clone(),
                self.feature_manager.clone(),
                self.graph_config.clone(),
            )?;

            let epoch_dataset = run_epoch(
                &mut rag,
                &ground_truth,
                self.config.priority_mode,
                self.config.labeling_mode,
                self.config.learning_mode,
                if classifier_ready { Some(&classifier) } else { None },
                self.config.active_vi,
                self.config.active_vi_beta,
                &mut rng,
            );

            let before_len = aggregated.len();
            aggregated.extend(&epoch_dataset);
            let added = aggregated.len() - before_len;

            if self.config.memory {
                per_epoch.push(epoch_dataset);
            }

            if self.config.priority_mode == PriorityMode::Active
                && aggregated.len() >= RETRAIN_EVERY
                && aggregated.len() - last_retrain_count >= RETRAIN_EVERY
            {
                classifier.fit(&aggregated.features, &aggregated.labels, self.config.seed);
                classifier_ready = true;
                last_retrain_count = aggregated.len();
            }

            let reached_min = epochs_run >= self.config.min_num_epochs;
            let dry = added == 0;

            if reached_min && dry {
                break;
            }
            if epochs_run >= self.config.max_num_epochs {
                if !(reached_min && dry) {
                    warnings.push(LearningWarning::ConvergenceFailure { epochs_run });
                }
                break;
            }
        }

        if self.config.unique {
            aggregated.dedup();
        }
        if let Some(n) = self.config.num_examples {
            aggregated.subsample(n, self.config.seed);
        }

        Ok(LearningOutput {
            dataset: aggregated,
            per_epoch: if self.config.memory { Some(per_epoch) } else { None },
            warnings,
            epochs_run,
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn run_epoch<FM: FeatureManager, C: Classifier>(
    rag: &mut Rag<FM>,
    ground_truth: &LabelVolume,
    priority_mode: PriorityMode,
    labeling_mode: LabelingMode,
    learning_mode: LearningMode,
    classifier: Option<&C>,
    active_vi: bool,
    active_vi_beta: f64,
    rng: &mut StdRng,
) -> Dataset {
    let mut dataset = Dataset::default();

    loop {
        let candidate = match priority_mode {
            PriorityMode::Random => pick_random_edge(rag, rng),
            PriorityMode::BoundaryMedian => pick_min_priority_edge(rag, &BoundaryMedian),
            PriorityMode::Active => match classifier {
                Some(c) if active_vi => pick_min_priority_edge(
                    rag,
                    &ExpectedVariationOfInformation {
                        classifier: c,
                        beta: active_vi_beta,
                    },
                ),
                Some(c) => pick_min_priority_edge(rag, &ClassifierProbability { classifier: c }),
                None => pick_min_priority_edge(rag, &BoundaryMedian),
            },
        };

        let Some(edge) = candidate else {
            break;
        };
        let Some((u, v)) = rag.edge_endpoints(edge) else {
            break;
        };

        let label = match labeling_mode {
            LabelingMode::Assignment => label_by_assignment(rag, u, v, ground_truth),
            LabelingMode::VoiSign => label_by_voi_sign(rag, u, v, ground_truth),
            LabelingMode::RandSign => label_by_rand_sign(rag, u, v, ground_truth),
        };

        let features = assemble_feature_vector(rag, edge);
        dataset.push(features, label, 1.0);

        let should_merge = match learning_mode {
            LearningMode::Loose => true,
            LearningMode::Strict => label,
        };

        if should_merge {
            match rag.merge(u, v) {
                Ok(_) => {}
                Err(RagError::MergeForbidden { .. }) | Err(RagError::UnknownNode { .. }) => {
                    rag.freeze_edge(edge);
                }
            }
        } else {
            rag.freeze_edge(edge);
        }
    }

    dataset
}

fn pick_random_edge<FM: FeatureManager>(rag: &Rag<FM>, rng: &mut StdRng) -> Option<EdgeId> {
    let candidates: Vec<EdgeId> = rag.live_edges().filter(|&e| !rag.edge_is_frozen(e)).collect();
    candidates.choose(rng).copied()
}

fn pick_min_priority_edge<FM: FeatureManager, P: PriorityFn<FM>>(rag: &Rag<FM>, priority_fn: &P) -> Option<EdgeId> {
    rag.live_edges()
        .filter(|&e| !rag.edge_is_frozen(e))
        .map(|e| (priority_fn.priority(rag, e), e))
        .fold(None, |best: Option<(f64, EdgeId)>, (p, e)| match best {
            None => Some((p, e)),
            Some((bp, be)) if p < bp || (p == bp && e.get() < be.get()) => Some((p, e)),
            Some(b) => Some(b),
        })
        .map(|(_, e)| e)
}

fn majority_ground_truth_label(seg: &LabelVolume, ground_truth: &LabelVolume, node: NodeId) -> i64 {
    let target = node.get() as i64;
    let mut counts: HashMap<i64, u64> = HashMap::new();
    for (coord, &label) in seg.indexed_iter() {
        if label == target {
            *counts.entry(ground_truth[coord]).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(label, _)| label)
        .unwrap_or(0)
}

fn label_by_assignment<FM: FeatureManager>(rag: &Rag<FM>, u: NodeId, v: NodeId, ground_truth: &LabelVolume) -> bool {
    let seg = rag.get_segmentation();
    majority_ground_truth_label(&seg, ground_truth, u) == majority_ground_truth_label(&seg, ground_truth, v)
}

fn label_by_voi_sign<FM: FeatureManager>(rag: &Rag<FM>, u: NodeId, v: NodeId, ground_truth: &LabelVolume) -> bool {
    let before = rag.get_segmentation();
    let vi_before = variation_of_information(&before, ground_truth);
    let after = simulate_merge(&before, u, v);
    let vi_after = variation_of_information(&after, ground_truth);
    vi_after < vi_before
}

fn label_by_rand_sign<FM: FeatureManager>(rag: &Rag<FM>, u: NodeId, v: NodeId, ground_truth: &LabelVolume) -> bool {
    let before = rag.get_segmentation();
    let rand_before = rand_index(&before, ground_truth);
    let after = simulate_merge(&before, u, v);
    let rand_after = rand_index(&after, ground_truth);
    rand_after > rand_before
}

/// Returns a copy of `segmentation` with every voxel labeled `v` relabeled
/// to `u`'s ordinal (or vice versa, whichever is lower), simulating the
/// effect of a merge without mutating the RAG.
fn simulate_merge(segmentation: &LabelVolume, u: NodeId, v: NodeId) -> LabelVolume {
    let (survivor, absorbed) = if u.get() <= v.get() { (u, v) } else { (v, u) };
    let mut out = segmentation.clone();
    for val in out.iter_mut() {
        if *val == absorbed.get() as i64 {
            *val = survivor.get() as i64;
        }
    }
    out
}

/// Variation of Information between two labelings of the same voxel grid,
/// computed from their contingency table: `VI(P,Q) = H(P|Q) + H(Q|P)`.
fn variation_of_information(a: &LabelVolume, b: &LabelVolume) -> f64 {
    let n = a.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mut joint: HashMap<(i64, i64), u64> = HashMap::new();
    let mut marginal_a: HashMap<i64, u64> = HashMap::new();
    let mut marginal_b: HashMap<i64, u64> = HashMap::new();
    for (&x, &y) in a.iter().zip(b.iter()) {
        *joint.entry((x, y)).or_insert(0) += 1;
        *marginal_a.entry(x).or_insert(0) += 1;
        *marginal_b.entry(y).or_insert(0) += 1;
    }

    let mut h_a_given_b = 0.0;
    let mut h_b_given_a = 0.0;
    for (&(x, y), &count) in &joint {
        let p_xy = count as f64 / n;
        #[allow(clippy::unwrap_used)]
        let p_x = *marginal_a.get(&x).unwrap() as f64 / n;
        #[allow(clippy::unwrap_used)]
        let p_y = *marginal_b.get(&y).unwrap() as f64 / n;
        h_a_given_b -= p_xy * (p_xy / p_y).log2();
        h_b_given_a -= p_xy * (p_xy / p_x).log2();
    }
    h_a_given_b + h_b_given_a
}

/// Rand index between two labelings: the fraction of voxel pairs on
/// which both labelings agree (both-same or both-different).
fn rand_index(a: &LabelVolume, b: &LabelVolume) -> f64 {
    let n = a.len();
    if n < 2 {
        return 1.0;
    }
    let mut joint: HashMap<(i64, i64), u64> = HashMap::new();
    let mut marginal_a: HashMap<i64, u64> = HashMap::new();
    let mut marginal_b: HashMap<i64, u64> = HashMap::new();
    for (&x, &y) in a.iter().zip(b.iter()) {
        *joint.entry((x, y)).or_insert(0) += 1;
        *marginal_a.entry(x).or_insert(0) += 1;
        *marginal_b.entry(y).or_insert(0) += 1;
    }
    let pairs = |c: u64| (c * c.saturating_sub(1)) / 2;

    let total_pairs = pairs(n as u64) as f64;
    let same_in_both: u64 = joint.values().map(|&c| pairs(c)).sum();
    let same_in_a: u64 = marginal_a.values().map(|&c| pairs(c)).sum();
    let same_in_b: u64 = marginal_b.values().map(|&c| pairs(c)).sum();

    let agreeing_different = total_pairs - (same_in_a as f64 + same_in_b as f64 - same_in_both as f64);
    (same_in_both as f64 + agreeing_different) / total_pairs
}
