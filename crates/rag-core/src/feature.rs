//! The feature manager plug-in contract, and the moment-based default
//! implementation shipped with this crate.
//!
//! A feature manager maintains per-node and per-edge caches that must be
//! merge-additive: combining two caches must equal recomputing the cache
//! from scratch over the union of their voxels. This is what lets the
//! graph update features in O(1) per merge instead of O(region size).

use crate::graph::Rag;
use crate::newtypes::EdgeId;

/// A plug-in that maintains aggregated statistics over node and edge
/// voxel sets, and derives feature vectors from them for priority
/// functions and classifiers.
pub trait FeatureManager: Clone {
    /// Opaque per-node accumulator.
    type NodeCache: Clone;
    /// Opaque per-edge accumulator.
    type EdgeCache: Clone;

    fn create_node_cache(&self) -> Self::NodeCache;
    fn create_edge_cache(&self) -> Self::EdgeCache;

    /// Folds a single sampled probability value into a node cache.
    fn update_node(&self, cache: &mut Self::NodeCache, value: f64);

    /// Folds a single sampled boundary probability value into an edge
    /// cache.
    fn update_edge(&self, cache: &mut Self::EdgeCache, value: f64);

    /// Combines `src` into `dst` in place. Must be associative and
    /// commutative.
    fn combine_nodes(&self, dst: &mut Self::NodeCache, src: &Self::NodeCache);

    /// Combines `src` into `dst` in place. Must be associative and
    /// commutative.
    fn combine_edges(&self, dst: &mut Self::EdgeCache, src: &Self::EdgeCache);

    /// Derives a fixed-length feature vector from a node cache.
    fn node_features(&self, cache: &Self::NodeCache) -> Vec<f64>;

    /// Derives a fixed-length feature vector for an edge, optionally
    /// reading the endpoints' caches for contextual features (size
    /// ratio, mean difference, ...).
    fn edge_features(&self, rag: &Rag<Self>, edge: EdgeId) -> Vec<f64>
    where
        Self: Sized;

    /// A single scalar summary used by the `boundary_median` priority
    /// function. Default implementations derive this from the edge
    /// cache's histogram/median estimate.
    fn edge_median(&self, cache: &Self::EdgeCache) -> f64;

    /// When true, [`crate::priority::assemble_feature_vector`] appends the
    /// elementwise difference and absolute difference of the two
    /// endpoints' node feature vectors to the assembled vector.
    fn include_differences(&self) -> bool {
        true
    }
}

const HISTOGRAM_BINS: usize = 32;

/// Default feature manager: per-node first and second moments of sampled
/// probabilities, per-edge fixed-width histogram of boundary samples.
///
/// Both representations are exactly merge-additive: node moments sum
/// counts/sums/sums-of-squares, and edge histograms sum bin counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentFeatureManager;

/// Running first/second moments of sampled probability values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentCache {
    pub count: u64,
    pub sum: f64,
    pub sum_sq: f64,
}

impl MomentCache {
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            let mean = self.mean();
            (self.sum_sq / self.count as f64 - mean * mean).max(0.0)
        }
    }
}

/// Fixed-width histogram of boundary probability samples in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct HistogramCache {
    pub bins: [u64; HISTOGRAM_BINS],
    pub total: u64,
}

impl Default for HistogramCache {
    fn default() -> Self {
        Self {
            bins: [0; HISTOGRAM_BINS],
            total: 0,
        }
    }
}

impl HistogramCache {
    fn bin_of(value: f64) -> usize {
        let clamped = value.clamp(0.0, 1.0);
        let idx = (clamped * HISTOGRAM_BINS as f64) as usize;
        idx.min(HISTOGRAM_BINS - 1)
    }

    /// Estimates the median by walking bins until the cumulative count
    /// crosses half the total, reporting the bin midpoint.
    pub fn median(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        let half = self.total as f64 / 2.0;
        let mut cumulative = 0u64;
        for (i, &count) in self.bins.iter().enumerate() {
            cumulative += count;
            if cumulative as f64 >= half {
                return (i as f64 + 0.5) / HISTOGRAM_BINS as f64;
            }
        }
        1.0
    }
}

impl FeatureManager for MomentFeatureManager {
    type NodeCache = MomentCache;
    type EdgeCache = HistogramCache;

    fn create_node_cache(&self) -> Self::NodeCache {
        MomentCache::default()
    }

    fn create_edge_cache(&self) -> Self::EdgeCache {
        HistogramCache::default()
    }

    fn update_node(&self, cache: &mut Self::NodeCache, value: f64) {
        cache.count += 1;
        cache.sum += value;
        cache.sum_sq += value * value;
    }

    fn update_edge(&self, cache: &mut Self::EdgeCache, value: f64) {
        let bin = HistogramCache::bin_of(value);
        cache.bins[bin] += 1;
        cache.total += 1;
    }

    fn combine_nodes(&self, dst: &mut Self::NodeCache, src: &Self::NodeCache) {
        dst.count += src.count;
        dst.sum += src.sum;
        dst.sum_sq += src.sum_sq;
    }

    fn combine_edges(&self, dst: &mut Self::EdgeCache, src: &Self::EdgeCache) {
        for i in 0..HISTOGRAM_BINS {
            dst.bins[i] += src.bins[i];
        }
        dst.total += src.total;
    }

    fn node_features(&self, cache: &Self::NodeCache) -> Vec<f64> {
        vec![cache.count as f64, cache.mean(), cache.variance()]
    }

    fn edge_features(&self, rag: &Rag<Self>, edge: EdgeId) -> Vec<f64>
    where
        Self: Sized,
    {
        let cache = rag.edge_cache(edge);
        vec![cache.median(), cache.total as f64]
    }

    fn edge_median(&self, cache: &Self::EdgeCache) -> f64 {
        cache.median()
    }
}
