//! Synthetic volume generator for benchmarking and property-based testing
//! of `rag-core`.

pub mod probability;
pub mod topology;

use rand::SeedableRng;
use rand::rngs::StdRng;

use rag_core::{LabelVolume, ProbabilityVolume};

/// Configuration for the synthetic volume generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Spatial shape of the generated volume.
    pub shape: Vec<usize>,
    /// Number of blocks per axis in the initial partition.
    pub blocks_per_axis: usize,
}

/// Predefined size tiers for benchmarking, loosely mirroring the voxel
/// counts a real supervoxel-scale RAG might see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// 16x16 = 256 voxels, ~16 regions.
    Small,
    /// 64x64 = 4096 voxels, ~64 regions.
    Medium,
    /// 32x32x32 = 32768 voxels, ~512 regions.
    Large,
    /// 64x64x16 = 65536 voxels, ~1024 regions.
    XLarge,
}

impl SizeTier {
    /// Returns the default `GeneratorConfig` for this size tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        match self {
            SizeTier::Small => GeneratorConfig {
                seed,
                shape: vec![16, 16],
                blocks_per_axis: 4,
            },
            SizeTier::Medium => GeneratorConfig {
                seed,
                shape: vec![64, 64],
                blocks_per_axis: 8,
            },
            SizeTier::Large => GeneratorConfig {
                seed,
                shape: vec![32, 32, 32],
                blocks_per_axis: 8,
            },
            SizeTier::XLarge => GeneratorConfig {
                seed,
                shape: vec![64, 64, 16],
                blocks_per_axis: 8,
            },
        }
    }
}

/// Generates a synthetic `(labels, probabilities)` volume pair from the
/// given configuration.
///
/// All randomness is deterministic, seeded from `config.seed`.
pub fn generate_volume(config: &GeneratorConfig) -> (LabelVolume, ProbabilityVolume) {
    let mut topo_rng = StdRng::seed_from_u64(config.seed);
    let labels = topology::partition_into_blocks(&config.shape, config.blocks_per_axis, &mut topo_rng);

    let mut prob_rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
    let probabilities = probability::assign_boundary_probabilities(&labels, &mut prob_rng);

    (labels, probabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_volume_is_deterministic_given_seed() {
        let config = SizeTier::Small.config(42);
        let (labels_a, probs_a) = generate_volume(&config);
        let (labels_b, probs_b) = generate_volume(&config);
        assert_eq!(labels_a, labels_b);
        assert_eq!(probs_a, probs_b);
    }

    #[test]
    fn generate_volume_matches_requested_shape() {
        let config = SizeTier::Large.config(1);
        let (labels, probs) = generate_volume(&config);
        assert_eq!(labels.shape(), [32, 32, 32]);
        assert_eq!(probs.shape(), labels.shape());
    }
}
