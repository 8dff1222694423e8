//! Assigns a plausible boundary-probability map for a generated label
//! volume: low noise within a block's interior, a spike near true block
//! boundaries, mirroring what a real boundary-detector's output looks
//! like.

use ndarray::ArrayD;
use rand::Rng;
use rand::rngs::StdRng;

use rag_core::{Connectivity, LabelVolume, ProbabilityVolume};

/// Builds a probability volume the same shape as `labels`: voxels touching
/// a differently-labeled neighbor (under face connectivity) get a high
/// value (simulating a true boundary); all other voxels get low noise.
pub fn assign_boundary_probabilities(labels: &LabelVolume, rng: &mut StdRng) -> ProbabilityVolume {
    let shape = labels.shape().to_vec();
    let ndim = shape.len();
    let offsets = Connectivity::Face.offsets(ndim);

    let mut values = Vec::with_capacity(labels.len());
    for (coord, &label) in labels.indexed_iter() {
        let coord: Vec<usize> = coord.slice().to_vec();
        let mut is_boundary = false;
        for offset in &offsets {
            if let Some(neighbor_coord) = rag_core::voxel::offset_coord(&coord, offset, &shape) {
                let neighbor_label = labels[ndarray::IxDyn(&neighbor_coord)];
                if neighbor_label != label {
                    is_boundary = true;
                    break;
                }
            }
        }
        let value = if is_boundary {
            rng.gen_range(0.6..1.0)
        } else {
            rng.gen_range(0.0..0.15)
        };
        values.push(value);
    }

    ArrayD::from_shape_vec(ndarray::IxDyn(&shape), values).expect("shape matches voxel count")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::topology::partition_into_blocks;
    use rand::SeedableRng;

    #[test]
    fn boundary_voxels_have_high_probability_on_average() {
        let mut topo_rng = StdRng::seed_from_u64(3);
        let labels = partition_into_blocks(&[8, 8], 4, &mut topo_rng);
        let mut prob_rng = StdRng::seed_from_u64(3);
        let probs = assign_boundary_probabilities(&labels, &mut prob_rng);
        assert_eq!(probs.shape(), labels.shape());
        assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }
}
