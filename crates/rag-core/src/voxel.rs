//! Dense N-dimensional volume types and neighbor-connectivity rules.

use ndarray::ArrayD;

/// A dense integer label volume. Label `0` is reserved for background when
/// `nozeros` mode is active (see [`crate::graph::RagConfig`]).
pub type LabelVolume = ArrayD<i64>;

/// A dense boundary-probability volume, same spatial shape as its paired
/// [`LabelVolume`].
pub type ProbabilityVolume = ArrayD<f64>;

/// Neighbor connectivity used when sweeping the label volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// Face neighbors only (4-connected in 2D, 6-connected in 3D).
    Face,
    /// All neighbors within a Chebyshev distance of 1, excluding the voxel
    /// itself (8-connected in 2D, 26-connected in 3D).
    Full,
}

impl Connectivity {
    /// Enumerates the coordinate offsets for this connectivity in `ndim`
    /// dimensions. Each offset is returned once; callers visiting every
    /// voxel and every offset will discover every adjacency twice (once
    /// from each side), which the graph-construction sweep relies on to
    /// avoid double-accumulating features — see [`crate::graph`].
    pub fn offsets(self, ndim: usize) -> Vec<Vec<isize>> {
        match self {
            Connectivity::Face => face_offsets(ndim),
            Connectivity::Full => full_offsets(ndim),
        }
    }
}

fn face_offsets(ndim: usize) -> Vec<Vec<isize>> {
    let mut offsets = Vec::with_capacity(ndim * 2);
    for axis in 0..ndim {
        for &step in &[-1isize, 1] {
            let mut offset = vec![0isize; ndim];
            offset[axis] = step;
            offsets.push(offset);
        }
    }
    offsets
}

fn full_offsets(ndim: usize) -> Vec<Vec<isize>> {
    let mut offsets = Vec::new();
    let mut current = vec![-1isize; ndim];
    loop {
        if current.iter().any(|&c| c != 0) {
            offsets.push(current.clone());
        }
        let mut axis = ndim;
        loop {
            if axis == 0 {
                return offsets;
            }
            axis -= 1;
            current[axis] += 1;
            if current[axis] <= 1 {
                break;
            }
            current[axis] = -1;
        }
    }
}

/// Adds a coordinate offset to a base coordinate, returning `None` if the
/// result falls outside `[0, shape)` on any axis.
pub fn offset_coord(base: &[usize], offset: &[isize], shape: &[usize]) -> Option<Vec<usize>> {
    let mut out = Vec::with_capacity(base.len());
    for ((&b, &o), &s) in base.iter().zip(offset).zip(shape) {
        let v = b as isize + o;
        if v < 0 || v as usize >= s {
            return None;
        }
        out.push(v as usize);
    }
    Some(out)
}

/// Samples the boundary probability contributed by a voxel pair `(v, v')`
/// where `v` has a real label and `v'` is the neighbor.
///
/// When the neighbor is a zero/background voxel (`p_neighbor` is `None`),
/// the sample is taken at `v` itself. Otherwise the sample is taken at the
/// neighbor `v'`. This convention is applied uniformly by both the
/// graph-construction sweep and any code recomputing features from scratch.
pub fn boundary_sample(p_self: f64, p_neighbor: Option<f64>) -> f64 {
    match p_neighbor {
        Some(p) => p,
        None => p_self,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_offsets_2d_has_four_entries() {
        let offsets = Connectivity::Face.offsets(2);
        assert_eq!(offsets.len(), 4);
        for o in &offsets {
            assert_eq!(o.iter().filter(|&&v| v != 0).count(), 1);
        }
    }

    #[test]
    fn face_offsets_3d_has_six_entries() {
        assert_eq!(Connectivity::Face.offsets(3).len(), 6);
    }

    #[test]
    fn full_offsets_2d_has_eight_entries() {
        let offsets = Connectivity::Full.offsets(2);
        assert_eq!(offsets.len(), 8);
    }

    #[test]
    fn full_offsets_3d_has_twenty_six_entries() {
        assert_eq!(Connectivity::Full.offsets(3).len(), 26);
    }

    #[test]
    fn offset_coord_rejects_out_of_bounds() {
        assert_eq!(offset_coord(&[0, 0], &[-1, 0], &[4, 4]), None);
        assert_eq!(offset_coord(&[3, 3], &[1, 0], &[4, 4]), None);
        assert_eq!(offset_coord(&[1, 1], &[1, -1], &[4, 4]), Some(vec![2, 0]));
    }

    #[test]
    fn boundary_sample_uses_self_when_neighbor_is_background() {
        assert_eq!(boundary_sample(0.3, None), 0.3);
    }

    #[test]
    fn boundary_sample_uses_neighbor_when_present() {
        assert_eq!(boundary_sample(0.2, Some(0.8)), 0.8);
    }
}
