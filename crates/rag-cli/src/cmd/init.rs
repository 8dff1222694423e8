//! Implementation of `ragseg init`.
//!
//! Scaffolds a [`crate::io::VolumeFile`] and writes it to stdout.
//!
//! Flags:
//! - `--example`: generate a small multi-region example with a plausible
//!   boundary-probability field instead of the minimal 2x2x2 skeleton.
//!
//! Exit codes: always succeeds unless stdout write fails.
use crate::error::CliError;
use crate::io::{self, VolumeFile};

/// Runs the `init` command.
pub fn run(example: bool) -> Result<(), CliError> {
    let volume = if example { build_example_volume() } else { build_minimal_volume() };
    let json = io::to_json_string(&volume, "init")?;
    println!("{json}");
    Ok(())
}

/// A minimal 2x2x2 volume: two regions of four voxels each, an essentially
/// certain boundary between them.
fn build_minimal_volume() -> VolumeFile {
    VolumeFile {
        shape: vec![2, 2, 2],
        labels: vec![1, 1, 1, 1, 2, 2, 2, 2],
        probabilities: vec![0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05],
        exclusion: None,
        ground_truth: None,
    }
}

/// A 4x4x1 oversegmentation with four small regions, a soft internal
/// boundary between two of them (a plausible merge candidate) and a sharp
/// boundary elsewhere, plus a ground-truth volume collapsing them to two
/// true regions — runnable end-to-end through both `agglomerate` and
/// `train` without a real watershed/probability-map pipeline.
fn build_example_volume() -> VolumeFile {
    #[rustfmt::skip]
    let labels = vec![
        1, 1, 2, 2,
        1, 1, 2, 2,
        3, 3, 4, 4,
        3, 3, 4, 4,
    ];
    #[rustfmt::skip]
    let probabilities = vec![
        0.05, 0.15, 0.90, 0.95,
        0.05, 0.15, 0.90, 0.95,
        0.90, 0.95, 0.05, 0.15,
        0.90, 0.95, 0.05, 0.15,
    ];
    #[rustfmt::skip]
    let ground_truth = vec![
        1, 1, 2, 2,
        1, 1, 2, 2,
        1, 1, 2, 2,
        1, 1, 2, 2,
    ];

    VolumeFile {
        shape: vec![4, 4],
        labels,
        probabilities,
        exclusion: None,
        ground_truth: Some(ground_truth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_volume_has_two_regions() {
        let volume = build_minimal_volume();
        let distinct: std::collections::HashSet<i64> = volume.labels.iter().copied().collect();
        assert_eq!(distinct.len(), 2);
    }

    #[test]
    fn example_volume_reshapes_cleanly() {
        let volume = build_example_volume();
        assert!(volume.label_volume().is_ok());
        assert!(volume.probability_volume().is_ok());
        assert!(volume.ground_truth_volume().expect("should parse").is_some());
    }

    #[test]
    fn run_does_not_error() {
        assert!(run(false).is_ok());
        assert!(run(true).is_ok());
    }
}
