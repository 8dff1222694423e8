//! The `inspect` subcommand: prints node/edge counts and shape for a volume.
use rag_core::{MomentFeatureManager, Rag, RagConfig};
use serde::Serialize;

use crate::cli::{OutputFormat, PathOrStdin};
use crate::error::CliError;
use crate::format::{self, HumanReport};
use crate::io;

/// Summary statistics computed by building a default-configuration RAG over
/// a volume and reading off its node/edge counts.
#[derive(Debug, Serialize)]
pub struct InspectStats {
    pub shape: Vec<usize>,
    pub voxel_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
}

impl InspectStats {
    pub fn from_volume(volume: &io::VolumeFile) -> Result<Self, CliError> {
        let labels = volume.label_volume()?;
        let probabilities = volume.probability_volume()?;
        let shape = labels.shape().to_vec();
        let voxel_count = labels.len();

        let rag = Rag::build(labels, probabilities, MomentFeatureManager, RagConfig::default())?;

        Ok(InspectStats {
            shape,
            voxel_count,
            node_count: rag.node_count(),
            edge_count: rag.edge_count(),
        })
    }
}

impl HumanReport for InspectStats {
    fn human(&self) -> String {
        format!(
            "shape: {:?}\nvoxels: {}\nnodes: {}\nedges: {}",
            self.shape, self.voxel_count, self.node_count, self.edge_count
        )
    }
}

pub fn run(volume: &PathOrStdin, max_file_size: u64, format_mode: &OutputFormat) -> Result<(), CliError> {
    let label = io::source_label(volume);
    let content = io::read_input(volume, max_file_size)?;
    let parsed = io::parse_volume_file(&content, &label)?;
    let stats = InspectStats::from_volume(&parsed)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    format::write_report(&mut handle, &stats, format_mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_volume() -> io::VolumeFile {
        io::VolumeFile {
            shape: vec![2, 2],
            labels: vec![1, 2, 3, 4],
            probabilities: vec![0.1, 0.9, 0.8, 0.2],
            exclusion: None,
            ground_truth: None,
        }
    }

    #[test]
    fn stats_report_expected_counts() {
        let stats = InspectStats::from_volume(&toy_volume()).expect("should build");
        assert_eq!(stats.shape, vec![2, 2]);
        assert_eq!(stats.voxel_count, 4);
        assert_eq!(stats.node_count, 4);
        assert!(stats.edge_count > 0);
    }

    #[test]
    fn human_report_mentions_every_field() {
        let stats = InspectStats::from_volume(&toy_volume()).expect("should build");
        let human = stats.human();
        assert!(human.contains("nodes: 4"));
        assert!(human.contains("voxels: 4"));
    }
}
