//! The `ucm` subcommand: one agglomeration pass, writing the resulting
//! Ultrametric Contour Map instead of a segmentation.
use std::path::Path;

use log::info;
use rag_core::{BoundaryMedian, MomentFeatureManager, Rag, RagConfig};

use crate::cli::{ConnectivityArg, PathOrStdin, PriorityModeArg};
use crate::error::CliError;
use crate::io;

pub fn run(
    volume: &PathOrStdin,
    max_file_size: u64,
    priority_mode: PriorityModeArg,
    connectivity: ConnectivityArg,
    output: Option<&Path>,
) -> Result<(), CliError> {
    if !matches!(priority_mode, PriorityModeArg::BoundaryMedian) {
        return Err(CliError::InvalidArgument {
            detail: "ucm only supports --priority-mode boundary-median; random/active selection \
                     requires the `train` subcommand's epoch loop"
                .to_owned(),
        });
    }

    let label = io::source_label(volume);
    let content = io::read_input(volume, max_file_size)?;
    let parsed = io::parse_volume_file(&content, &label)?;

    let labels = parsed.label_volume()?;
    let probabilities = parsed.probability_volume()?;
    let exclusion = parsed.exclusion_volume()?;

    let config = RagConfig {
        connectivity: connectivity.into(),
        nozeros: true,
        exclusion,
        track_ucm: true,
    };

    let mut rag = Rag::build(labels, probabilities, MomentFeatureManager, config)?;
    // Drive every merge through completion (threshold = +inf) so the UCM
    // records a level for every origin edge, not just the ones merged
    // below some cutoff.
    let report = rag.agglomerate(f64::INFINITY, &BoundaryMedian);
    info!("ucm: {} merges, {} forbidden", report.merges, report.forbidden);

    let ucm = rag.get_ucm();
    let out_volume = io::VolumeFile::from_probability_volume(&ucm);
    let rendered = io::to_json_string(&out_volume, "ucm")?;
    io::write_output(&rendered, output)
}
