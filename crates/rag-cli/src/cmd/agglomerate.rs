//! The `agglomerate` subcommand: one agglomeration pass, writing the
//! resulting segmentation.
use std::path::Path;

use log::info;
use rag_core::{BoundaryMedian, MomentFeatureManager, Rag, RagConfig};

use crate::cli::{ConnectivityArg, PathOrStdin, PriorityModeArg};
use crate::error::CliError;
use crate::io;

#[allow(clippy::too_many_arguments)]
pub fn run(
    volume: &PathOrStdin,
    max_file_size: u64,
    threshold: f64,
    priority_mode: PriorityModeArg,
    connectivity: ConnectivityArg,
    nozeros: bool,
    remove_inclusions: bool,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let label = io::source_label(volume);
    let content = io::read_input(volume, max_file_size)?;
    let parsed = io::parse_volume_file(&content, &label)?;

    let labels = parsed.label_volume()?;
    let probabilities = parsed.probability_volume()?;
    let exclusion = parsed.exclusion_volume()?;

    let config = RagConfig {
        connectivity: connectivity.into(),
        nozeros,
        exclusion,
        track_ucm: false,
    };

    let mut rag = Rag::build(labels, probabilities, MomentFeatureManager, config)?;

    // `random` and `active` priority only make sense inside the training
    // driver's epoch loop (`random` picks among live edges each step;
    // `active` needs a classifier that only that loop trains). A one-shot
    // agglomeration pass always runs against the boundary-probability
    // priority directly.
    match priority_mode {
        PriorityModeArg::Random | PriorityModeArg::Active => {
            return Err(CliError::InvalidArgument {
                detail: "agglomerate only supports --priority-mode boundary-median; \
                         random/active selection requires the `train` subcommand's epoch loop"
                    .to_owned(),
            });
        }
        PriorityModeArg::BoundaryMedian => {}
    }
    let report = rag.agglomerate(threshold, &BoundaryMedian);
    info!("agglomerate: {} merges, {} forbidden", report.merges, report.forbidden);

    if remove_inclusions {
        let inclusion_report = rag.remove_inclusions();
        info!(
            "remove_inclusions: {} merged, {} skipped",
            inclusion_report.merged, inclusion_report.skipped
        );
    }

    let segmentation = rag.get_segmentation();
    let out_volume = io::VolumeFile::from_label_volume(&segmentation);
    let rendered = io::to_json_string(&out_volume, "segmentation")?;
    io::write_output(&rendered, output)
}
