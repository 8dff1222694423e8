//! The `train` subcommand: the active-learning training driver. Runs
//! repeated agglomeration against a ground truth, emitting labeled
//! merge/no-merge training examples.
use std::path::{Path, PathBuf};

use log::{info, warn};
use rag_core::{LearningConfig, LearningEngine, MomentFeatureManager, RagConfig};
use serde::Serialize;

use crate::cli::{LabelingModeArg, LearningModeArg, PathOrStdin, PriorityModeArg};
use crate::error::CliError;
use crate::io;

/// All arguments the `train` subcommand needs, bundled so [`run`] stays a
/// single-call site in `main.rs`'s dispatcher despite the training driver's
/// large distilled flag set.
pub struct TrainArgs<'a> {
    pub experiment_name: &'a str,
    pub prob_map: &'a PathOrStdin,
    pub ground_truth: &'a PathOrStdin,
    pub max_file_size: u64,

    pub learning_mode: LearningModeArg,
    pub labeling_mode: LabelingModeArg,
    pub priority_mode: PriorityModeArg,
    pub num_epochs: usize,
    pub max_num_epochs: usize,
    pub min_num_examples: usize,
    pub num_examples: Option<usize>,
    pub memory: bool,
    pub unique: bool,
    pub active_vi: bool,
    pub active_vi_beta: f64,
    pub remove_inclusions: bool,
    pub nozeros: bool,

    pub output_dir: &'a Path,
    pub training_data_extension: &'a str,
    pub seed: u64,
    pub verbose: bool,
}

/// The `(X, Y, W)` training data tuple plus the text info header describing
/// how it was produced, as written to `output_dir`.
#[derive(Debug, Serialize)]
struct TrainingDataFile {
    info: TrainingInfo,
    features: Vec<Vec<f64>>,
    labels: Vec<bool>,
    weights: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct TrainingInfo {
    experiment_name: String,
    feature_manager: &'static str,
    priority_mode: &'static str,
    labeling_mode: &'static str,
    learning_mode: &'static str,
    seed: u64,
    epochs_run: usize,
    num_examples: usize,
}

pub fn run(args: TrainArgs<'_>) -> Result<(), CliError> {
    if args.experiment_name.contains('/') || args.experiment_name.contains('\\') {
        return Err(CliError::InvalidArgument {
            detail: format!("experiment name {:?} must not contain a path separator", args.experiment_name),
        });
    }

    let prob_label = io::source_label(args.prob_map);
    let prob_content = io::read_input(args.prob_map, args.max_file_size)?;
    let prob_volume = io::parse_volume_file(&prob_content, &prob_label)?;

    let gt_label = io::source_label(args.ground_truth);
    let gt_content = io::read_input(args.ground_truth, args.max_file_size)?;
    let gt_volume = io::parse_volume_file(&gt_content, &gt_label)?;

    let labels = prob_volume.label_volume()?;
    let probabilities = prob_volume.probability_volume()?;
    let ground_truth = gt_volume.label_volume()?;

    let graph_config = RagConfig {
        nozeros: !args.nozeros,
        exclusion: prob_volume.exclusion_volume()?,
        ..RagConfig::default()
    };

    let learning_config = LearningConfig {
        priority_mode: args.priority_mode.into(),
        labeling_mode: args.labeling_mode.into(),
        learning_mode: args.learning_mode.into(),
        min_num_epochs: args.num_epochs,
        max_num_epochs: args.max_num_epochs,
        memory: args.memory,
        unique: args.unique,
        num_examples: args.num_examples,
        seed: args.seed,
        active_vi: args.active_vi,
        active_vi_beta: args.active_vi_beta,
    };

    let engine = LearningEngine::new(MomentFeatureManager, graph_config, learning_config);
    let output = engine.run(labels, probabilities, ground_truth)?;

    for warning in &output.warnings {
        warn!("{warning}");
    }
    info!(
        "train: {} epochs, {} examples",
        output.epochs_run,
        output.dataset.len()
    );
    if output.dataset.len() < args.min_num_examples {
        warn!(
            "only {} examples gathered, below --min-num-examples {}",
            output.dataset.len(),
            args.min_num_examples
        );
    }

    let training_file = TrainingDataFile {
        info: TrainingInfo {
            experiment_name: args.experiment_name.to_owned(),
            feature_manager: "moments",
            priority_mode: priority_mode_name(args.priority_mode),
            labeling_mode: labeling_mode_name(args.labeling_mode),
            learning_mode: learning_mode_name(args.learning_mode),
            seed: args.seed,
            epochs_run: output.epochs_run,
            num_examples: output.dataset.len(),
        },
        features: output.dataset.features,
        labels: output.dataset.labels,
        weights: output.dataset.weights,
    };

    let rendered = io::to_json_string(&training_file, "training data")?;
    let out_path = training_data_path(args.output_dir, args.experiment_name, args.training_data_extension);
    std::fs::write(&out_path, rendered).map_err(|e| CliError::IoError {
        source: out_path.display().to_string(),
        detail: e.to_string(),
    })?;
    info!("wrote training data to {}", out_path.display());

    Ok(())
}

fn training_data_path(dir: &Path, experiment_name: &str, extension: &str) -> PathBuf {
    let ext = extension.trim_start_matches('.');
    dir.join(format!("{experiment_name}.{ext}"))
}

fn priority_mode_name(mode: PriorityModeArg) -> &'static str {
    match mode {
        PriorityModeArg::Random => "random",
        PriorityModeArg::BoundaryMedian => "boundary_median",
        PriorityModeArg::Active => "active",
    }
}

fn labeling_mode_name(mode: LabelingModeArg) -> &'static str {
    match mode {
        LabelingModeArg::Assignment => "assignment",
        LabelingModeArg::VoiSign => "voi-sign",
        LabelingModeArg::RandSign => "rand-sign",
    }
}

fn learning_mode_name(mode: LearningModeArg) -> &'static str {
    match mode {
        LearningModeArg::Strict => "strict",
        LearningModeArg::Loose => "loose",
    }
}
