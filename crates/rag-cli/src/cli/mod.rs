//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rag_core::{Connectivity, LabelingMode, LearningMode, PriorityMode};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`]. This avoids stringly-typed handling of the stdin
/// sentinel throughout the codebase.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default).
    Human,
    /// Structured JSON output.
    Json,
}

/// `clap`-facing mirror of [`rag_core::priority::BoundaryMedian`] and friends;
/// `active` additionally drives the provisional classifier warm start.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PriorityModeArg {
    Random,
    BoundaryMedian,
    Active,
}

impl From<PriorityModeArg> for PriorityMode {
    fn from(arg: PriorityModeArg) -> Self {
        match arg {
            PriorityModeArg::Random => PriorityMode::Random,
            PriorityModeArg::BoundaryMedian => PriorityMode::BoundaryMedian,
            PriorityModeArg::Active => PriorityMode::Active,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LabelingModeArg {
    Assignment,
    #[value(name = "voi-sign")]
    VoiSign,
    #[value(name = "rand-sign")]
    RandSign,
}

impl From<LabelingModeArg> for LabelingMode {
    fn from(arg: LabelingModeArg) -> Self {
        match arg {
            LabelingModeArg::Assignment => LabelingMode::Assignment,
            LabelingModeArg::VoiSign => LabelingMode::VoiSign,
            LabelingModeArg::RandSign => LabelingMode::RandSign,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LearningModeArg {
    Strict,
    Loose,
}

impl From<LearningModeArg> for LearningMode {
    fn from(arg: LearningModeArg) -> Self {
        match arg {
            LearningModeArg::Strict => LearningMode::Strict,
            LearningModeArg::Loose => LearningMode::Loose,
        }
    }
}

/// The single feature manager this core ships. A closed enum rather than a
/// free-form name keeps `--feature-manager` from ever becoming an evaluated
/// expression.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FeatureManagerArg {
    Moments,
}

/// Connectivity argument mirroring [`rag_core::Connectivity`].
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ConnectivityArg {
    Face,
    Full,
}

impl From<ConnectivityArg> for Connectivity {
    fn from(arg: ConnectivityArg) -> Self {
        match arg {
            ConnectivityArg::Face => Connectivity::Face,
            ConnectivityArg::Full => Connectivity::Full,
        }
    }
}

/// All top-level subcommands exposed by the `ragseg` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Run one agglomeration pass and write the resulting segmentation.
    Agglomerate {
        /// Path to a `VolumeFile` JSON document, or `-` for stdin.
        #[arg(value_name = "VOLUME")]
        volume: PathOrStdin,
        /// Stop merging once an edge's priority exceeds this threshold.
        #[arg(long)]
        threshold: f64,
        /// How an edge's merge priority is computed.
        #[arg(long, value_enum, default_value = "boundary-median")]
        priority_mode: PriorityModeArg,
        /// Neighbor connectivity used when sweeping the label volume.
        #[arg(long, value_enum, default_value = "face")]
        connectivity: ConnectivityArg,
        /// Treat label 0 as background rather than as a region (default on).
        #[arg(long, default_value = "true")]
        nozeros: bool,
        /// After agglomeration, merge every single-neighbor node into its
        /// neighbor regardless of priority.
        #[arg(long)]
        remove_inclusions: bool,
        /// Output path for the resulting `VolumeFile`; stdout if omitted.
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Run one agglomeration pass and write the resulting Ultrametric
    /// Contour Map instead of a segmentation.
    Ucm {
        /// Path to a `VolumeFile` JSON document, or `-` for stdin.
        #[arg(value_name = "VOLUME")]
        volume: PathOrStdin,
        /// How an edge's merge priority is computed.
        #[arg(long, value_enum, default_value = "boundary-median")]
        priority_mode: PriorityModeArg,
        /// Neighbor connectivity used when sweeping the label volume.
        #[arg(long, value_enum, default_value = "face")]
        connectivity: ConnectivityArg,
        /// Output path for the resulting `VolumeFile`; stdout if omitted.
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print node/edge counts and shape for a volume.
    Inspect {
        /// Path to a `VolumeFile` JSON document, or `-` for stdin.
        #[arg(value_name = "VOLUME")]
        volume: PathOrStdin,
    },

    /// Scaffold a new `VolumeFile`.
    Init {
        /// Generate a realistic multi-region example instead of a minimal
        /// 2x2x2 skeleton.
        #[arg(long)]
        example: bool,
    },

    /// Run the active-learning training driver: repeated agglomeration
    /// against a ground truth, emitting labeled merge/no-merge examples.
    Train {
        /// Unique experiment name; must not contain a path separator.
        #[arg(long)]
        experiment_name: String,
        /// Path to the boundary-probability `VolumeFile`, or `-` for stdin.
        #[arg(value_name = "PROB_MAP")]
        prob_map: PathOrStdin,
        /// Path to the ground-truth `VolumeFile`.
        #[arg(value_name = "GROUND_TRUTH")]
        ground_truth: PathOrStdin,

        /// Whether a proposed merge executes regardless of its label.
        #[arg(long, value_enum, default_value = "strict")]
        learning_mode: LearningModeArg,
        /// How the merge/no-merge label is derived from the ground truth.
        #[arg(long, value_enum, default_value = "assignment")]
        labeling_mode: LabelingModeArg,
        /// How the next edge to examine is chosen.
        #[arg(long, value_enum, default_value = "boundary-median")]
        priority_mode: PriorityModeArg,
        /// Minimum number of epochs to run before checking for convergence.
        #[arg(long, default_value = "5")]
        num_epochs: usize,
        /// Maximum number of epochs, regardless of convergence.
        #[arg(long, default_value = "20")]
        max_num_epochs: usize,
        /// Minimum number of examples required before the run is considered
        /// usable; below this, emit a convergence warning.
        #[arg(long, default_value = "0")]
        min_num_examples: usize,
        /// Cap the output dataset to this many examples (uniform subsample).
        #[arg(long)]
        num_examples: Option<usize>,
        /// Disable per-epoch dataset retention; keep only the aggregate.
        #[arg(long)]
        no_memory: bool,
        /// Disable bit-exact feature-vector deduplication of the aggregate.
        #[arg(long)]
        no_unique: bool,
        /// Reserved for parity with the distilled flag set; the engine
        /// always flattens per-epoch datasets into one aggregate today.
        #[arg(long)]
        no_learn_flat: bool,

        /// Feature manager to drive the graph with.
        #[arg(long, value_enum, default_value = "moments")]
        feature_manager: FeatureManagerArg,
        /// Use the expected-change-in-VOI priority function instead of the
        /// classifier's raw merge probability (only meaningful with
        /// `--priority-mode active`).
        #[arg(long)]
        active_vi: bool,
        /// Weight of the merge-entropy term in the expected-VOI priority.
        #[arg(long, default_value = "1.0")]
        active_vi_beta: f64,

        /// Treat the probability map as single-channel (accepted for
        /// compatibility; the reference `VolumeFile` format is always
        /// single-channel).
        #[arg(long)]
        single_channel: bool,
        /// Accepted for compatibility with the distilled flag set; the
        /// reference volume adapter has no separate channel-data stream to
        /// omit.
        #[arg(long)]
        no_channel_data: bool,
        /// Run `remove_inclusions` before handing the RAG to the learning
        /// engine each epoch.
        #[arg(long)]
        remove_inclusions: bool,
        /// Treat label 0 as a region rather than background.
        #[arg(long)]
        nozeros: bool,
        /// Accepted for compatibility; an external watershed stage is out
        /// of scope for this engine (see the design notes).
        #[arg(long, value_name = "PATH")]
        watershed_file: Option<PathBuf>,
        /// Accepted for compatibility; synapse-aware exclusion volumes are
        /// out of scope for this engine.
        #[arg(long, value_name = "PATH")]
        synapse_file: Option<PathBuf>,
        /// Accepted for compatibility with the distilled flag set.
        #[arg(long)]
        synapse_dilation: Option<i64>,
        /// Accepted for compatibility with the distilled flag set.
        #[arg(long)]
        seed_cc_threshold: Option<i64>,

        /// Directory to write the training dataset and classifier to.
        #[arg(long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
        /// File extension for the training dataset.
        #[arg(long, default_value = ".json")]
        training_data_extension: String,
        /// File extension for the classifier (accepted for compatibility;
        /// `LogisticClassifier` is not yet serialized to disk).
        #[arg(long, default_value = ".json")]
        classifier_extension: String,

        /// Seed for every deterministic choice the engine makes.
        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

/// Root CLI struct for the `ragseg` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "ragseg",
    version,
    about = "Agglomerative 3D segmentation and active-learning CLI",
    long_about = "Builds region adjacency graphs over label/probability volumes, \
                  agglomerates them under a pluggable priority function, and drives \
                  an active-learning loop that emits labeled merge/no-merge training \
                  examples."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json. Honored by `inspect`.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Suppress all stderr output except errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase stderr verbosity: per-epoch dataset sizes, merge counts.
    /// (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `RAGSEG_MAX_FILE_SIZE` environment variable.
    /// The CLI flag takes precedence over the environment variable.
    /// Default: 268435456 (256 MB).
    #[arg(
        long,
        global = true,
        env = "RAGSEG_MAX_FILE_SIZE",
        default_value = "268435456"
    )]
    pub max_file_size: u64,
}

#[cfg(test)]
mod tests;
