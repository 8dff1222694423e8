use super::*;
use clap::Parser;

#[test]
fn path_or_stdin_parses_dash_as_stdin() {
    let parsed: PathOrStdin = "-".parse().expect("infallible");
    assert!(matches!(parsed, PathOrStdin::Stdin));
}

#[test]
fn path_or_stdin_parses_anything_else_as_a_path() {
    let parsed: PathOrStdin = "volume.json".parse().expect("infallible");
    match parsed {
        PathOrStdin::Path(p) => assert_eq!(p, PathBuf::from("volume.json")),
        PathOrStdin::Stdin => panic!("expected a path"),
    }
}

#[test]
fn agglomerate_parses_required_and_default_flags() {
    let cli = Cli::parse_from(["ragseg", "agglomerate", "volume.json", "--threshold", "0.5"]);
    match cli.command {
        Command::Agglomerate {
            threshold,
            priority_mode: PriorityModeArg::BoundaryMedian,
            connectivity: ConnectivityArg::Face,
            nozeros: true,
            remove_inclusions: false,
            output: None,
            ..
        } => {
            assert_eq!(threshold, 0.5);
        }
        _ => panic!("unexpected parse"),
    }
}

#[test]
fn agglomerate_accepts_output_path_and_priority_mode() {
    let cli = Cli::parse_from([
        "ragseg",
        "agglomerate",
        "volume.json",
        "--threshold",
        "0.2",
        "--priority-mode",
        "active",
        "-o",
        "out.json",
    ]);
    match cli.command {
        Command::Agglomerate {
            priority_mode: PriorityModeArg::Active,
            output: Some(path),
            ..
        } => assert_eq!(path, PathBuf::from("out.json")),
        _ => panic!("unexpected parse"),
    }
}

#[test]
fn quiet_and_verbose_conflict() {
    let result = Cli::try_parse_from(["ragseg", "-q", "-v", "inspect", "volume.json"]);
    assert!(result.is_err());
}

#[test]
fn train_requires_experiment_name_and_two_positionals() {
    let cli = Cli::parse_from([
        "ragseg",
        "train",
        "--experiment-name",
        "exp1",
        "prob.json",
        "gt.json",
    ]);
    match cli.command {
        Command::Train {
            experiment_name,
            learning_mode: LearningModeArg::Strict,
            labeling_mode: LabelingModeArg::Assignment,
            priority_mode: PriorityModeArg::BoundaryMedian,
            num_epochs: 5,
            max_num_epochs: 20,
            seed: 0,
            ..
        } => assert_eq!(experiment_name, "exp1"),
        _ => panic!("unexpected parse"),
    }
}

#[test]
fn train_accepts_labeling_mode_with_hyphen() {
    let cli = Cli::parse_from([
        "ragseg",
        "train",
        "--experiment-name",
        "exp1",
        "--labeling-mode",
        "voi-sign",
        "prob.json",
        "gt.json",
    ]);
    match cli.command {
        Command::Train {
            labeling_mode: LabelingModeArg::VoiSign,
            ..
        } => {}
        _ => panic!("unexpected parse"),
    }
}

#[test]
fn missing_required_threshold_is_rejected() {
    let result = Cli::try_parse_from(["ragseg", "agglomerate", "volume.json"]);
    assert!(result.is_err());
}
