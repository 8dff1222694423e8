//! Integration tests for `ragseg train`.
#![allow(clippy::expect_used)]

use std::io::Write as _;

mod support;
use support::command;

fn prob_map_file() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(br#"{"shape":[2,2],"labels":[1,2,3,4],"probabilities":[0.1,0.2,0.3,0.4]}"#)
        .expect("write temp file");
    f
}

fn ground_truth_file() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(br#"{"shape":[2,2],"labels":[1,1,1,1]}"#).expect("write temp file");
    f
}

#[test]
fn train_writes_dataset_file_into_output_dir() {
    let prob = prob_map_file();
    let gt = ground_truth_file();
    let out_dir = tempfile::tempdir().expect("create temp dir");

    let out = command()
        .args([
            "train",
            "--experiment-name",
            "smoke",
            "--output-dir",
            out_dir.path().to_str().expect("path"),
            "--num-epochs",
            "2",
            "--max-num-epochs",
            "3",
            prob.path().to_str().expect("path"),
            gt.path().to_str().expect("path"),
        ])
        .output()
        .expect("run ragseg train");
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let written = std::fs::read_to_string(out_dir.path().join("smoke.json")).expect("read dataset file");
    let value: serde_json::Value = serde_json::from_str(&written).expect("valid json");
    assert!(value.get("features").is_some());
    assert!(value.get("labels").is_some());
    assert!(value.get("weights").is_some());
}

#[test]
fn train_rejects_experiment_name_with_slash() {
    let prob = prob_map_file();
    let gt = ground_truth_file();
    let out_dir = tempfile::tempdir().expect("create temp dir");

    let out = command()
        .args([
            "train",
            "--experiment-name",
            "bad/name",
            "--output-dir",
            out_dir.path().to_str().expect("path"),
            prob.path().to_str().expect("path"),
            gt.path().to_str().expect("path"),
        ])
        .output()
        .expect("run ragseg train");
    assert_eq!(out.status.code(), Some(1));
}
