//! Shared helpers for the `ragseg` end-to-end tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Command;

/// Path to the compiled `ragseg` binary.
pub fn ragseg_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("ragseg");
    path
}

pub fn command() -> Command {
    Command::new(ragseg_bin())
}
