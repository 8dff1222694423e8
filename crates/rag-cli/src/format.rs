/// Dual human/JSON output for the small set of summary reports the CLI
/// prints to stdout (`inspect`, and the merge/forbidden counts emitted by
/// `agglomerate`/`train` in verbose mode).
///
/// Unlike the teacher CLI's diagnostic formatter, this module leans on
/// `serde_json` directly rather than hand-rolling JSON string escaping —
/// `rag-cli` already depends on `serde_json` for the `VolumeFile` adapter
/// in [`crate::io`], so there is no dependency-avoidance reason left to
/// hand-roll it here too.
use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Writes `value` to `writer` in the format selected by `mode`: a
/// human-readable `key: value` listing, or a single JSON object.
pub fn write_report<W: Write, T: Serialize + HumanReport>(
    writer: &mut W,
    value: &T,
    mode: &OutputFormat,
) -> Result<(), CliError> {
    let rendered = match mode {
        OutputFormat::Human => value.human(),
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| CliError::ParseFailed {
            source: "report".to_owned(),
            detail: e.to_string(),
        })?,
    };
    writeln!(writer, "{rendered}").map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })
}

/// Renders a report as a human-readable `key: value` listing.
pub trait HumanReport {
    fn human(&self) -> String;
}

/// Returns the singular or plural form of `word` depending on `count`.
pub fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}
