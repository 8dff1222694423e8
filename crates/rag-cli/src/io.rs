/// File and stdin reading with size enforcement and UTF-8 validation, plus
/// the `VolumeFile` JSON interchange format `rag-core` itself never touches.
///
/// This module is the single entry point for all input/output in the
/// `ragseg` binary. `rag-core` never touches the filesystem or a JSON
/// encoder; all of that happens here, mirroring the reference-adapter
/// framing in the design notes — a production deployment would instead
/// speak HDF5 or an image-stack format at this exact seam.
///
/// Key behaviours:
/// - Disk files: size checked via `std::fs::metadata` before any read.
/// - Stdin: buffered with a `Read::take` cap so allocation is bounded.
/// - UTF-8 validation via `std::str::from_utf8` with byte-offset reporting.
/// - All I/O errors are converted to [`CliError`] variants with exit code 2.
use std::io::Read as _;
use std::path::{Path, PathBuf};

use ndarray::ArrayD;
use rag_core::{LabelVolume, ProbabilityVolume};
use serde::{Deserialize, Serialize};

use crate::cli::PathOrStdin;
use crate::error::CliError;

// ---------------------------------------------------------------------------
// VolumeFile: the reference JSON interchange format
// ---------------------------------------------------------------------------

/// A dense N-D label/probability volume pair, flattened to JSON. This is a
/// reference stand-in for the HDF5/watershed pipeline a real deployment
/// would use; see the design notes for why that pipeline is out of scope
/// for `rag-core` itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeFile {
    pub shape: Vec<usize>,
    pub labels: Vec<i64>,
    #[serde(default)]
    pub probabilities: Vec<f64>,
    #[serde(default)]
    pub exclusion: Option<Vec<i64>>,
    #[serde(default)]
    pub ground_truth: Option<Vec<i64>>,
}

impl VolumeFile {
    /// Reshapes `labels` into a dense [`LabelVolume`].
    pub fn label_volume(&self) -> Result<LabelVolume, CliError> {
        flat_to_array(&self.shape, self.labels.clone(), "labels")
    }

    /// Reshapes `probabilities` into a dense [`ProbabilityVolume`]. Defaults
    /// to all zeros (shape-correct) when the field was omitted, so files
    /// produced by `inspect`/`init` without a boundary-probability pass can
    /// still round-trip through `agglomerate`.
    pub fn probability_volume(&self) -> Result<ProbabilityVolume, CliError> {
        let voxels: usize = self.shape.iter().product();
        let flat = if self.probabilities.is_empty() {
            vec![0.0; voxels]
        } else {
            self.probabilities.clone()
        };
        flat_to_array(&self.shape, flat, "probabilities")
    }

    /// Reshapes `exclusion`, if present, into a dense [`LabelVolume`].
    pub fn exclusion_volume(&self) -> Result<Option<LabelVolume>, CliError> {
        self.exclusion
            .clone()
            .map(|flat| flat_to_array(&self.shape, flat, "exclusion"))
            .transpose()
    }

    /// Reshapes `ground_truth`, if present, into a dense [`LabelVolume`].
    pub fn ground_truth_volume(&self) -> Result<Option<LabelVolume>, CliError> {
        self.ground_truth
            .clone()
            .map(|flat| flat_to_array(&self.shape, flat, "ground_truth"))
            .transpose()
    }

    /// Builds a `VolumeFile` from a computed segmentation, ready to write
    /// back out with [`write_json`].
    pub fn from_label_volume(labels: &LabelVolume) -> Self {
        VolumeFile {
            shape: labels.shape().to_vec(),
            labels: labels.iter().copied().collect(),
            probabilities: Vec::new(),
            exclusion: None,
            ground_truth: None,
        }
    }

    /// Builds a `VolumeFile` carrying a probability array (e.g. a UCM) in
    /// the `probabilities` field, with a zeroed `labels` field of matching
    /// shape.
    pub fn from_probability_volume(probs: &ProbabilityVolume) -> Self {
        VolumeFile {
            shape: probs.shape().to_vec(),
            labels: vec![0; probs.len()],
            probabilities: probs.iter().copied().collect(),
            exclusion: None,
            ground_truth: None,
        }
    }
}

fn flat_to_array<T: Clone>(shape: &[usize], flat: Vec<T>, field: &str) -> Result<ArrayD<T>, CliError> {
    let expected: usize = shape.iter().product();
    if flat.len() != expected {
        return Err(CliError::ParseFailed {
            source: "volume".to_owned(),
            detail: format!("`{field}` has {} elements, shape {shape:?} expects {expected}", flat.len()),
        });
    }
    ArrayD::from_shape_vec(ndarray::IxDyn(shape), flat).map_err(|e| CliError::ParseFailed {
        source: "volume".to_owned(),
        detail: format!("`{field}`: {e}"),
    })
}

/// Parses a `VolumeFile` from its JSON text, labeling parse errors with
/// `label` (typically the source path) for the resulting [`CliError`].
pub fn parse_volume_file(content: &str, label: &str) -> Result<VolumeFile, CliError> {
    serde_json::from_str(content).map_err(|e| CliError::ParseFailed {
        source: label.to_owned(),
        detail: e.to_string(),
    })
}

/// Serializes any `Serialize` value to pretty JSON, labeling failures with
/// `label` for the resulting [`CliError`].
pub fn to_json_string<T: Serialize>(value: &T, label: &str) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::ParseFailed {
        source: label.to_owned(),
        detail: e.to_string(),
    })
}

/// Writes `content` to `destination`, or to stdout when `destination` is
/// `None`.
pub fn write_output(content: &str, destination: Option<&Path>) -> Result<(), CliError> {
    match destination {
        Some(path) => std::fs::write(path, content).map_err(|e| io_error_to_cli(&e, path)),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A human-readable label for an input source, used in error messages:
/// the path, or `"-"` for stdin.
pub fn source_label(source: &PathOrStdin) -> String {
    match source {
        PathOrStdin::Path(path) => path.display().to_string(),
        PathOrStdin::Stdin => "-".to_owned(),
    }
}

/// Reads the entire contents of `source` into a `String`.
///
/// For disk files the file length is checked against `max_size` via
/// `std::fs::metadata` before any bytes are read. For stdin a capped reader
/// (`Read::take`) is used so that the allocation is bounded.
///
/// # Errors
///
/// Returns [`CliError`] (exit code 2) for:
/// - file not found
/// - permission denied
/// - file exceeds `max_size`
/// - stdin stream exceeds `max_size`
/// - any other I/O error
/// - invalid UTF-8 (includes byte offset of the first bad sequence)
pub fn read_input(source: &PathOrStdin, max_size: u64) -> Result<String, CliError> {
    match source {
        PathOrStdin::Path(path) => read_file(path, max_size),
        PathOrStdin::Stdin => read_stdin(max_size),
    }
}

// ---------------------------------------------------------------------------
// Disk file reading
// ---------------------------------------------------------------------------

/// Reads a disk file, enforcing the size limit and UTF-8 requirement.
fn read_file(path: &PathBuf, max_size: u64) -> Result<String, CliError> {
    // Size check via metadata — no allocation until we know it's within bounds.
    let file_size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            return Err(io_error_to_cli(&e, path));
        }
    };

    if file_size > max_size {
        return Err(CliError::FileTooLarge {
            source: path.display().to_string(),
            limit: max_size,
            actual: Some(file_size),
        });
    }

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            return Err(io_error_to_cli(&e, path));
        }
    };

    bytes_to_string(&bytes, &path.display().to_string())
}

/// Maps a `std::io::Error` arising from a disk-file operation to a [`CliError`].
fn io_error_to_cli(e: &std::io::Error, path: &Path) -> CliError {
    match e.kind() {
        std::io::ErrorKind::NotFound => CliError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => CliError::PermissionDenied {
            path: path.to_path_buf(),
        },
        // All other I/O error kinds are wrapped in the generic IoError variant.
        // We list a few common ones explicitly to silence the exhaustiveness
        // lint while still routing everything unknown to IoError.
        std::io::ErrorKind::ConnectionRefused
        | std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::HostUnreachable
        | std::io::ErrorKind::NetworkUnreachable
        | std::io::ErrorKind::ConnectionAborted
        | std::io::ErrorKind::NotConnected
        | std::io::ErrorKind::AddrInUse
        | std::io::ErrorKind::AddrNotAvailable
        | std::io::ErrorKind::NetworkDown
        | std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::AlreadyExists
        | std::io::ErrorKind::WouldBlock
        | std::io::ErrorKind::NotADirectory
        | std::io::ErrorKind::IsADirectory
        | std::io::ErrorKind::DirectoryNotEmpty
        | std::io::ErrorKind::ReadOnlyFilesystem
        | std::io::ErrorKind::StaleNetworkFileHandle
        | std::io::ErrorKind::InvalidInput
        | std::io::ErrorKind::InvalidData
        | std::io::ErrorKind::TimedOut
        | std::io::ErrorKind::WriteZero
        | std::io::ErrorKind::StorageFull
        | std::io::ErrorKind::NotSeekable
        | std::io::ErrorKind::QuotaExceeded
        | std::io::ErrorKind::FileTooLarge
        | std::io::ErrorKind::ResourceBusy
        | std::io::ErrorKind::ExecutableFileBusy
        | std::io::ErrorKind::Deadlock
        | std::io::ErrorKind::CrossesDevices
        | std::io::ErrorKind::TooManyLinks
        | std::io::ErrorKind::ArgumentListTooLong
        | std::io::ErrorKind::Interrupted
        | std::io::ErrorKind::Unsupported
        | std::io::ErrorKind::UnexpectedEof
        | std::io::ErrorKind::OutOfMemory
        | std::io::ErrorKind::Other
        | _ => CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Stdin reading
// ---------------------------------------------------------------------------

/// Reads the entire stdin stream, capped at `max_size` bytes.
///
/// Uses `Read::take` so the buffer allocation is bounded. If the stream
/// produces exactly `max_size` bytes we perform one final byte read to
/// distinguish "exactly at the limit" from "over the limit".
fn read_stdin(max_size: u64) -> Result<String, CliError> {
    let stdin = std::io::stdin();
    let handle = stdin.lock();

    // Read at most max_size bytes; allocate no more.
    let mut limited = handle.take(max_size);
    let mut buf: Vec<u8> = Vec::new();

    limited
        .read_to_end(&mut buf)
        .map_err(|e| CliError::StdinReadError {
            detail: e.to_string(),
        })?;

    // If we read exactly max_size bytes the stream may still have more data.
    // Attempt to read one additional byte to detect overflow.
    if buf.len() as u64 == max_size {
        let stdin2 = std::io::stdin();
        let mut handle2 = stdin2.lock();
        let mut probe = [0u8; 1];
        let extra = handle2
            .read(&mut probe)
            .map_err(|e| CliError::StdinReadError {
                detail: e.to_string(),
            })?;
        if extra > 0 {
            return Err(CliError::FileTooLarge {
                source: "-".to_owned(),
                limit: max_size,
                actual: None,
            });
        }
    }

    bytes_to_string(&buf, "-")
}

// ---------------------------------------------------------------------------
// UTF-8 conversion
// ---------------------------------------------------------------------------

/// Converts a byte buffer to a `String`, returning a [`CliError`] with the
/// byte offset of the first invalid sequence on failure.
fn bytes_to_string(bytes: &[u8], source_label: &str) -> Result<String, CliError> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_owned()),
        Err(e) => Err(CliError::InvalidUtf8 {
            source: source_label.to_owned(),
            byte_offset: e.valid_up_to(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
