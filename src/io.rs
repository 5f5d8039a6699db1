//! JSON serialization boundary for networks and reports.
//!
//! Everything inside the merge engine works on in-memory records; this
//! module is the only place files are read or written. Networks
//! deserialize through the validating document shape in the model, so
//! a loaded [`Network`] always satisfies its structural invariants.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::merge::report::{ConflictReport, DuplicateReport};
use crate::model::Network;

// ---------------------------------------------------------------------------
// IoError
// ---------------------------------------------------------------------------

/// A file at the serialization boundary could not be read or written.
#[derive(Debug)]
pub enum IoError {
    /// The file could not be opened or read.
    Read {
        /// Path of the file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The file could not be created or written.
    Write {
        /// Path of the file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The file's contents are not a valid network document.
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// Parser or validation detail.
        detail: String,
    },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read '{}': {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "failed to write '{}': {source}", path.display())
            }
            Self::Parse { path, detail } => {
                write!(f, "'{}' is not a valid network: {detail}", path.display())
            }
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Parse { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Readers / writers
// ---------------------------------------------------------------------------

/// Load and validate a network from a JSON file.
///
/// # Errors
/// Fails if the file cannot be read, is not valid JSON, or violates a
/// structural invariant (duplicate ids, empty point, dangling
/// reference).
pub fn read_network(path: &Path) -> Result<Network, IoError> {
    let file = File::open(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|err| IoError::Parse {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })
}

/// Write a network to a JSON file.
///
/// # Errors
/// Fails if the file cannot be created or written.
pub fn write_network(path: &Path, network: &Network) -> Result<(), IoError> {
    write_json(path, network)
}

/// Write a merge conflict report to a JSON file.
///
/// # Errors
/// Fails if the file cannot be created or written.
pub fn write_conflict_report(path: &Path, report: &ConflictReport) -> Result<(), IoError> {
    write_json(path, report)
}

/// Write an ERROR-mode duplicate report to a JSON file.
///
/// # Errors
/// Fails if the file cannot be created or written.
pub fn write_duplicate_report(path: &Path, report: &DuplicateReport) -> Result<(), IoError> {
    write_json(path, report)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IoError> {
    let map_io = |source| IoError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(map_io)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|err| IoError::Write {
        path: path.to_path_buf(),
        source: err.into(),
    })?;
    writer.write_all(b"\n").map_err(map_io)?;
    writer.flush().map_err(map_io)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
