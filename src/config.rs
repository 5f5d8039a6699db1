//! Repository configuration (`tienet.toml`).
//!
//! Supplies default merge-policy flags so a project can pin its merge
//! conventions in one place. CLI flags override the file; a missing
//! file means all defaults (no error).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::merge::policy::{DuplicateMode, MergePolicy};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "tienet.toml";

// ---------------------------------------------------------------------------
// TienetConfig
// ---------------------------------------------------------------------------

/// Top-level tienet configuration.
///
/// Parsed from `tienet.toml`. Missing fields use defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TienetConfig {
    /// Default merge-policy flags.
    #[serde(default)]
    pub merge: MergeDefaults,
}

/// Default merge-policy flags.
///
/// ```toml
/// [merge]
/// duplicates = "merge"
/// overwrite_measures = true
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeDefaults {
    /// Duplicate point-id handling (default: `error`).
    #[serde(default)]
    pub duplicates: DuplicateMode,

    /// Replace scalar point fields from incoming points.
    #[serde(default)]
    pub overwrite_points: bool,

    /// Replace conflicting non-reference measures.
    #[serde(default)]
    pub overwrite_measures: bool,

    /// Allow the reference measure to be replaced or re-designated.
    #[serde(default)]
    pub overwrite_reference: bool,

    /// Remove base measures absent from incoming points.
    #[serde(default)]
    pub overwrite_missing: bool,
}

impl MergeDefaults {
    /// Build a [`MergePolicy`] from these defaults; `report` comes from
    /// the invocation (a log destination was given), not the file.
    #[must_use]
    pub const fn to_policy(&self, report: bool) -> MergePolicy {
        MergePolicy {
            duplicates: self.duplicates,
            overwrite_points: self.overwrite_points,
            overwrite_measures: self.overwrite_measures,
            overwrite_reference: self.overwrite_reference,
            overwrite_missing: self.overwrite_missing,
            report,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// A configuration file could not be loaded or parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    /// Path of the file, if known.
    pub path: Option<PathBuf>,
    /// Human-readable description of the problem.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "config error in '{}': {}", path.display(), self.message),
            None => write!(f, "config error: {}", self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load configuration from `path`, or from [`CONFIG_FILE`] in the
/// working directory when `path` is `None`.
///
/// A missing file yields the default configuration; an unreadable or
/// malformed file is an error.
///
/// # Errors
/// Fails if the file exists but cannot be read or parsed.
pub fn load(path: Option<&Path>) -> Result<TienetConfig, ConfigError> {
    let path = path.map_or_else(|| PathBuf::from(CONFIG_FILE), Path::to_path_buf);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(TienetConfig::default());
        }
        Err(err) => {
            return Err(ConfigError {
                path: Some(path),
                message: err.to_string(),
            });
        }
    };
    toml::from_str(&text).map_err(|err| ConfigError {
        path: Some(path),
        message: err.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
