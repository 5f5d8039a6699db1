//! Merge policy: the immutable value that decides every conflict.
//!
//! Policy is threaded explicitly through each merge call — never held
//! as ambient state — so per-point and per-measure decisions depend
//! only on their inputs.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DuplicateMode
// ---------------------------------------------------------------------------

/// What to do when the same point id appears in more than one source
/// network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateMode {
    /// Fail the merge; duplicate point ids are a user error.
    #[default]
    Error,
    /// Merge duplicate points under the overwrite flags.
    Merge,
}

impl fmt::Display for DuplicateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

// ---------------------------------------------------------------------------
// MergePolicy
// ---------------------------------------------------------------------------

/// The conflict-resolution policy for one merge call.
///
/// The `overwrite_*` flags are only meaningful when
/// `duplicates == DuplicateMode::Merge`; [`MergePolicy::normalized`]
/// clears them otherwise. Edit-locked records are never overridden by
/// any flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePolicy {
    /// Duplicate point-id handling.
    pub duplicates: DuplicateMode,

    /// Replace scalar point fields from the incoming point.
    pub overwrite_points: bool,

    /// Replace conflicting non-reference measures from the incoming point.
    pub overwrite_measures: bool,

    /// Allow the reference measure to be replaced, removed, or
    /// re-designated.
    pub overwrite_reference: bool,

    /// Remove base measures whose serial number is absent from the
    /// incoming point.
    pub overwrite_missing: bool,

    /// Record conflict resolutions in the report.
    pub report: bool,
}

impl MergePolicy {
    /// Policy that fails on duplicate point ids (the default).
    #[must_use]
    pub fn error_on_duplicates() -> Self {
        Self::default()
    }

    /// Policy that merges duplicate points, all overwrite flags off.
    #[must_use]
    pub fn merge_duplicates() -> Self {
        Self {
            duplicates: DuplicateMode::Merge,
            ..Self::default()
        }
    }

    /// Return a copy with the overwrite flags cleared unless duplicate
    /// points are being merged. Reporting is unaffected.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.duplicates == DuplicateMode::Merge {
            self
        } else {
            Self {
                duplicates: self.duplicates,
                report: self.report,
                ..Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_error() {
        assert_eq!(MergePolicy::default().duplicates, DuplicateMode::Error);
    }

    #[test]
    fn normalized_clears_overwrite_flags_in_error_mode() {
        let policy = MergePolicy {
            duplicates: DuplicateMode::Error,
            overwrite_points: true,
            overwrite_measures: true,
            overwrite_reference: true,
            overwrite_missing: true,
            report: true,
        };
        let norm = policy.normalized();
        assert!(!norm.overwrite_points);
        assert!(!norm.overwrite_measures);
        assert!(!norm.overwrite_reference);
        assert!(!norm.overwrite_missing);
        assert!(norm.report, "reporting must survive normalization");
    }

    #[test]
    fn normalized_keeps_flags_in_merge_mode() {
        let policy = MergePolicy {
            duplicates: DuplicateMode::Merge,
            overwrite_points: true,
            ..MergePolicy::default()
        };
        assert_eq!(policy.normalized(), policy);
    }

    #[test]
    fn duplicate_mode_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&DuplicateMode::Merge).unwrap(),
            "\"merge\""
        );
        let mode: DuplicateMode = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(mode, DuplicateMode::Error);
    }
}
