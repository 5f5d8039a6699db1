//! User-error type for the merge call.
//!
//! Defines [`MergeError`], the unified error for malformed merge input.
//! Every variant carries enough context to locate the offending input —
//! network ids, point ids, target names — and a short hint on how to
//! proceed. Policy-resolvable conflicts are never errors; they are
//! resolved deterministically and, when requested, recorded in the
//! conflict report.

use std::fmt;

use crate::merge::DuplicateReport;
use crate::model::{NetworkId, PointId};

// ---------------------------------------------------------------------------
// MergeError
// ---------------------------------------------------------------------------

/// A merge call failed on malformed input.
///
/// All variants are fatal to the whole merge: no partial output network
/// is ever produced.
#[derive(Debug)]
pub enum MergeError {
    /// The source list was empty.
    NoNetworks,

    /// A source network targets a different body than the base.
    TargetMismatch {
        /// The network whose target disagrees.
        network: NetworkId,
        /// The base network's target body.
        expected: String,
        /// The mismatched network's target body.
        found: String,
    },

    /// A duplicate point id was found while duplicates are disallowed
    /// and no report was requested.
    DuplicatePoint {
        /// The duplicated point id.
        point: PointId,
        /// The network the id was first seen in.
        source_network: NetworkId,
        /// The later network that also contains the id.
        add_network: NetworkId,
    },

    /// Duplicate point ids were found while duplicates are disallowed;
    /// the full collected report is attached for persistence.
    DuplicatesFound {
        /// Every collision found by the scan.
        report: DuplicateReport,
    },
}

impl MergeError {
    /// Return the collected duplicate report, if this error carries one.
    #[must_use]
    pub const fn duplicate_report(&self) -> Option<&DuplicateReport> {
        match self {
            Self::DuplicatesFound { report } => Some(report),
            _ => None,
        }
    }
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoNetworks => {
                write!(
                    f,
                    "no source networks supplied.\n  To fix: supply at least a base network and one network to merge into it."
                )
            }
            Self::TargetMismatch {
                network,
                expected,
                found,
            } => {
                write!(
                    f,
                    "network '{network}' targets '{found}' but the base network targets '{expected}'.\n  Networks of different target bodies cannot be merged."
                )
            }
            Self::DuplicatePoint {
                point,
                source_network,
                add_network,
            } => {
                write!(
                    f,
                    "network '{add_network}' contains point id '{point}' already present in network '{source_network}'.\n  To fix: re-run with duplicates=merge to merge conflicting points."
                )
            }
            Self::DuplicatesFound { report } => {
                write!(
                    f,
                    "source networks contain {} duplicate point id(s); see the duplicate report for details.\n  To fix: re-run with duplicates=merge to merge conflicting points.",
                    report.len()
                )
            }
        }
    }
}

impl std::error::Error for MergeError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::DuplicateEntry;

    fn nid(s: &str) -> NetworkId {
        NetworkId::new(s).unwrap()
    }

    #[test]
    fn display_no_networks() {
        let msg = format!("{}", MergeError::NoNetworks);
        assert!(msg.contains("no source networks"));
        assert!(msg.contains("To fix"));
    }

    #[test]
    fn display_target_mismatch_names_both_targets() {
        let err = MergeError::TargetMismatch {
            network: nid("net-b"),
            expected: "Mars".to_owned(),
            found: "Moon".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("net-b"));
        assert!(msg.contains("Mars"));
        assert!(msg.contains("Moon"));
    }

    #[test]
    fn display_duplicate_point_names_both_networks_and_id() {
        let err = MergeError::DuplicatePoint {
            point: PointId::new("P1").unwrap(),
            source_network: nid("net-a"),
            add_network: nid("net-b"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("P1"));
        assert!(msg.contains("net-a"));
        assert!(msg.contains("net-b"));
        assert!(msg.contains("duplicates=merge"));
    }

    #[test]
    fn display_duplicates_found_counts_entries() {
        let err = MergeError::DuplicatesFound {
            report: DuplicateReport {
                duplicates: vec![DuplicateEntry {
                    point_id: PointId::new("P1").unwrap(),
                    source_network: nid("net-a"),
                    add_network: nid("net-b"),
                }],
            },
        };
        let msg = format!("{err}");
        assert!(msg.contains("1 duplicate point id(s)"));
        assert!(err.duplicate_report().is_some());
    }
}
