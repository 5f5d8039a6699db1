//! The merge engine: folds an ordered list of control networks into
//! one consolidated network under an explicit [`MergePolicy`].
//!
//! # Pipeline
//!
//! 1. Validate targets — every source must name the base's target body
//!    (case-insensitive). Checked before anything else so a structural
//!    misuse surfaces ahead of duplicate noise.
//! 2. Duplicate pre-scan — only when `duplicates = Error`.
//! 3. Fold — the base is deep-copied, stamped with the caller's
//!    [`NetworkStamp`], and each subsequent network is merged in
//!    strictly left-to-right. Later networks win ties according to
//!    policy, not by value comparison, so input order matters.
//!
//! The fold is synchronous and single-threaded: each step's outcome
//! depends on the accumulated state of all prior merges. Within one
//! incoming network points are independent of each other, but nothing
//! here exploits that.

use serde::{Deserialize, Serialize};

use crate::error::MergeError;
use crate::model::{Network, NetworkId};

pub mod duplicates;
mod measure;
mod point;
pub mod policy;
pub mod report;

pub use duplicates::scan_duplicates;
pub use point::merge_point;
pub use policy::{DuplicateMode, MergePolicy};
pub use report::{
    ConflictReport, DuplicateEntry, DuplicateReport, MeasureResolution, NetworkConflicts,
    NetworkLog, PointConflicts, PointLog, Resolution,
};

// ---------------------------------------------------------------------------
// NetworkStamp
// ---------------------------------------------------------------------------

/// Metadata stamped onto the merged output network, overriding the base
/// network's own stamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStamp {
    /// Identifier for the merged network.
    pub network_id: NetworkId,
    /// Name of the user or application performing the merge.
    pub user_name: String,
    /// Creation timestamp for the merged network.
    pub created: String,
    /// Modification timestamp for the merged network.
    pub modified: String,
    /// Free-text description of the merged network.
    pub description: String,
}

impl NetworkStamp {
    fn apply(&self, network: &mut Network) {
        network.set_id(self.network_id.clone());
        network.user_name.clone_from(&self.user_name);
        network.created.clone_from(&self.created);
        network.modified.clone_from(&self.modified);
        network.description.clone_from(&self.description);
    }
}

// ---------------------------------------------------------------------------
// MergeOutcome
// ---------------------------------------------------------------------------

/// The result of a successful merge: the consolidated network and the
/// conflict report (empty unless `policy.report` and conflicts arose).
#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    /// The consolidated network.
    pub network: Network,
    /// Hierarchical record of every policy decision, pruned to
    /// non-trivial nodes.
    pub report: ConflictReport,
}

// ---------------------------------------------------------------------------
// merge_networks
// ---------------------------------------------------------------------------

/// Fold `sources` into one network. The first network is the base; each
/// subsequent network merges into the accumulating output in order.
///
/// # Errors
///
/// - [`MergeError::NoNetworks`] if `sources` is empty.
/// - [`MergeError::TargetMismatch`] if any source targets a different
///   body than the base.
/// - [`MergeError::DuplicatePoint`] / [`MergeError::DuplicatesFound`]
///   if `policy.duplicates` is [`DuplicateMode::Error`] and a point id
///   appears in more than one source.
///
/// Failure aborts the whole operation; no partial output is returned.
pub fn merge_networks(
    sources: &[Network],
    stamp: &NetworkStamp,
    policy: &MergePolicy,
) -> Result<MergeOutcome, MergeError> {
    let Some((base, rest)) = sources.split_first() else {
        return Err(MergeError::NoNetworks);
    };
    let policy = policy.normalized();

    for network in rest {
        if !base.same_target(network) {
            return Err(MergeError::TargetMismatch {
                network: network.id().clone(),
                expected: base.target().to_owned(),
                found: network.target().to_owned(),
            });
        }
    }

    if policy.duplicates == DuplicateMode::Error {
        scan_duplicates(sources, policy.report)?;
    }

    let mut output = base.clone();
    stamp.apply(&mut output);
    tracing::info!(
        base = %base.id(),
        sources = sources.len(),
        "merging networks into '{}'",
        stamp.network_id
    );

    let mut report = ConflictReport::default();
    for network in rest {
        tracing::info!(network = %network.id(), points = network.len(), "folding network");
        report.attach(merge_network(&mut output, network, &policy));
    }

    Ok(MergeOutcome {
        network: output,
        report,
    })
}

/// Fold one incoming network into the accumulating output.
///
/// Points with a known id go through the point merger and replace the
/// existing point in place; entirely new points are deep-copied in
/// without conflict logging.
fn merge_network(
    output: &mut Network,
    incoming: &Network,
    policy: &MergePolicy,
) -> Option<NetworkConflicts> {
    let mut log = NetworkLog::new(incoming.id().clone());

    for point in incoming.points() {
        if let Some(existing) = output.point(&point.id) {
            tracing::debug!(point = %point.id, "merging conflicting point");
            let (merged, node) = merge_point(existing, point, policy);
            log.attach(node);
            output.add_point(merged);
        } else {
            output.add_point(point.clone());
        }
    }

    log.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Property tests — merge laws
// ---------------------------------------------------------------------------

#[cfg(test)]
mod proptests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use crate::model::{Measure, Point, PointId, SerialNumber};

    fn nid(s: &str) -> NetworkId {
        NetworkId::new(s).unwrap()
    }

    fn stamp() -> NetworkStamp {
        NetworkStamp {
            network_id: nid("merged"),
            user_name: "prop".to_owned(),
            created: String::new(),
            modified: String::new(),
            description: String::new(),
        }
    }

    prop_compose! {
        fn arb_measure(serial_idx: u8)(
            sample in 0.0f64..1000.0,
            line in 0.0f64..1000.0,
            ignored in any::<bool>(),
            edit_lock in prop::bool::weighted(0.2),
        ) -> Measure {
            let mut m = Measure::new(
                SerialNumber::new(&format!("S{serial_idx}")).unwrap(),
                sample,
                line,
            );
            m.ignored = ignored;
            m.edit_lock = edit_lock;
            m
        }
    }

    fn arb_point(id_idx: u8) -> impl Strategy<Value = Point> {
        prop::collection::btree_set(0u8..8, 1..5)
            .prop_flat_map(move |serials: BTreeSet<u8>| {
                let serials: Vec<u8> = serials.into_iter().collect();
                let measures: Vec<_> = serials.iter().map(|&s| arb_measure(s)).collect();
                let count = serials.len();
                (measures, 0..count, prop::bool::weighted(0.1))
            })
            .prop_map(move |(measures, ref_idx, edit_lock)| {
                let mut it = measures.into_iter();
                let first = it.next().expect("at least one measure");
                let mut p = Point::new(
                    PointId::new(&format!("P{id_idx}")).unwrap(),
                    first,
                );
                for m in it {
                    p.upsert_measure(m);
                }
                let reference = p.measures()[ref_idx].serial().clone();
                p.mark_reference(reference);
                p.edit_lock = edit_lock;
                p
            })
    }

    fn arb_network(id: &'static str) -> impl Strategy<Value = Network> {
        prop::collection::btree_set(0u8..12, 0..6).prop_flat_map(move |ids: BTreeSet<u8>| {
            let points: Vec<_> = ids.into_iter().map(arb_point).collect();
            points.prop_map(move |points| {
                let mut net = Network::new(nid(id), "Mars");
                for p in points {
                    net.add_point(p);
                }
                net
            })
        })
    }

    fn arb_merge_policy() -> impl Strategy<Value = MergePolicy> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(points, measures, reference, missing)| MergePolicy {
                duplicates: DuplicateMode::Merge,
                overwrite_points: points,
                overwrite_measures: measures,
                overwrite_reference: reference,
                overwrite_missing: missing,
                report: true,
            },
        )
    }

    proptest! {
        /// The merged network contains the union of all source point ids.
        #[test]
        fn prop_union_of_point_ids(
            a in arb_network("a"),
            b in arb_network("b"),
            policy in arb_merge_policy(),
        ) {
            let out = merge_networks(&[a.clone(), b.clone()], &stamp(), &policy).unwrap();
            for source in [&a, &b] {
                for p in source.points() {
                    prop_assert!(
                        out.network.contains(&p.id),
                        "point id {} vanished from the merge", p.id
                    );
                }
            }
        }

        /// Merging a network with itself under full overwrite yields the
        /// same point content.
        #[test]
        fn prop_self_merge_idempotent(a in arb_network("a")) {
            let policy = MergePolicy {
                duplicates: DuplicateMode::Merge,
                overwrite_points: true,
                overwrite_measures: true,
                overwrite_reference: true,
                overwrite_missing: true,
                report: true,
            };
            let out = merge_networks(&[a.clone(), a.clone()], &stamp(), &policy).unwrap();
            prop_assert_eq!(out.network.points(), a.points());
        }

        /// Every merged point has exactly one resolvable reference and a
        /// non-empty measure set, for every policy combination.
        #[test]
        fn prop_merged_network_validates(
            a in arb_network("a"),
            b in arb_network("b"),
            c in arb_network("c"),
            policy in arb_merge_policy(),
        ) {
            let out = merge_networks(&[a, b, c], &stamp(), &policy).unwrap();
            prop_assert!(out.network.validate().is_ok());
        }

        /// Edit-locked base points keep their scalar fields, and
        /// edit-locked base measures keep their values and membership,
        /// regardless of overwrite flags.
        #[test]
        fn prop_edit_locks_hold(
            a in arb_network("a"),
            b in arb_network("b"),
            policy in arb_merge_policy(),
        ) {
            let out = merge_networks(&[a.clone(), b], &stamp(), &policy).unwrap();
            for base_point in a.points() {
                let merged = out.network.point(&base_point.id).unwrap();
                if base_point.edit_lock {
                    prop_assert_eq!(&merged.point_type, &base_point.point_type);
                    prop_assert_eq!(&merged.chooser, &base_point.chooser);
                    prop_assert!(merged.edit_lock);
                }
                for m in base_point.measures() {
                    if m.edit_lock {
                        let kept = merged.measure(m.serial());
                        prop_assert_eq!(kept, Some(m), "locked measure must survive unchanged");
                    }
                }
            }
        }
    }
}
