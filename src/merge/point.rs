//! Point merger: resolves two points sharing an id into one.
//!
//! A pure function over its inputs: the base point is cloned into a
//! working copy, the decision sequence below runs, and the working copy
//! is returned together with an optional conflict node.
//!
//! 1. Scalar fields — edit lock beats everything, then
//!    `overwrite_points` decides replace vs retain. Exactly one scalar
//!    resolution is logged per merged point.
//! 2. Missing-measure pruning (`overwrite_missing`) — runs first so the
//!    measure merge operates on the pruned set. The reference measure
//!    survives pruning unless `overwrite_reference`.
//! 3. Measure merge — every incoming measure is resolved against the
//!    working copy by the measure merger.
//! 4. Reference repair — after all structural edits, a dangling
//!    reference marker is reassigned, preferring the incoming point's
//!    reference serial.

use crate::merge::measure::merge_measure;
use crate::merge::policy::MergePolicy;
use crate::merge::report::{PointConflicts, PointLog, Resolution};
use crate::model::{Point, SerialNumber};

/// Merge `incoming` into a working copy of `base` under `policy`.
///
/// Inputs are not mutated. The returned point upholds the reference
/// invariant: exactly one designated reference, present in the measure
/// set.
#[must_use]
pub fn merge_point(
    base: &Point,
    incoming: &Point,
    policy: &MergePolicy,
) -> (Point, Option<PointConflicts>) {
    let mut working = base.clone();
    let mut log = PointLog::new(incoming.id.clone(), policy.report);

    merge_scalars(&mut working, incoming, policy, &mut log);
    remove_missing(&mut working, incoming, policy, &mut log);
    for measure in incoming.measures() {
        merge_measure(&mut working, incoming, measure, policy, &mut log);
    }
    working.ensure_reference(Some(incoming.reference_serial()));

    (working, log.finish())
}

/// Step 1: scalar fields. Edit lock wins, then `overwrite_points`.
fn merge_scalars(working: &mut Point, incoming: &Point, policy: &MergePolicy, log: &mut PointLog) {
    if working.edit_lock {
        log.resolve(Resolution::RetainedEditLock);
    } else if policy.overwrite_points {
        copy_scalars(working, incoming);
        log.resolve(Resolution::ReplacedPoints);
    } else {
        log.resolve(Resolution::RetainedPoints);
    }
}

/// Copy every scalar field from `incoming` onto the working copy.
/// The measure set and reference marker are untouched.
fn copy_scalars(working: &mut Point, incoming: &Point) {
    working.point_type = incoming.point_type;
    working.chooser.clone_from(&incoming.chooser);
    working.edit_lock = incoming.edit_lock;
    working.ignored = incoming.ignored;
    working.apriori_surface_point = incoming.apriori_surface_point;
    working.adjusted_surface_point = incoming.adjusted_surface_point;
    working.apriori_surface_point_source = incoming.apriori_surface_point_source;
    working
        .apriori_surface_point_source_file
        .clone_from(&incoming.apriori_surface_point_source_file);
    working.apriori_radius_source = incoming.apriori_radius_source;
    working
        .apriori_radius_source_file
        .clone_from(&incoming.apriori_radius_source_file);
}

/// Step 2: prune working measures whose serial number is absent from
/// the incoming point. Only active under `overwrite_missing`.
fn remove_missing(working: &mut Point, incoming: &Point, policy: &MergePolicy, log: &mut PointLog) {
    if !policy.overwrite_missing {
        return;
    }
    let missing: Vec<SerialNumber> = working
        .measures()
        .iter()
        .map(|m| m.serial().clone())
        .filter(|serial| !incoming.contains(serial))
        .collect();

    for serial in missing {
        let locked = working.measure(&serial).is_some_and(|m| m.edit_lock);
        if locked {
            // Edit locks can never be overridden by a policy flag,
            // deletion included.
            log.resolve_measure(&serial, Resolution::RetainedEditLock);
        } else if working.is_reference(&serial) && !policy.overwrite_reference {
            log.resolve_measure(&serial, Resolution::RetainedReference);
        } else {
            working.remove_measure(&serial);
            log.resolve_measure(&serial, Resolution::RemovedMissing);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
