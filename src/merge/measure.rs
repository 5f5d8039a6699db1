//! Measure merger: resolves one incoming measure against the base
//! point's measure set.
//!
//! Two paths:
//!
//! - **Add**: the base point has no measure for the serial number — the
//!   incoming measure is copied in, and promoted to reference when it
//!   was the incoming point's reference and the policy allows reference
//!   overwrites.
//! - **Conflict**: the base point already has a measure for the serial
//!   number — edit lock beats everything, the reference is protected
//!   unless `overwrite_reference`, and other measures follow
//!   `overwrite_measures`. A replace is an in-place upsert: the point
//!   is never left without the measure mid-function, measure order
//!   stays stable, and the reference marker (keyed by serial number)
//!   stays resolvable across the swap.

use crate::merge::policy::MergePolicy;
use crate::merge::report::{PointLog, Resolution};
use crate::model::{Measure, Point};

/// Resolve `incoming` against the base point's measure set.
///
/// `incoming_point` is the point that owns `incoming`; it is consulted
/// only to decide reference promotion.
pub(crate) fn merge_measure(
    base_point: &mut Point,
    incoming_point: &Point,
    incoming: &Measure,
    policy: &MergePolicy,
    log: &mut PointLog,
) {
    let serial = incoming.serial();
    let Some(base_measure) = base_point.measure(serial) else {
        add_measure(base_point, incoming_point, incoming, policy);
        return;
    };

    // An edit-locked measure is never replaced, whatever the flags say.
    if base_measure.edit_lock {
        log.resolve_measure(serial, Resolution::RetainedEditLock);
        return;
    }

    if base_point.is_reference(serial) {
        if policy.overwrite_reference {
            replace_measure(base_point, incoming_point, incoming, policy);
            log.resolve_measure(serial, Resolution::ReplacedReference);
        } else {
            log.resolve_measure(serial, Resolution::RetainedReference);
        }
    } else if policy.overwrite_measures {
        replace_measure(base_point, incoming_point, incoming, policy);
        log.resolve_measure(serial, Resolution::ReplacedMeasures);
    } else {
        log.resolve_measure(serial, Resolution::RetainedMeasures);
    }
}

/// Replace the base measure for `incoming`'s serial. Runs the add path,
/// whose upsert swaps the measure in place, so reference promotion is
/// applied uniformly and order is preserved.
fn replace_measure(
    base_point: &mut Point,
    incoming_point: &Point,
    incoming: &Measure,
    policy: &MergePolicy,
) {
    add_measure(base_point, incoming_point, incoming, policy);
}

/// Copy `incoming` into the base point, promoting it to reference when
/// it was the incoming point's reference and the policy allows it.
pub(crate) fn add_measure(
    base_point: &mut Point,
    incoming_point: &Point,
    incoming: &Measure,
    policy: &MergePolicy,
) {
    base_point.upsert_measure(incoming.clone());
    if policy.overwrite_reference && incoming_point.is_reference(incoming.serial()) {
        base_point.mark_reference(incoming.serial().clone());
    }
}
