//! A control point: one ground location observed in multiple images.

use serde::{Deserialize, Serialize};

use super::measure::Measure;
use super::types::{PointId, PointType, RadiusSource, SerialNumber, SurfacePoint, SurfacePointSource};
use super::IntegrityError;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A single ground location observed in two or more images.
///
/// A point owns an ordered collection of [`Measure`]s, unique by serial
/// number, and designates exactly one of them as the **reference
/// measure** — the primary observation used as the geometric anchor.
///
/// The reference is stored as a serial number, not as an owning copy or
/// an index: it resolves by lookup into the measure collection. This
/// makes delete-then-reinsert of a measure safe — replacing the measure
/// for a serial never invalidates the marker. Removing the reference
/// measure outright leaves the marker dangling; that is a transient
/// state that [`Point::ensure_reference`] repairs once structural edits
/// are complete, and [`Point::validate`] rejects it at rest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// The point identifier, unique within its owning network.
    pub id: PointId,

    /// The kind of control point.
    #[serde(default)]
    pub point_type: PointType,

    /// Name of the application or user that last chose this point.
    #[serde(default)]
    pub chooser: String,

    /// Whether this point's scalar fields are immutable to merge policy.
    #[serde(default)]
    pub edit_lock: bool,

    /// Whether this point is excluded from adjustment.
    #[serde(default)]
    pub ignored: bool,

    /// Apriori body-fixed surface position, if known.
    #[serde(default)]
    pub apriori_surface_point: Option<SurfacePoint>,

    /// Adjusted body-fixed surface position, if solved.
    #[serde(default)]
    pub adjusted_surface_point: Option<SurfacePoint>,

    /// Where the apriori surface position came from.
    #[serde(default)]
    pub apriori_surface_point_source: SurfacePointSource,

    /// File the apriori surface position was read from, if any.
    #[serde(default)]
    pub apriori_surface_point_source_file: String,

    /// Where the apriori radius came from.
    #[serde(default)]
    pub apriori_radius_source: RadiusSource,

    /// File the apriori radius was read from, if any.
    #[serde(default)]
    pub apriori_radius_source_file: String,

    /// The measures, ordered, unique by serial number.
    measures: Vec<Measure>,

    /// Serial number of the reference measure.
    reference: SerialNumber,
}

impl Point {
    /// Create a point from its first measure, which becomes the
    /// reference. A point can never be constructed without a measure.
    #[must_use]
    pub fn new(id: PointId, first: Measure) -> Self {
        let reference = first.serial().clone();
        Self {
            id,
            point_type: PointType::default(),
            chooser: String::new(),
            edit_lock: false,
            ignored: false,
            apriori_surface_point: None,
            adjusted_surface_point: None,
            apriori_surface_point_source: SurfacePointSource::default(),
            apriori_surface_point_source_file: String::new(),
            apriori_radius_source: RadiusSource::default(),
            apriori_radius_source_file: String::new(),
            measures: vec![first],
            reference,
        }
    }

    /// Return the measures in order.
    #[must_use]
    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    /// Return the number of measures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.measures.len()
    }

    /// Return `true` if the point has no measures.
    ///
    /// A valid point is never empty; this can only be observed mid-edit
    /// or on a malformed document before validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    /// Return the measure for `serial`, if present.
    #[must_use]
    pub fn measure(&self, serial: &SerialNumber) -> Option<&Measure> {
        self.measures.iter().find(|m| m.serial() == serial)
    }

    /// Return `true` if the point has a measure for `serial`.
    #[must_use]
    pub fn contains(&self, serial: &SerialNumber) -> bool {
        self.measure(serial).is_some()
    }

    /// Insert a measure, replacing any existing measure with the same
    /// serial number in place (order preserved). Returns the replaced
    /// measure, if any.
    pub fn upsert_measure(&mut self, measure: Measure) -> Option<Measure> {
        match self
            .measures
            .iter()
            .position(|m| m.serial() == measure.serial())
        {
            Some(pos) => Some(std::mem::replace(&mut self.measures[pos], measure)),
            None => {
                self.measures.push(measure);
                None
            }
        }
    }

    /// Remove and return the measure for `serial`, if present.
    ///
    /// Removing the reference measure leaves the reference marker
    /// dangling until [`Point::ensure_reference`] runs.
    pub fn remove_measure(&mut self, serial: &SerialNumber) -> Option<Measure> {
        let pos = self.measures.iter().position(|m| m.serial() == serial)?;
        Some(self.measures.remove(pos))
    }

    /// Return the serial number of the reference measure.
    #[must_use]
    pub const fn reference_serial(&self) -> &SerialNumber {
        &self.reference
    }

    /// Resolve the reference measure, or `None` if the marker is
    /// dangling (transient mid-edit state).
    #[must_use]
    pub fn reference(&self) -> Option<&Measure> {
        self.measure(&self.reference)
    }

    /// Return `true` if `serial` designates the reference measure.
    #[must_use]
    pub fn is_reference(&self, serial: &SerialNumber) -> bool {
        &self.reference == serial
    }

    /// Designate the measure for `serial` as the reference.
    ///
    /// # Errors
    /// Returns [`IntegrityError::UnknownMeasure`] if the point has no
    /// measure for `serial`.
    pub fn set_reference(&mut self, serial: &SerialNumber) -> Result<(), IntegrityError> {
        if !self.contains(serial) {
            return Err(IntegrityError::UnknownMeasure {
                point: self.id.clone(),
                serial: serial.clone(),
            });
        }
        self.reference = serial.clone();
        Ok(())
    }

    /// Designate `serial` as the reference without checking membership.
    ///
    /// Callers must insert the corresponding measure in the same edit
    /// sequence; the marker is repaired by [`Point::ensure_reference`]
    /// regardless.
    pub(crate) fn mark_reference(&mut self, serial: SerialNumber) {
        self.reference = serial;
    }

    /// Repair a dangling reference marker after structural edits.
    ///
    /// If the marker resolves, nothing changes. Otherwise the marker is
    /// reassigned to `preferred` when that serial is present, else to
    /// the first remaining measure. A point left with zero measures
    /// cannot be repaired and keeps its dangling marker for
    /// [`Point::validate`] to reject.
    pub(crate) fn ensure_reference(&mut self, preferred: Option<&SerialNumber>) {
        if self.contains(&self.reference) {
            return;
        }
        if let Some(serial) = preferred
            && self.contains(serial)
        {
            self.reference = serial.clone();
            return;
        }
        if let Some(first) = self.measures.first() {
            self.reference = first.serial().clone();
        }
    }

    /// Check structural invariants: at least one measure, serial
    /// numbers unique, reference marker resolvable.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), IntegrityError> {
        if self.measures.is_empty() {
            return Err(IntegrityError::EmptyPoint {
                point: self.id.clone(),
            });
        }
        for (i, m) in self.measures.iter().enumerate() {
            if self.measures[..i].iter().any(|p| p.serial() == m.serial()) {
                return Err(IntegrityError::DuplicateMeasure {
                    point: self.id.clone(),
                    serial: m.serial().clone(),
                });
            }
        }
        if !self.contains(&self.reference) {
            return Err(IntegrityError::DanglingReference {
                point: self.id.clone(),
                serial: self.reference.clone(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
