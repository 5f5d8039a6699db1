//! Record model: networks, points, and measures, with their
//! structural invariants.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Network`] | Named, ordered collection of points for one target body |
//! | [`Point`] | One ground location; owns measures, designates a reference |
//! | [`Measure`] | One image's observation of a point |
//! | [`IntegrityError`] | A violated structural invariant |
//!
//! Invariants enforced here and checked at the serialization boundary:
//! point ids unique within a network, serial numbers unique within a
//! point, every point non-empty with a resolvable reference measure.

use std::fmt;

mod measure;
mod network;
mod point;
pub mod types;

pub use measure::Measure;
pub use network::Network;
pub use point::Point;
pub use types::{
    NetworkId, PointId, PointType, RadiusSource, SerialNumber, SurfacePoint, SurfacePointSource,
    ValidationError,
};

// ---------------------------------------------------------------------------
// IntegrityError
// ---------------------------------------------------------------------------

/// A structural invariant of the record model was violated.
///
/// Surfaced when loading a malformed document, or by [`Point`] editing
/// operations that would leave the model inconsistent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityError {
    /// A point has no measures.
    EmptyPoint {
        /// The offending point.
        point: PointId,
    },

    /// A point contains two measures with the same serial number.
    DuplicateMeasure {
        /// The offending point.
        point: PointId,
        /// The duplicated serial number.
        serial: SerialNumber,
    },

    /// A point's reference marker names a serial number that is not in
    /// its measure set.
    DanglingReference {
        /// The offending point.
        point: PointId,
        /// The unresolvable serial number.
        serial: SerialNumber,
    },

    /// A network contains two points with the same id.
    DuplicatePoint {
        /// The duplicated point id.
        point: PointId,
    },

    /// An operation named a serial number the point does not contain.
    UnknownMeasure {
        /// The point that was being edited.
        point: PointId,
        /// The serial number that was not found.
        serial: SerialNumber,
    },
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPoint { point } => {
                write!(f, "point '{point}' has no measures")
            }
            Self::DuplicateMeasure { point, serial } => {
                write!(
                    f,
                    "point '{point}' contains serial number '{serial}' more than once"
                )
            }
            Self::DanglingReference { point, serial } => {
                write!(
                    f,
                    "point '{point}' designates reference serial '{serial}' but has no such measure"
                )
            }
            Self::DuplicatePoint { point } => {
                write!(f, "network contains point id '{point}' more than once")
            }
            Self::UnknownMeasure { point, serial } => {
                write!(f, "point '{point}' has no measure for serial '{serial}'")
            }
        }
    }
}

impl std::error::Error for IntegrityError {}
