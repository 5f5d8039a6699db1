//! Core identifier and enumeration types for control networks.
//!
//! Foundation types used throughout tienet: network, point, and image
//! identifiers, point-type and apriori-source enumerations, and the
//! body-fixed surface point.
//!
//! Identifiers are validated newtypes: construction checks format once,
//! after which the rest of the crate can treat them as well-formed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The maximum length of any identifier string.
const MAX_ID_LEN: usize = 256;

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Which identifier kind failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A network identifier.
    NetworkId,
    /// A control-point identifier.
    PointId,
    /// An image serial number.
    SerialNumber,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkId => write!(f, "network id"),
            Self::PointId => write!(f, "point id"),
            Self::SerialNumber => write!(f, "serial number"),
        }
    }
}

/// An identifier string failed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    /// Which identifier kind was being validated.
    pub kind: ErrorKind,
    /// The offending value.
    pub value: String,
    /// Why the value is invalid.
    pub reason: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}': {}", self.kind, self.value, self.reason)
    }
}

impl std::error::Error for ValidationError {}

fn validate_id(kind: ErrorKind, s: &str) -> Result<(), ValidationError> {
    if s.is_empty() {
        return Err(ValidationError {
            kind,
            value: s.to_owned(),
            reason: "must not be empty".to_owned(),
        });
    }
    if s.len() > MAX_ID_LEN {
        return Err(ValidationError {
            kind,
            value: s.to_owned(),
            reason: format!("must be at most {MAX_ID_LEN} bytes, got {}", s.len()),
        });
    }
    if s.chars().any(char::is_control) {
        return Err(ValidationError {
            kind,
            value: s.to_owned(),
            reason: "must not contain control characters".to_owned(),
        });
    }
    Ok(())
}

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier, validating format.
            ///
            /// # Errors
            /// Returns an error if the string is empty, too long, or
            /// contains control characters.
            pub fn new(s: &str) -> Result<Self, ValidationError> {
                validate_id($kind, s)?;
                Ok(Self(s.to_owned()))
            }

            /// Return the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                validate_id($kind, &s)?;
                Ok(Self(s))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_newtype!(
    /// A validated control-network identifier.
    NetworkId,
    ErrorKind::NetworkId
);

id_newtype!(
    /// A validated control-point identifier, unique within its network.
    PointId,
    ErrorKind::PointId
);

id_newtype!(
    /// A validated image serial number — the stable external identifier
    /// for one image, resolved by an external collaborator. Opaque here.
    SerialNumber,
    ErrorKind::SerialNumber
);

// ---------------------------------------------------------------------------
// PointType
// ---------------------------------------------------------------------------

/// The kind of control point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointType {
    /// Ground position known exactly; held fixed during adjustment.
    Fixed,
    /// Ground position known with uncertainty constraints.
    Constrained,
    /// Ground position entirely solved for.
    #[default]
    Free,
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Constrained => write!(f, "constrained"),
            Self::Free => write!(f, "free"),
        }
    }
}

// ---------------------------------------------------------------------------
// Apriori source enumerations
// ---------------------------------------------------------------------------

/// Where a point's apriori surface position came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfacePointSource {
    /// No apriori surface position recorded.
    #[default]
    None,
    /// Entered by a user.
    User,
    /// Averaged from the point's measures.
    AverageOfMeasures,
    /// Taken from the reference measure's geometry.
    Reference,
    /// Read from a basemap.
    Basemap,
    /// Produced by a bundle solution.
    BundleSolution,
}

/// Where a point's apriori radius came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RadiusSource {
    /// No apriori radius recorded.
    #[default]
    None,
    /// Entered by a user.
    User,
    /// Averaged from the point's measures.
    AverageOfMeasures,
    /// Taken from the target body's reference ellipsoid.
    Ellipsoid,
    /// Read from a digital elevation model.
    Dem,
    /// Produced by a bundle solution.
    BundleSolution,
}

// ---------------------------------------------------------------------------
// SurfacePoint
// ---------------------------------------------------------------------------

/// A body-fixed surface position, in kilometres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    /// Body-fixed X (km).
    pub x: f64,
    /// Body-fixed Y (km).
    pub y: f64,
    /// Body-fixed Z (km).
    pub z: f64,
}

impl SurfacePoint {
    /// Create a surface point from body-fixed coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
