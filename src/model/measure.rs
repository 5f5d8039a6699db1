//! A control measure: one image's observation of a control point.

use serde::{Deserialize, Serialize};

use super::types::SerialNumber;

/// One image's observation of a control point, identified by the
/// image's serial number.
///
/// A measure is owned exclusively by exactly one [`Point`] and never
/// outlives it. The edit-lock flag makes the measure immutable to merge
/// policy: no overwrite flag can replace a locked measure.
///
/// [`Point`]: super::Point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Serial number of the image this measure was taken in.
    pub serial: SerialNumber,

    /// Sample (column) coordinate of the measurement, in pixels.
    pub sample: f64,

    /// Line (row) coordinate of the measurement, in pixels.
    pub line: f64,

    /// Whether this measure is excluded from adjustment.
    #[serde(default)]
    pub ignored: bool,

    /// Whether this measure is immutable to merge policy.
    #[serde(default)]
    pub edit_lock: bool,
}

impl Measure {
    /// Create an unlocked, non-ignored measure.
    #[must_use]
    pub const fn new(serial: SerialNumber, sample: f64, line: f64) -> Self {
        Self {
            serial,
            sample,
            line,
            ignored: false,
            edit_lock: false,
        }
    }

    /// Return the serial number of the image this measure observes.
    #[must_use]
    pub const fn serial(&self) -> &SerialNumber {
        &self.serial
    }

    /// Set the edit-lock flag, builder style.
    #[must_use]
    pub const fn locked(mut self, lock: bool) -> Self {
        self.edit_lock = lock;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serial(s: &str) -> SerialNumber {
        SerialNumber::new(s).unwrap()
    }

    #[test]
    fn new_measure_is_unlocked() {
        let m = Measure::new(serial("S1"), 10.0, 20.0);
        assert!(!m.edit_lock);
        assert!(!m.ignored);
        assert_eq!(m.serial().as_str(), "S1");
    }

    #[test]
    fn locked_builder_sets_flag() {
        let m = Measure::new(serial("S1"), 1.0, 2.0).locked(true);
        assert!(m.edit_lock);
    }

    #[test]
    fn serde_defaults_flags_to_false() {
        let m: Measure =
            serde_json::from_str(r#"{"serial":"S1","sample":1.5,"line":2.5}"#).unwrap();
        assert!(!m.ignored);
        assert!(!m.edit_lock);
        assert!((m.sample - 1.5).abs() < f64::EPSILON);
    }
}
