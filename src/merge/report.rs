//! The conflict report: a nested, serializable record of every policy
//! decision made during a merge.
//!
//! The report is a three-level tree — network, point, measure group —
//! mirroring the structure of the merge itself. Nodes are built
//! eagerly through the [`NetworkLog`] and [`PointLog`] builders, but a
//! node only attaches to its parent when it carries at least one
//! substantive entry beyond its identifying keyword: `finish()` returns
//! `None` for trivial nodes and they are discarded.
//!
//! When reporting is disabled the builders record nothing, so the merge
//! code can log unconditionally.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{NetworkId, PointId, SerialNumber};

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Which rule resolved one conflict.
///
/// Serializes as its display string, e.g. `"retained: edit lock"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Resolution {
    /// The base record is edit-locked; no flag can override it.
    RetainedEditLock,
    /// Point scalars kept because `overwrite_points` is off.
    RetainedPoints,
    /// Point scalars copied from the incoming point.
    ReplacedPoints,
    /// Reference measure kept because `overwrite_reference` is off.
    RetainedReference,
    /// Reference measure replaced under `overwrite_reference`.
    ReplacedReference,
    /// Measure removed because its serial is absent from the incoming
    /// point and `overwrite_missing` is on.
    RemovedMissing,
    /// Measure kept because `overwrite_measures` is off.
    RetainedMeasures,
    /// Measure replaced under `overwrite_measures`.
    ReplacedMeasures,
}

impl Resolution {
    /// The stable report string for this resolution.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RetainedEditLock => "retained: edit lock",
            Self::RetainedPoints => "retained: overwrite-points disabled",
            Self::ReplacedPoints => "replaced: overwrite-points",
            Self::RetainedReference => "retained: overwrite-reference disabled",
            Self::ReplacedReference => "replaced: overwrite-reference",
            Self::RemovedMissing => "removed: overwrite-missing",
            Self::RetainedMeasures => "retained: overwrite-measures disabled",
            Self::ReplacedMeasures => "replaced: overwrite-measures",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Resolution> for String {
    fn from(r: Resolution) -> Self {
        r.as_str().to_owned()
    }
}

/// A report string did not name a known resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownResolution(pub String);

impl fmt::Display for UnknownResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown resolution '{}'", self.0)
    }
}

impl std::error::Error for UnknownResolution {}

impl FromStr for Resolution {
    type Err = UnknownResolution;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [Resolution; 8] = [
            Resolution::RetainedEditLock,
            Resolution::RetainedPoints,
            Resolution::ReplacedPoints,
            Resolution::RetainedReference,
            Resolution::ReplacedReference,
            Resolution::RemovedMissing,
            Resolution::RetainedMeasures,
            Resolution::ReplacedMeasures,
        ];
        ALL.into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownResolution(s.to_owned()))
    }
}

impl TryFrom<String> for Resolution {
    type Error = UnknownResolution;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// Report tree
// ---------------------------------------------------------------------------

/// How one conflicting measure was resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureResolution {
    /// Serial number of the conflicting measure.
    pub serial: SerialNumber,
    /// The rule that fired.
    pub resolution: Resolution,
}

/// Conflict record for one merged point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointConflicts {
    /// The point id both networks contained.
    pub point_id: PointId,
    /// Point-level (scalar) resolutions.
    #[serde(default)]
    pub resolutions: Vec<Resolution>,
    /// Per-measure resolutions.
    #[serde(default)]
    pub measures: Vec<MeasureResolution>,
}

/// Conflict records accumulated while folding one source network in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConflicts {
    /// Id of the source network that was folded in.
    pub network_id: NetworkId,
    /// Points that produced at least one resolution.
    pub points: Vec<PointConflicts>,
}

/// The full conflict report for one merge invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// One entry per folded network that produced conflicts.
    pub networks: Vec<NetworkConflicts>,
}

impl ConflictReport {
    /// Attach a network subtree if it is non-trivial.
    pub fn attach(&mut self, node: Option<NetworkConflicts>) {
        if let Some(node) = node {
            self.networks.push(node);
        }
    }

    /// Return `true` if no network produced any conflicts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Builder for one point's conflict record.
///
/// Records nothing when constructed disabled; `finish()` discards
/// trivial nodes either way.
#[derive(Debug)]
pub struct PointLog {
    point_id: PointId,
    resolutions: Vec<Resolution>,
    measures: Vec<MeasureResolution>,
    enabled: bool,
}

impl PointLog {
    /// Start a log for `point_id`; `enabled` gates all recording.
    #[must_use]
    pub fn new(point_id: PointId, enabled: bool) -> Self {
        Self {
            point_id,
            resolutions: Vec::new(),
            measures: Vec::new(),
            enabled,
        }
    }

    /// Record a point-level resolution.
    pub fn resolve(&mut self, resolution: Resolution) {
        if self.enabled {
            self.resolutions.push(resolution);
        }
    }

    /// Record a measure-level resolution.
    pub fn resolve_measure(&mut self, serial: &SerialNumber, resolution: Resolution) {
        if self.enabled {
            self.measures.push(MeasureResolution {
                serial: serial.clone(),
                resolution,
            });
        }
    }

    /// Yield the node, or `None` if it carries no resolutions.
    #[must_use]
    pub fn finish(self) -> Option<PointConflicts> {
        if self.resolutions.is_empty() && self.measures.is_empty() {
            return None;
        }
        Some(PointConflicts {
            point_id: self.point_id,
            resolutions: self.resolutions,
            measures: self.measures,
        })
    }
}

/// Builder for one folded network's conflict subtree.
#[derive(Debug)]
pub struct NetworkLog {
    network_id: NetworkId,
    points: Vec<PointConflicts>,
}

impl NetworkLog {
    /// Start a log for the network being folded in.
    #[must_use]
    pub const fn new(network_id: NetworkId) -> Self {
        Self {
            network_id,
            points: Vec::new(),
        }
    }

    /// Attach a point node if it is non-trivial.
    pub fn attach(&mut self, node: Option<PointConflicts>) {
        if let Some(node) = node {
            self.points.push(node);
        }
    }

    /// Yield the subtree, or `None` if no point produced conflicts.
    #[must_use]
    pub fn finish(self) -> Option<NetworkConflicts> {
        if self.points.is_empty() {
            return None;
        }
        Some(NetworkConflicts {
            network_id: self.network_id,
            points: self.points,
        })
    }
}

// ---------------------------------------------------------------------------
// Duplicate report
// ---------------------------------------------------------------------------

/// One duplicate point id found by the ERROR-mode pre-scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    /// The duplicated point id.
    pub point_id: PointId,
    /// The network the id was first seen in.
    pub source_network: NetworkId,
    /// The later network that also contains the id.
    pub add_network: NetworkId,
}

/// All duplicate point ids found by the ERROR-mode pre-scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Every collision, in scan order.
    pub duplicates: Vec<DuplicateEntry>,
}

impl DuplicateReport {
    /// Return `true` if the scan found no duplicates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty()
    }

    /// Return the number of collisions found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.duplicates.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
