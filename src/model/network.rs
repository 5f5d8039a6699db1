//! A control network: a named, ordered collection of control points.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::point::Point;
use super::types::{NetworkId, PointId};
use super::IntegrityError;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// A named collection of control points describing tie-point
/// measurements across a set of images of one target body.
///
/// Points are ordered and unique by point id, with O(1) id lookup.
/// Replacing a point keeps its position, so output ordering is stable
/// across merges regardless of conflict outcomes.
///
/// # Serialization
///
/// Serializes through a flat document shape (metadata plus a point
/// list). Deserialization validates structural invariants — unique
/// point ids, every point non-empty with a resolvable reference — so a
/// `Network` in memory is always well-formed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkDoc", into = "NetworkDoc")]
pub struct Network {
    id: NetworkId,
    target: String,

    /// Name of the user or application that created the network.
    pub user_name: String,

    /// Creation timestamp, opaque at this layer.
    pub created: String,

    /// Last-modification timestamp, opaque at this layer.
    pub modified: String,

    /// Free-text description.
    pub description: String,

    points: Vec<Point>,
    index: HashMap<PointId, usize>,
}

impl Network {
    /// Create an empty network for `target`.
    #[must_use]
    pub fn new(id: NetworkId, target: impl Into<String>) -> Self {
        Self {
            id,
            target: target.into(),
            user_name: String::new(),
            created: String::new(),
            modified: String::new(),
            description: String::new(),
            points: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Return the network identifier.
    #[must_use]
    pub const fn id(&self) -> &NetworkId {
        &self.id
    }

    /// Replace the network identifier (used when stamping merge output).
    pub fn set_id(&mut self, id: NetworkId) {
        self.id = id;
    }

    /// Return the target body name.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Return `true` if both networks name the same target body,
    /// compared case-insensitively.
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        self.target.eq_ignore_ascii_case(&other.target)
    }

    /// Return the points in order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Return the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return `true` if the network has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Return `true` if the network contains a point with `id`.
    #[must_use]
    pub fn contains(&self, id: &PointId) -> bool {
        self.index.contains_key(id)
    }

    /// Return the point with `id`, if present.
    #[must_use]
    pub fn point(&self, id: &PointId) -> Option<&Point> {
        self.index.get(id).map(|&i| &self.points[i])
    }

    /// Insert a point, replacing any existing point with the same id in
    /// place (order preserved). Returns the replaced point, if any.
    pub fn add_point(&mut self, point: Point) -> Option<Point> {
        if let Some(&pos) = self.index.get(&point.id) {
            Some(std::mem::replace(&mut self.points[pos], point))
        } else {
            self.index.insert(point.id.clone(), self.points.len());
            self.points.push(point);
            None
        }
    }

    /// Remove and return the point with `id`, if present.
    pub fn remove_point(&mut self, id: &PointId) -> Option<Point> {
        let pos = self.index.remove(id)?;
        let removed = self.points.remove(pos);
        for i in self.index.values_mut() {
            if *i > pos {
                *i -= 1;
            }
        }
        Some(removed)
    }

    /// Check structural invariants of the network and every point.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), IntegrityError> {
        for point in &self.points {
            point.validate()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NetworkDoc — serialization shape
// ---------------------------------------------------------------------------

/// On-the-wire document shape for [`Network`].
#[derive(Serialize, Deserialize)]
struct NetworkDoc {
    id: NetworkId,
    target: String,
    #[serde(default)]
    user_name: String,
    #[serde(default)]
    created: String,
    #[serde(default)]
    modified: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    points: Vec<Point>,
}

impl TryFrom<NetworkDoc> for Network {
    type Error = IntegrityError;

    fn try_from(doc: NetworkDoc) -> Result<Self, Self::Error> {
        let mut index = HashMap::with_capacity(doc.points.len());
        for (i, point) in doc.points.iter().enumerate() {
            point.validate()?;
            if index.insert(point.id.clone(), i).is_some() {
                return Err(IntegrityError::DuplicatePoint {
                    point: point.id.clone(),
                });
            }
        }
        Ok(Self {
            id: doc.id,
            target: doc.target,
            user_name: doc.user_name,
            created: doc.created,
            modified: doc.modified,
            description: doc.description,
            points: doc.points,
            index,
        })
    }
}

impl From<Network> for NetworkDoc {
    fn from(net: Network) -> Self {
        Self {
            id: net.id,
            target: net.target,
            user_name: net.user_name,
            created: net.created,
            modified: net.modified,
            description: net.description,
            points: net.points,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Measure, SerialNumber};

    fn pid(s: &str) -> PointId {
        PointId::new(s).unwrap()
    }

    fn point(id: &str, serial: &str) -> Point {
        Point::new(
            pid(id),
            Measure::new(SerialNumber::new(serial).unwrap(), 0.0, 0.0),
        )
    }

    fn network(points: &[(&str, &str)]) -> Network {
        let mut net = Network::new(NetworkId::new("test-net").unwrap(), "Mars");
        for (id, serial) in points {
            net.add_point(point(id, serial));
        }
        net
    }

    #[test]
    fn add_point_indexes_by_id() {
        let net = network(&[("P1", "S1"), ("P2", "S2")]);
        assert_eq!(net.len(), 2);
        assert!(net.contains(&pid("P1")));
        assert_eq!(net.point(&pid("P2")).unwrap().id, pid("P2"));
        assert!(net.point(&pid("P9")).is_none());
    }

    #[test]
    fn add_point_replaces_in_place() {
        let mut net = network(&[("P1", "S1"), ("P2", "S2"), ("P3", "S3")]);
        let mut replacement = point("P2", "S9");
        replacement.chooser = "merged".to_owned();
        let old = net.add_point(replacement);
        assert!(old.is_some());

        let ids: Vec<_> = net.points().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["P1", "P2", "P3"], "replacement must keep position");
        assert_eq!(net.point(&pid("P2")).unwrap().chooser, "merged");
    }

    #[test]
    fn remove_point_keeps_index_consistent() {
        let mut net = network(&[("P1", "S1"), ("P2", "S2"), ("P3", "S3")]);
        assert!(net.remove_point(&pid("P2")).is_some());
        assert_eq!(net.len(), 2);
        assert_eq!(net.point(&pid("P3")).unwrap().id, pid("P3"));
        assert!(net.remove_point(&pid("P2")).is_none());
    }

    #[test]
    fn same_target_is_case_insensitive() {
        let a = network(&[]);
        let mut b = Network::new(NetworkId::new("other").unwrap(), "MARS");
        assert!(a.same_target(&b));
        b = Network::new(NetworkId::new("other").unwrap(), "Venus");
        assert!(!a.same_target(&b));
    }

    #[test]
    fn serde_roundtrip() {
        let mut net = network(&[("P1", "S1"), ("P2", "S2")]);
        net.description = "two points".to_owned();
        let json = serde_json::to_string(&net).unwrap();
        let back: Network = serde_json::from_str(&json).unwrap();
        assert_eq!(back, net);
    }

    #[test]
    fn deserialize_rejects_duplicate_point_ids() {
        let json = r#"{
            "id": "n", "target": "Mars",
            "points": [
                {"id": "P1", "measures": [{"serial": "S1", "sample": 0.0, "line": 0.0}], "reference": "S1"},
                {"id": "P1", "measures": [{"serial": "S2", "sample": 0.0, "line": 0.0}], "reference": "S2"}
            ]
        }"#;
        let result: Result<Network, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_rejects_dangling_reference() {
        let json = r#"{
            "id": "n", "target": "Mars",
            "points": [
                {"id": "P1", "measures": [{"serial": "S1", "sample": 0.0, "line": 0.0}], "reference": "S9"}
            ]
        }"#;
        let result: Result<Network, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_rejects_empty_point() {
        let json = r#"{
            "id": "n", "target": "Mars",
            "points": [{"id": "P1", "measures": [], "reference": "S1"}]
        }"#;
        let result: Result<Network, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
