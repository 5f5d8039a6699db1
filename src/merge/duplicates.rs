//! ERROR-mode duplicate pre-scan.
//!
//! When the policy disallows merging duplicate point ids, every point
//! id across every source network is scanned before any merging starts.
//! The scan is pure validation: it mutates nothing and either passes or
//! fails the whole merge call.

use std::collections::HashMap;

use crate::error::MergeError;
use crate::merge::report::{DuplicateEntry, DuplicateReport};
use crate::model::{Network, PointId};

/// Scan all source networks for point-id collisions.
///
/// Networks are scanned in input order; the first network an id is seen
/// in becomes its source for reporting. On a collision:
///
/// - `collect == false`: fail immediately with
///   [`MergeError::DuplicatePoint`] naming both networks and the id.
/// - `collect == true`: record the collision and keep scanning, so the
///   caller gets every duplicate in one pass; afterwards fail with
///   [`MergeError::DuplicatesFound`] carrying the full report.
///
/// # Errors
/// Fails iff any point id appears in more than one network.
pub fn scan_duplicates(sources: &[Network], collect: bool) -> Result<(), MergeError> {
    let mut first_seen: HashMap<&PointId, &Network> = HashMap::new();
    let mut report = DuplicateReport::default();

    for network in sources {
        for point in network.points() {
            if let Some(source) = first_seen.get(&point.id) {
                if !collect {
                    return Err(MergeError::DuplicatePoint {
                        point: point.id.clone(),
                        source_network: source.id().clone(),
                        add_network: network.id().clone(),
                    });
                }
                report.duplicates.push(DuplicateEntry {
                    point_id: point.id.clone(),
                    source_network: source.id().clone(),
                    add_network: network.id().clone(),
                });
            } else {
                first_seen.insert(&point.id, network);
            }
        }
    }

    if report.is_empty() {
        Ok(())
    } else {
        tracing::debug!(duplicates = report.len(), "duplicate scan found collisions");
        Err(MergeError::DuplicatesFound { report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Measure, NetworkId, Point, SerialNumber};

    fn network(id: &str, points: &[&str]) -> Network {
        let mut net = Network::new(NetworkId::new(id).unwrap(), "Mars");
        for (i, pid) in points.iter().enumerate() {
            let serial = SerialNumber::new(&format!("{id}-S{i}")).unwrap();
            net.add_point(Point::new(
                PointId::new(pid).unwrap(),
                Measure::new(serial, 0.0, 0.0),
            ));
        }
        net
    }

    #[test]
    fn disjoint_networks_pass() {
        let nets = [network("a", &["P1", "P2"]), network("b", &["P3", "P4"])];
        assert!(scan_duplicates(&nets, false).is_ok());
        assert!(scan_duplicates(&nets, true).is_ok());
    }

    #[test]
    fn immediate_failure_names_both_networks() {
        let nets = [network("net-a", &["P1"]), network("net-b", &["P1"])];
        let err = scan_duplicates(&nets, false).unwrap_err();
        match err {
            MergeError::DuplicatePoint {
                point,
                source_network,
                add_network,
            } => {
                assert_eq!(point.as_str(), "P1");
                assert_eq!(source_network.as_str(), "net-a");
                assert_eq!(add_network.as_str(), "net-b");
            }
            other => panic!("expected DuplicatePoint, got {other:?}"),
        }
    }

    #[test]
    fn collecting_scan_gathers_all_duplicates() {
        let nets = [
            network("a", &["P1", "P2"]),
            network("b", &["P1", "P3"]),
            network("c", &["P2", "P3"]),
        ];
        let err = scan_duplicates(&nets, true).unwrap_err();
        let report = err.duplicate_report().expect("should carry the report");
        assert_eq!(report.len(), 3);
        let ids: Vec<_> = report
            .duplicates
            .iter()
            .map(|d| d.point_id.as_str())
            .collect();
        assert_eq!(ids, ["P1", "P2", "P3"]);
    }

    #[test]
    fn first_seen_network_wins_as_source() {
        // P1 appears in all three; the source is always the first.
        let nets = [
            network("a", &["P1"]),
            network("b", &["P1"]),
            network("c", &["P1"]),
        ];
        let err = scan_duplicates(&nets, true).unwrap_err();
        let report = err.duplicate_report().unwrap();
        assert_eq!(report.len(), 2);
        for entry in &report.duplicates {
            assert_eq!(entry.source_network.as_str(), "a");
        }
    }

    #[test]
    fn duplicate_within_single_network_is_impossible_by_construction() {
        // add_point replaces on id collision, so one network can never
        // contribute a duplicate against itself.
        let net = network("a", &["P1", "P1"]);
        assert_eq!(net.len(), 1);
        assert!(scan_duplicates(&[net], false).is_ok());
    }
}
