//! Duplicate point-id handling across source networks: the default
//! fail-fast error, the collecting report, and merge mode.

use tienet::error::MergeError;
use tienet::merge::{merge_networks, DuplicateMode, MergePolicy, NetworkStamp};
use tienet::model::{Measure, Network, NetworkId, Point, PointId, SerialNumber};

fn nid(s: &str) -> NetworkId {
    NetworkId::new(s).unwrap()
}

fn point(id: &str, serial: &str) -> Point {
    Point::new(
        PointId::new(id).unwrap(),
        Measure::new(SerialNumber::new(serial).unwrap(), 0.0, 0.0),
    )
}

fn network(id: &str, points: Vec<Point>) -> Network {
    let mut net = Network::new(nid(id), "Mars");
    for p in points {
        net.add_point(p);
    }
    net
}

fn stamp() -> NetworkStamp {
    NetworkStamp {
        network_id: nid("merged"),
        user_name: "dup-test".to_owned(),
        created: String::new(),
        modified: String::new(),
        description: String::new(),
    }
}

#[test]
fn first_duplicate_fails_fast_without_report() {
    let a = network("a", vec![point("P1", "S1"), point("P2", "S2")]);
    let b = network("b", vec![point("P2", "S3"), point("P3", "S4")]);

    let err = merge_networks(&[a, b], &stamp(), &MergePolicy::default()).unwrap_err();
    match err {
        MergeError::DuplicatePoint {
            point,
            source_network,
            add_network,
        } => {
            assert_eq!(point.as_str(), "P2");
            assert_eq!(source_network.as_str(), "a");
            assert_eq!(add_network.as_str(), "b");
        }
        other => panic!("expected DuplicatePoint, got {other:?}"),
    }
}

#[test]
fn reporting_scan_collects_every_collision() {
    let a = network("a", vec![point("P1", "S1"), point("P2", "S2")]);
    let b = network("b", vec![point("P1", "S3"), point("P2", "S4")]);
    let c = network("c", vec![point("P1", "S5")]);

    let policy = MergePolicy {
        report: true,
        ..MergePolicy::default()
    };
    let err = merge_networks(&[a, b, c], &stamp(), &policy).unwrap_err();
    let report = err.duplicate_report().expect("collecting scan keeps going");

    // P1 collides twice (b and c), P2 once.
    assert_eq!(report.len(), 3);
    let p1_hits = report
        .duplicates
        .iter()
        .filter(|d| d.point_id.as_str() == "P1")
        .count();
    assert_eq!(p1_hits, 2);
    assert!(report
        .duplicates
        .iter()
        .all(|d| d.source_network.as_str() == "a"));
}

#[test]
fn error_message_points_at_merge_mode() {
    let a = network("a", vec![point("P1", "S1")]);
    let b = network("b", vec![point("P1", "S2")]);

    let err = merge_networks(&[a, b], &stamp(), &MergePolicy::default()).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("P1"));
    assert!(msg.contains("duplicates=merge"), "hint missing: {msg}");
}

#[test]
fn merge_mode_never_runs_the_scan() {
    let a = network("a", vec![point("P1", "S1")]);
    let b = network("b", vec![point("P1", "S2")]);

    let policy = MergePolicy {
        duplicates: DuplicateMode::Merge,
        ..MergePolicy::default()
    };
    let out = merge_networks(&[a, b], &stamp(), &policy).unwrap();
    assert_eq!(out.network.len(), 1);
    let p = out.network.points().first().unwrap();
    assert_eq!(p.len(), 2, "both serials merged into one point");
}

#[test]
fn duplicates_within_one_source_do_not_trip_the_scan() {
    // The scan looks for collisions ACROSS networks; a network cannot
    // contain the same point id twice by construction.
    let a = network("a", vec![point("P1", "S1"), point("P1", "S2")]);
    assert_eq!(a.len(), 1, "add_point upserts by id");

    let b = network("b", vec![point("P2", "S3")]);
    let out = merge_networks(&[a, b], &stamp(), &MergePolicy::default()).unwrap();
    assert_eq!(out.network.len(), 2);
}
