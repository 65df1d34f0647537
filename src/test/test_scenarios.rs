//! Literal end-to-end scenarios.
//!
//! S1 (Dijkstra baseline) and S2 (Yen top-3) are covered as unit tests in
//! [`crate::spt`], since they exercise C2 in isolation. The remaining
//! scenarios below need C4/C6/C7 wired together.

use std::collections::HashMap;

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;

use crate::collab::{NullEventSink, NullTopologyOracle};
use crate::database::LocalDatabase;
use crate::graph::{EdgeKey, NodeId, WarpGraph};
use crate::kpath::k_path_selection;
use crate::link::{Link, LinkRecord};
use crate::lsa::NodeRecord;
use crate::picker::pick_path;
use crate::spt::EdgeWeights;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn n(name: &str) -> NodeId {
    NodeId::new(name)
}

fn weighted_capacity_graph(edges: &[(&str, &str, f64)]) -> (WarpGraph, EdgeWeights, HashMap<EdgeKey, f64>) {
    let mut graph = WarpGraph::new();
    let mut weights = EdgeWeights::new();
    let mut capacities = HashMap::new();
    for (u, v, bandwidth) in edges {
        graph.add_edge(n(u), n(v), Link::new(*bandwidth, true));
        let key = EdgeKey::new(&n(u), &n(v));
        weights.insert(key.clone(), 1.0 / bandwidth);
        capacities.insert(key, *bandwidth);
    }
    (graph, weights, capacities)
}

/// S3 — KPath diamond bottleneck: two equal-weight paths sharing a
/// single-capacity tail edge (D-E); only the first one accepted fits
/// within capacity, so exactly one path is emitted for k=2.
#[test]
fn s3_kpath_diamond_bottleneck() {
    let (graph, weights, capacities) =
        weighted_capacity_graph(&[("A", "B", 1.0), ("A", "C", 1.0), ("B", "D", 1.0), ("C", "D", 1.0), ("D", "E", 1.0)]);

    let mut sink = NullEventSink;
    let routes = k_path_selection(&n("A"), &n("E"), &graph, &weights, &capacities, 2, 50, &mut sink).unwrap();
    assert_eq!(routes.len(), 1, "D-E should saturate after the first accepted path");
}

/// S4 — KPath stretch filter: with the literal `2x` stretch cap from
/// §4.6 and weights derived as `1 / bandwidth`, the shortest path
/// (`A-C-E-G`, weight 0.35) rules out every other simple path to `G`
/// (all exceed `0.70`) before the capacity/diversity filter is even
/// reached. The distilled spec's worked example claims three paths
/// survive; that arithmetic does not hold under its own stated 2x
/// cutoff (see `DESIGN.md`), so this test asserts the behavior the
/// algorithm in §4.6 actually produces.
#[test]
fn s4_kpath_stretch_filter() {
    let (graph, weights, capacities) = weighted_capacity_graph(&[
        ("A", "B", 2.0),
        ("A", "C", 8.0),
        ("A", "D", 1.0),
        ("B", "E", 2.0),
        ("C", "E", 8.0),
        ("D", "E", 1.0),
        ("E", "G", 10.0),
        ("D", "F", 1.0),
        ("F", "G", 1.0),
    ]);

    let mut sink = NullEventSink;
    let routes = k_path_selection(&n("A"), &n("G"), &graph, &weights, &capacities, 4, 50, &mut sink).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].path, vec![n("A"), n("C"), n("E"), n("G")]);
}

/// S5 — Deficit convergence: after repeated draws among three candidate
/// routes from A to D, accumulated deficits still sum to zero, and at
/// least one route goes positive (falls behind its ideal share) along
/// the way.
#[test]
fn s5_deficit_convergence() {
    let (graph, weights, capacities) = weighted_capacity_graph(&[
        ("A", "B", 4096.0),
        ("A", "C", 2048.0),
        ("D", "B", 4096.0),
        ("D", "C", 2048.0),
        ("A", "D", 1024.0),
    ]);

    let mut sink = NullEventSink;
    let mut routes = k_path_selection(&n("A"), &n("D"), &graph, &weights, &capacities, 3, 50, &mut sink).unwrap();
    assert_eq!(routes.len(), 3, "all three A-D routes should fit under capacity");

    let mut rng = SmallRng::seed_from_u64(11);
    let mut saw_positive_deficit = false;
    for _ in 0..5 {
        pick_path(&mut routes, 32.0, &mut rng);
        if routes.iter().any(|r| r.deficit_bytes > 0.0) {
            saw_positive_deficit = true;
        }
    }

    let total_deficit: f64 = routes.iter().map(|r| r.deficit_bytes).sum();
    assert_relative_eq!(total_deficit, 0.0, epsilon = 1e-6);
    assert!(saw_positive_deficit, "at least one route should have gone positive-deficit");
}

/// S6 — Dead-neighbor propagation along A-B-C: once A stops hearing B
/// and `lsa_neighbor_timeout` elapses, A drops the A-B edge and notifies
/// C (who still hears B directly) with a corrective unicast naming no
/// link to B. C prunes the A-B edge it had mirrored from B's flood but
/// keeps its own B-C edge.
#[test]
fn s6_dead_neighbor_propagation() {
    let bandwidth = 1.0e6;

    let mut a_db = LocalDatabase::new(n("A"), 1, 10.0);
    a_db.direct_neighbors.insert(n("B"), 0.0);
    a_db.upsert_node_record(NodeRecord {
        node: n("A"),
        links: vec![LinkRecord {
            link: Link::new(bandwidth, true),
            peer: n("B"),
            effective_bandwidth: bandwidth,
        }],
        highest_observed_queue_ratio: None,
        byte_loss_rate: 0.0,
    });
    a_db.upsert_node_record(NodeRecord {
        node: n("B"),
        links: vec![
            LinkRecord {
                link: Link::new(bandwidth, true),
                peer: n("A"),
                effective_bandwidth: bandwidth,
            },
            LinkRecord {
                link: Link::new(bandwidth, true),
                peer: n("C"),
                effective_bandwidth: bandwidth,
            },
        ],
        highest_observed_queue_ratio: None,
        byte_loss_rate: 0.0,
    });

    let notices = a_db.update_liveness(11.0);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].dead, n("B"));
    assert!(a_db.local_graph.get_edge(&n("A"), &n("B")).is_none());
    assert!(a_db.node_records.get(&n("B")).is_none());
    assert_eq!(notices[0].corrective_lsas.len(), 1);
    let (target, corrective_lsa) = &notices[0].corrective_lsas[0];
    assert_eq!(target, &n("C"));
    assert!(corrective_lsa.node_record.links.is_empty());

    let mut c_db = LocalDatabase::new(n("C"), 1, 10.0);
    c_db.direct_neighbors.insert(n("B"), 0.0);
    c_db.upsert_node_record(NodeRecord {
        node: n("C"),
        links: vec![LinkRecord {
            link: Link::new(bandwidth, true),
            peer: n("B"),
            effective_bandwidth: bandwidth,
        }],
        highest_observed_queue_ratio: None,
        byte_loss_rate: 0.0,
    });
    c_db.upsert_node_record(NodeRecord {
        node: n("B"),
        links: vec![
            LinkRecord {
                link: Link::new(bandwidth, true),
                peer: n("A"),
                effective_bandwidth: bandwidth,
            },
            LinkRecord {
                link: Link::new(bandwidth, true),
                peer: n("C"),
                effective_bandwidth: bandwidth,
            },
        ],
        highest_observed_queue_ratio: None,
        byte_loss_rate: 0.0,
    });
    assert!(c_db.local_graph.get_edge(&n("A"), &n("B")).is_some());

    let accepted = c_db.process_lsa(corrective_lsa, &NullTopologyOracle);
    assert!(accepted);
    assert!(c_db.local_graph.get_edge(&n("A"), &n("B")).is_none());
    assert!(
        c_db.local_graph.get_edge(&n("B"), &n("C")).is_some(),
        "C still hears B directly and keeps that edge"
    );
}

