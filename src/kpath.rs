//! The k-path selector (C6): turns the lazy stream of candidate shortest
//! paths from [`crate::spt::yens`] into a filtered, capacity-diverse set
//! of routes.
//!
//! Grounded in the teacher's `ospf::local` route-selection pass (picking
//! equal-cost next hops from a Dijkstra tree) generalized from "equal
//! cost" to "within a stretch factor and capacity-diverse", since WARP
//! keeps several unequal-cost paths rather than one shortest tree.

use std::collections::HashMap;

use crate::collab::EventSink;
use crate::database::RouteInformation;
use crate::error::WarpError;
use crate::graph::{EdgeKey, NodeId, WarpGraph};
use crate::spt::{yens, EdgeWeights};

/// Maximum allowed path weight relative to the shortest path's weight, as
/// a multiplier. Paths stretching further than this are filtered out.
pub const STRETCH_FACTOR: f64 = 2.0;

/// The minimum remaining capacity across `path`'s edges in
/// `remaining_capacity`. Edges absent from the map don't constrain the
/// bottleneck.
fn bottleneck_of(path: &[NodeId], remaining_capacity: &HashMap<EdgeKey, f64>) -> f64 {
    path.windows(2)
        .filter_map(|w| remaining_capacity.get(&EdgeKey::new(&w[0], &w[1])).copied())
        .fold(f64::INFINITY, f64::min)
}

/// Subtract `bottleneck` from every edge of `path` in `remaining_capacity`.
fn consume_bottleneck(path: &[NodeId], bottleneck: f64, remaining_capacity: &mut HashMap<EdgeKey, f64>) {
    for w in path.windows(2) {
        let key = EdgeKey::new(&w[0], &w[1]);
        if let Some(cap) = remaining_capacity.get_mut(&key) {
            *cap -= bottleneck.min(*cap);
        }
    }
}

/// Select up to `top_k` diverse, capacity-respecting paths from `source`
/// to `destination` (C6).
///
/// Candidates are pulled lazily from [`yens`] in non-decreasing weight
/// order. The first (absolute shortest) candidate is always emitted,
/// unconditionally, per §4.6 step 3. Every subsequent candidate is kept
/// only if:
/// - its weight is at most `STRETCH_FACTOR` times the shortest path's
///   weight (the stretch filter), and
/// - it is not a repeat of an already-accepted path, and
/// - it shares no bottleneck edge whose remaining capacity is already
///   exhausted by previously accepted paths (the diversity/capacity
///   filter) — tracked via `capacities`, which is consumed (reduced) by
///   each acceptance.
///
/// Pulls at most `candidate_budget` candidates from `yens` before giving
/// up, so a sparse or heavily filtered graph cannot spin forever.
///
/// Fails with [`WarpError::InvariantViolation`] if `owner` is missing
/// from its own local graph — route computation has no meaningful result
/// without the owner present, and this indicates corrupted local state.
pub fn k_path_selection(
    owner: &NodeId,
    destination: &NodeId,
    graph: &WarpGraph,
    weights: &EdgeWeights,
    capacities: &HashMap<EdgeKey, f64>,
    top_k: usize,
    candidate_budget: usize,
    sink: &mut impl EventSink,
) -> Result<Vec<RouteInformation>, WarpError> {
    if top_k == 0 || owner == destination {
        return Ok(Vec::new());
    }
    if !graph.contains_vertex(owner) {
        return Err(WarpError::InvariantViolation(format!(
            "{owner:?} is missing from its own local graph during route computation"
        )));
    }

    let mut remaining_capacity = capacities.clone();
    let mut accepted: Vec<RouteInformation> = Vec::new();

    let mut candidates = yens(graph, weights, owner, destination).take(candidate_budget);

    let (shortest_weight, first_path) = match candidates.next() {
        Some((weight, path)) if weight.is_finite() => (weight, path),
        _ => return Ok(accepted),
    };

    let bottleneck = bottleneck_of(&first_path, &remaining_capacity);
    consume_bottleneck(&first_path, bottleneck, &mut remaining_capacity);
    sink.on_path_accepted(owner, destination, &first_path);
    accepted.push(RouteInformation::new(first_path, shortest_weight));

    if accepted.len() < top_k {
        for (weight, path) in candidates {
            if !weight.is_finite() {
                break;
            }
            if weight > shortest_weight * STRETCH_FACTOR {
                sink.on_path_pruned(owner, destination, &path);
                break;
            }
            if accepted.iter().any(|r| r.path == path) {
                continue;
            }

            let bottleneck = bottleneck_of(&path, &remaining_capacity);
            if bottleneck <= 0.0 {
                sink.on_path_pruned(owner, destination, &path);
                continue;
            }

            consume_bottleneck(&path, bottleneck, &mut remaining_capacity);
            sink.on_path_accepted(owner, destination, &path);
            accepted.push(RouteInformation::new(path, weight));

            if accepted.len() >= top_k {
                break;
            }
        }
    }

    Ok(accepted)
}
