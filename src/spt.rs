//! The shortest-path engine (C2): Dijkstra with a forbidden-vertex set,
//! and a lazy Yen's-algorithm loopless-path iterator built on top of it.
//!
//! Grounded in the teacher's `ospf::iterator` module, which exposes
//! similar pull-based iterators (`InternalEdges`, `Edges`) over the
//! topology rather than pre-computing everything into a `Vec`. Both
//! algorithms take an explicit edge-weight map rather than reading
//! bandwidth off the graph's `Link` payloads directly, since the weight
//! of an edge depends on endpoint loss rates the graph itself does not
//! carry (see [`crate::database::LocalDatabase::edge_weights`]).

use std::collections::{BinaryHeap, HashMap, HashSet};

use ordered_float::NotNan;

use crate::graph::{EdgeKey, NodeId, WarpGraph};

/// A per-edge weight lookup, keyed by normalized endpoint pair. Edges
/// absent from the map are treated as unreachable (infinite weight).
pub type EdgeWeights = HashMap<EdgeKey, f64>;

fn weight_of(weights: &EdgeWeights, u: &NodeId, v: &NodeId) -> f64 {
    weights
        .get(&EdgeKey::new(u, v))
        .copied()
        .unwrap_or(f64::INFINITY)
}

/// Frontier entry for Dijkstra's algorithm. Ordered by `(distance, name)`
/// ascending, which `BinaryHeap` (a max-heap) sees through `Reverse`,
/// giving the deterministic "first-encountered-in-pending-set" tie-break
/// the spec asks for.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Frontier(NotNan<f64>, NodeId);

/// Single-source shortest path from `source` to `target` over `graph`
/// weighted by `weights`, never expanding a vertex in `forbidden`.
///
/// Returns `(total_weight, path)` with `path` including both endpoints; if
/// `target` is unreachable, returns `(f64::INFINITY, vec![])`.
pub fn dijkstra(
    graph: &WarpGraph,
    weights: &EdgeWeights,
    source: &NodeId,
    target: &NodeId,
    forbidden: Option<&HashSet<NodeId>>,
) -> (f64, Vec<NodeId>) {
    dijkstra_masked(graph, weights, source, target, forbidden, None)
}

/// Like [`dijkstra`], but also refuses to traverse any edge listed in
/// `forbidden_edges`. Used internally by [`yens`] to block root-path
/// edges without ever mutating the graph.
fn dijkstra_masked(
    graph: &WarpGraph,
    weights: &EdgeWeights,
    source: &NodeId,
    target: &NodeId,
    forbidden: Option<&HashSet<NodeId>>,
    forbidden_edges: Option<&HashSet<EdgeKey>>,
) -> (f64, Vec<NodeId>) {
    let empty = HashSet::new();
    let forbidden = forbidden.unwrap_or(&empty);

    let mut dist: HashMap<NodeId, f64> = HashMap::new();
    let mut prev: HashMap<NodeId, NodeId> = HashMap::new();
    let mut heap: BinaryHeap<std::cmp::Reverse<Frontier>> = BinaryHeap::new();

    dist.insert(source.clone(), 0.0);
    heap.push(std::cmp::Reverse(Frontier(
        NotNan::new(0.0).unwrap(),
        source.clone(),
    )));

    while let Some(std::cmp::Reverse(Frontier(d, u))) = heap.pop() {
        let d = d.into_inner();
        if d > *dist.get(&u).unwrap_or(&f64::INFINITY) {
            continue;
        }
        if &u == target {
            break;
        }
        for (v, _edge) in graph.neighbors(&u) {
            if forbidden.contains(v) && v != target {
                continue;
            }
            if let Some(fe) = forbidden_edges {
                if fe.contains(&EdgeKey::new(&u, v)) {
                    continue;
                }
            }
            let w = weight_of(weights, &u, v);
            if !w.is_finite() {
                continue;
            }
            let nd = d + w;
            if nd < *dist.get(v).unwrap_or(&f64::INFINITY) {
                dist.insert(v.clone(), nd);
                prev.insert(v.clone(), u.clone());
                heap.push(std::cmp::Reverse(Frontier(NotNan::new(nd).unwrap(), v.clone())));
            }
        }
    }

    match dist.get(target) {
        Some(&w) if w.is_finite() => {
            let mut path = vec![target.clone()];
            let mut cur = target.clone();
            while &cur != source {
                let Some(p) = prev.get(&cur) else {
                    return (f64::INFINITY, Vec::new());
                };
                path.push(p.clone());
                cur = p.clone();
            }
            path.reverse();
            (w, path)
        }
        _ => (f64::INFINITY, Vec::new()),
    }
}

fn path_weight(weights: &EdgeWeights, path: &[NodeId]) -> f64 {
    path.windows(2).map(|w| weight_of(weights, &w[0], &w[1])).sum()
}

#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    weight: NotNan<f64>,
    path: Vec<NodeId>,
}

impl Eq for Candidate {}
impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| self.path.cmp(&other.path))
    }
}

/// A lazy, non-decreasing-by-total-weight iterator over loopless paths
/// from `source` to `target`, following Yen's algorithm.
pub struct Yens<'g> {
    graph: &'g WarpGraph,
    weights: &'g EdgeWeights,
    source: NodeId,
    target: NodeId,
    yielded: Vec<Vec<NodeId>>,
    candidates: BinaryHeap<std::cmp::Reverse<Candidate>>,
    seen_candidates: HashSet<Vec<NodeId>>,
    started: bool,
    done: bool,
}

/// Start a lazy enumeration of loopless paths from `source` to `target`
/// over `graph` weighted by `weights`, in non-decreasing order of total
/// weight.
pub fn yens<'g>(
    graph: &'g WarpGraph,
    weights: &'g EdgeWeights,
    source: &NodeId,
    target: &NodeId,
) -> Yens<'g> {
    Yens {
        graph,
        weights,
        source: source.clone(),
        target: target.clone(),
        yielded: Vec::new(),
        candidates: BinaryHeap::new(),
        seen_candidates: HashSet::new(),
        started: false,
        done: false,
    }
}

impl<'g> Yens<'g> {
    fn push_spurs(&mut self, path: &[NodeId]) {
        for i in 0..path.len().saturating_sub(1) {
            let root = &path[..i];
            let spur_node = &path[i];

            let forbidden_vertices: HashSet<NodeId> = root.iter().cloned().collect();

            let mut forbidden_edges: HashSet<EdgeKey> = HashSet::new();
            for q in &self.yielded {
                if q.len() > i + 1 && q[..i] == *root {
                    forbidden_edges.insert(EdgeKey::new(&q[i], &q[i + 1]));
                }
            }

            let (_, spur_path) = dijkstra_masked(
                self.graph,
                self.weights,
                spur_node,
                &self.target,
                Some(&forbidden_vertices),
                Some(&forbidden_edges),
            );
            if spur_path.is_empty() {
                continue;
            }

            let mut full_path = root.to_vec();
            full_path.extend(spur_path);

            if self.seen_candidates.contains(&full_path) {
                continue;
            }
            let weight = path_weight(self.weights, &full_path);
            self.seen_candidates.insert(full_path.clone());
            self.candidates.push(std::cmp::Reverse(Candidate {
                weight: NotNan::new(weight).unwrap_or_else(|_| NotNan::new(f64::INFINITY).unwrap()),
                path: full_path,
            }));
        }
    }
}

impl<'g> Iterator for Yens<'g> {
    type Item = (f64, Vec<NodeId>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            let (w, p) = dijkstra(self.graph, self.weights, &self.source, &self.target, None);
            if p.is_empty() {
                self.done = true;
                return None;
            }
            self.yielded.push(p.clone());
            self.push_spurs(&p);
            return Some((w, p));
        }
        loop {
            let Some(std::cmp::Reverse(cand)) = self.candidates.pop() else {
                self.done = true;
                return None;
            };
            if self.yielded.iter().any(|p| p == &cand.path) {
                continue;
            }
            self.yielded.push(cand.path.clone());
            self.push_spurs(&cand.path);
            return Some((cand.weight.into_inner(), cand.path));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::link::Link;

    fn n(name: &str) -> NodeId {
        NodeId::new(name)
    }

    /// Build a graph and its matching edge-weight map from `(u, v,
    /// weight)` triples, so the literal weights in the spec's scenarios
    /// can be used directly.
    fn weighted_graph(edges: &[(&str, &str, f64)]) -> (WarpGraph, EdgeWeights) {
        let mut g = WarpGraph::new();
        let mut weights = EdgeWeights::new();
        for (u, v, weight) in edges {
            g.add_edge(n(u), n(v), Link::new(*weight, true));
            weights.insert(EdgeKey::new(&n(u), &n(v)), *weight);
        }
        (g, weights)
    }

    #[test]
    fn dijkstra_grid_weights_s1() {
        let (g, w) = weighted_graph(&[
            ("1", "2", 5.0),
            ("1", "3", 7.0),
            ("2", "4", 3.0),
            ("3", "5", 2.0),
            ("3", "6", 9.0),
            ("4", "5", 5.0),
            ("4", "7", 9.0),
            ("4", "8", 2.0),
            ("5", "6", 10.0),
            ("5", "8", 1.0),
            ("5", "9", 8.0),
            ("6", "9", 5.0),
            ("7", "8", 5.0),
        ]);
        assert_eq!(dijkstra(&g, &w, &n("1"), &n("9"), None).0, 17.0);
        assert_eq!(dijkstra(&g, &w, &n("1"), &n("8"), None).0, 10.0);
        assert_eq!(dijkstra(&g, &w, &n("7"), &n("6"), None).0, 16.0);
        assert_eq!(dijkstra(&g, &w, &n("2"), &n("5"), None).0, 6.0);
    }

    #[test]
    fn dijkstra_unreachable_is_infinite() {
        let (mut g, w) = weighted_graph(&[("a", "b", 1.0)]);
        g.add_vertex(n("c"));
        let (weight, p) = dijkstra(&g, &w, &n("a"), &n("c"), None);
        assert_eq!(weight, f64::INFINITY);
        assert!(p.is_empty());
    }

    #[test]
    fn dijkstra_respects_forbidden_set() {
        let (g, w) = weighted_graph(&[("a", "b", 1.0), ("b", "c", 1.0), ("a", "c", 0.1)]);
        let forbidden: HashSet<NodeId> = [n("b")].into_iter().collect();
        let (_, path) = dijkstra(&g, &w, &n("a"), &n("c"), Some(&forbidden));
        assert_eq!(path, vec![n("a"), n("c")]);
    }

    #[test]
    fn yens_top_three_s2() {
        let (g, w) = weighted_graph(&[
            ("1", "2", 5.0),
            ("1", "3", 7.0),
            ("2", "4", 3.0),
            ("3", "5", 2.0),
            ("3", "6", 9.0),
            ("4", "5", 5.0),
            ("4", "7", 9.0),
            ("4", "8", 2.0),
            ("5", "6", 10.0),
            ("5", "8", 1.0),
            ("5", "9", 8.0),
            ("6", "9", 5.0),
            ("7", "8", 5.0),
        ]);
        let weights: Vec<f64> = yens(&g, &w, &n("3"), &n("8")).take(3).map(|(w, _)| w).collect();
        assert_eq!(weights, vec![3.0, 9.0, 17.0]);
    }

    #[test]
    fn yens_paths_are_non_decreasing_and_loopless() {
        let (g, w) = weighted_graph(&[
            ("a", "b", 1.0),
            ("b", "c", 1.0),
            ("a", "c", 5.0),
            ("c", "d", 1.0),
            ("a", "d", 2.0),
        ]);
        let paths: Vec<_> = yens(&g, &w, &n("a"), &n("d")).take(5).collect();
        let mut last = 0.0;
        for (weight, p) in &paths {
            assert!(*weight >= last);
            last = *weight;
            let set: HashSet<_> = p.iter().collect();
            assert_eq!(set.len(), p.len(), "path has a repeated vertex: {p:?}");
        }
        let uniq: HashSet<_> = paths.iter().map(|(_, p)| p.clone()).collect();
        assert_eq!(uniq.len(), paths.len(), "yens produced a duplicate path");
    }

    #[test]
    fn yens_does_not_mutate_graph() {
        let (g, w) = weighted_graph(&[("a", "b", 1.0), ("b", "c", 1.0), ("a", "c", 2.0)]);
        let before = g.get_edge(&n("a"), &n("b")).cloned();
        let _: Vec<_> = yens(&g, &w, &n("a"), &n("c")).take(3).collect();
        let after = g.get_edge(&n("a"), &n("b")).cloned();
        assert_eq!(before, after);
    }
}
