//! The weighted graph (C1): an undirected multigraph keyed by opaque
//! vertices, with edge lookup, neighbor iteration, and mutation.
//!
//! Grounded in the teacher's `types::PhysicalNetwork` / `ospf::iterator`
//! pattern of wrapping adjacency with a domain-specific façade, but the
//! adjacency lists here are `IndexMap`s (from the WFBFA-SNOMOR example
//! pack) rather than a `petgraph` graph, because the spec requires
//! insertion-ordered neighbor iteration and both-sided edge storage —
//! properties a `petgraph::StableGraph` does not give for free.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::link::Link;

/// Opaque node identity. WARP nodes are identified by a stable name; the
/// name doubles as the deterministic Dijkstra tie-break key required by
/// the spec.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Build a `NodeId` from anything string-like.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The empty id, rejected by [`Graph::add_vertex`].
    fn is_null(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A normalized, unordered pair of endpoints used to key per-edge maps.
///
/// Two `EdgeKey`s compare equal iff their endpoint sets are equal,
/// matching the spec's "link comparison is by endpoint set equality".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey(NodeId, NodeId);

impl EdgeKey {
    /// Build the normalized key for the edge between `a` and `b`.
    pub fn new(a: &NodeId, b: &NodeId) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }
}

/// WARP's concrete graph: vertices are [`NodeId`]s, edges carry [`Link`]
/// attributes.
pub type WarpGraph = Graph<NodeId, Link>;

/// Edge payloads that remember which two vertices they connect.
///
/// [`Graph::add_edge`] calls this to keep a `Link`'s endpoint slots
/// consistent with the adjacency it is stored under, per the spec's
/// invariant that "endpoints inside the stored link are kept consistent
/// with the adjacency under which it appears".
pub trait EdgeEndpoints<V> {
    /// Record that this edge connects `a` and `b`.
    fn set_endpoints(&mut self, a: V, b: V);
}

impl EdgeEndpoints<NodeId> for Link {
    fn set_endpoints(&mut self, a: NodeId, b: NodeId) {
        Link::set_endpoints(self, a, b)
    }
}

/// A generic undirected weighted multigraph over vertices `V` and edge
/// payloads `E`.
///
/// Adjacency is symmetric: adding `(u, v, e)` inserts `e` into both `u`'s
/// and `v`'s adjacency lists. `V` is kept generic (mirroring the teacher's
/// generic `PhysicalNetwork`/graph layer) even though the production
/// instantiation is always [`WarpGraph`].
#[derive(Debug, Clone, Default)]
pub struct Graph<V, E> {
    adjacency: IndexMap<V, IndexMap<V, E>>,
    edge_cache: Option<Vec<(V, V, E)>>,
}

impl<V, E> Graph<V, E>
where
    V: Eq + Hash + Clone + Ord,
    E: Clone,
{
    /// Build an empty graph.
    pub fn new() -> Self {
        Self {
            adjacency: IndexMap::new(),
            edge_cache: None,
        }
    }

    /// Insert `v` if it is not already present. A no-op for an existing
    /// vertex.
    pub fn add_vertex(&mut self, v: V) {
        self.adjacency.entry(v).or_default();
    }

    /// Remove `v` and every edge incident to it.
    pub fn remove_vertex(&mut self, v: &V) {
        if self.adjacency.shift_remove(v).is_some() {
            for neighbors in self.adjacency.values_mut() {
                neighbors.shift_remove(v);
            }
            self.edge_cache = None;
        }
    }

    /// Insert an edge between `u` and `v`, replacing any edge already
    /// there. Both vertices are created if missing. Endpoint slots on `e`
    /// are set to `(u, v)` before insertion, for edge payloads that track
    /// their own endpoints (see [`EdgeEndpoints`]).
    pub fn add_edge(&mut self, u: V, v: V, mut e: E)
    where
        E: EdgeEndpoints<V>,
    {
        e.set_endpoints(u.clone(), v.clone());
        self.add_vertex(u.clone());
        self.add_vertex(v.clone());
        self.adjacency
            .get_mut(&u)
            .expect("just inserted")
            .insert(v.clone(), e.clone());
        self.adjacency
            .get_mut(&v)
            .expect("just inserted")
            .insert(u, e);
        self.edge_cache = None;
    }

    /// Remove the edge between `u` and `v`, if any. Idempotent.
    pub fn remove_edge(&mut self, u: &V, v: &V) {
        let mut changed = false;
        if let Some(n) = self.adjacency.get_mut(u) {
            changed |= n.shift_remove(v).is_some();
        }
        if let Some(n) = self.adjacency.get_mut(v) {
            changed |= n.shift_remove(u).is_some();
        }
        if changed {
            self.edge_cache = None;
        }
    }

    /// Fetch the edge between `u` and `v`, if present.
    pub fn get_edge(&self, u: &V, v: &V) -> Option<&E> {
        self.adjacency.get(u)?.get(v)
    }

    /// Whether `v` is a known vertex.
    pub fn contains_vertex(&self, v: &V) -> bool {
        self.adjacency.contains_key(v)
    }

    /// Iterate over `v`'s `(neighbor, edge)` pairs, in insertion order.
    /// Empty if `v` is unknown.
    pub fn neighbors(&self, v: &V) -> impl Iterator<Item = (&V, &E)> {
        self.adjacency
            .get(v)
            .into_iter()
            .flat_map(|n| n.iter())
    }

    /// The edges along consecutive pairs of `path`, stopping as soon as a
    /// pair is not adjacent.
    pub fn edges_along<'a>(&'a self, path: &'a [V]) -> impl Iterator<Item = &'a E> {
        path.windows(2)
            .map_while(move |w| self.get_edge(&w[0], &w[1]))
    }

    /// All known vertices, in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &V> {
        self.adjacency.keys()
    }

    /// All distinct edges as `(u, v, edge)` triples, each undirected edge
    /// appearing once. Cached until the next mutation.
    pub fn edges(&mut self) -> &[(V, V, E)] {
        if self.edge_cache.is_none() {
            let mut seen: IndexSet<EdgeKey> = IndexSet::new();
            let mut out = Vec::new();
            for (u, neighbors) in self.adjacency.iter() {
                for (v, e) in neighbors.iter() {
                    let key = EdgeKey::new(u, v);
                    if seen.insert(key) {
                        out.push((u.clone(), v.clone(), e.clone()));
                    }
                }
            }
            self.edge_cache = Some(out);
        }
        self.edge_cache.as_deref().unwrap()
    }

    /// Remove every vertex and edge.
    pub fn clear(&mut self) {
        self.adjacency.clear();
        self.edge_cache = None;
    }

    /// Whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

impl WarpGraph {
    /// Convenience wrapper over [`Graph::add_vertex`] rejecting the empty
    /// node id, matching the spec's `InvalidVertex` error kind.
    pub fn try_add_vertex(&mut self, v: NodeId) -> Result<(), crate::error::WarpError> {
        if v.is_null() {
            return Err(crate::error::WarpError::InvalidVertex);
        }
        self.add_vertex(v);
        Ok(())
    }
}
