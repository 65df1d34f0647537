//! The local database (C4): a node's mirror of known nodes/links, with
//! per-origin sequence numbers, neighbor liveness timers, and the route
//! cache.
//!
//! Grounded in the teacher's `ospf::local` module (`LocalOspfProcess`,
//! `OspfRib`): a per-node process that owns a local view of the topology
//! and reacts to incoming link-state traffic, as opposed to the teacher's
//! `GlobalOspf` variant which computes everything from a central oracle
//! (out of scope here — WARP has no such central-controller mode).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::collab::TopologyOracle;
use crate::graph::{EdgeKey, NodeId, WarpGraph};
use crate::link::{effective_bandwidth, link_weight, Link, LinkRecord};
use crate::lsa::{Lsa, NodeRecord};
use crate::spt::EdgeWeights;

/// A cached multipath route to some destination (see
/// [`crate::kpath::k_path_selection`] and [`crate::picker::pick_path`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInformation {
    /// The vertex sequence of the path, source first.
    pub path: Vec<NodeId>,
    /// Total weight (sum of edge weights) of the path.
    pub total_weight: f64,
    /// Bytes sent over this route so far.
    pub total_bytes_sent: f64,
    /// Bytes by which actual traffic trails the weight-implied share.
    pub deficit_bytes: f64,
}

impl RouteInformation {
    /// Build a fresh, unused route for `path` with the given total
    /// weight.
    pub fn new(path: Vec<NodeId>, total_weight: f64) -> Self {
        Self {
            path,
            total_weight,
            total_bytes_sent: 0.0,
            deficit_bytes: 0.0,
        }
    }
}

/// The result of one `update_liveness` tick: a dead neighbor, plus the
/// corrective unicast LSAs that must be sent to the dead node's other
/// former neighbors.
#[derive(Debug, Clone)]
pub struct DeadNeighborNotice {
    /// The neighbor declared dead.
    pub dead: NodeId,
    /// `(target, lsa)` pairs to hand to the outbound queue.
    pub corrective_lsas: Vec<(NodeId, Lsa)>,
}

/// Per-node mirror of known nodes/links (C4).
#[derive(Debug, Clone)]
pub struct LocalDatabase {
    /// The node that owns this database.
    pub owner: NodeId,
    /// This node's belief about the topology.
    pub local_graph: WarpGraph,
    /// Latest accepted node record per known node.
    pub node_records: HashMap<NodeId, NodeRecord>,
    /// Per-edge metadata, keyed by normalized endpoint pair.
    pub link_records: HashMap<EdgeKey, LinkRecord>,
    /// Highest accepted sequence number per origin.
    pub sequence_numbers: HashMap<NodeId, u64>,
    /// Running maximum sequence number across all origins.
    pub max_sequence_number: u64,
    /// Forwarding node that delivered the highest sequence number seen
    /// for each origin.
    pub sequence_number_origin: HashMap<NodeId, NodeId>,
    /// Elapsed seconds since each direct neighbor was last heard from.
    pub direct_neighbors: HashMap<NodeId, f64>,
    /// Cached candidate routes per destination.
    pub routes: HashMap<NodeId, Vec<RouteInformation>>,
    /// Maximum number of candidate paths retained per destination.
    pub top_k: usize,
    /// Seconds without any LSA from a direct neighbor before it is dead.
    pub lsa_neighbor_timeout: f64,
}

impl LocalDatabase {
    /// Build an empty database owned by `owner`.
    pub fn new(owner: NodeId, top_k: usize, lsa_neighbor_timeout: f64) -> Self {
        let mut local_graph = WarpGraph::new();
        local_graph.add_vertex(owner.clone());
        Self {
            owner,
            local_graph,
            node_records: HashMap::new(),
            link_records: HashMap::new(),
            sequence_numbers: HashMap::new(),
            max_sequence_number: 0,
            sequence_number_origin: HashMap::new(),
            direct_neighbors: HashMap::new(),
            routes: HashMap::new(),
            top_k,
            lsa_neighbor_timeout,
        }
    }

    /// The sequence number this node should use for its next LSA.
    pub fn get_next_sequence_number(&self) -> u64 {
        self.max_sequence_number + 1
    }

    /// Per-edge weight map (`1 / effective_bandwidth`), derived from
    /// `link_records`. Handed to [`crate::spt::dijkstra`]/[`crate::spt::yens`].
    pub fn edge_weights(&self) -> EdgeWeights {
        self.link_records
            .iter()
            .map(|(k, v)| (k.clone(), link_weight(v.effective_bandwidth)))
            .collect()
    }

    /// Per-edge effective-bandwidth map, used as the capacity basis for
    /// [`crate::kpath::k_path_selection`]'s bottleneck bookkeeping.
    pub fn edge_capacities(&self) -> HashMap<EdgeKey, f64> {
        self.link_records
            .iter()
            .map(|(k, v)| (k.clone(), v.effective_bandwidth))
            .collect()
    }

    /// Accept or reject an incoming LSA (§4.4.1). Returns whether it was
    /// accepted.
    pub fn process_lsa(&mut self, lsa: &Lsa, topology: &impl TopologyOracle) -> bool {
        let origin = lsa.origin().clone();
        let seen = *self.sequence_numbers.get(&origin).unwrap_or(&0);

        if lsa.sequence_number <= seen {
            if self.direct_neighbors.contains_key(&lsa.forwarding_node) {
                self.direct_neighbors.insert(lsa.forwarding_node.clone(), 0.0);
            }
            log::trace!(
                "{}: rejected stale LSA from {origin:?} (seq {} <= {seen})",
                self.owner,
                lsa.sequence_number
            );
            return false;
        }

        self.sequence_numbers.insert(origin.clone(), lsa.sequence_number);
        self.max_sequence_number = self.max_sequence_number.max(lsa.sequence_number);
        self.sequence_number_origin
            .insert(origin.clone(), lsa.forwarding_node.clone());

        self.upsert_node_record(lsa.node_record.clone());

        if self.direct_neighbors.contains_key(&lsa.forwarding_node) {
            self.direct_neighbors.insert(lsa.forwarding_node.clone(), 0.0);
        } else if topology
            .neighbors_of(&self.owner)
            .iter()
            .any(|n| n == &lsa.forwarding_node)
        {
            self.synthesize_direct_link(&lsa.forwarding_node);
            self.direct_neighbors.insert(lsa.forwarding_node.clone(), 0.0);
        }

        log::debug!(
            "{}: accepted LSA from {origin:?} (seq {})",
            self.owner,
            lsa.sequence_number
        );
        true
    }

    /// Record a newly discovered physical neighbor that relayed an LSA
    /// before we had a graph edge to it (§4.4.1 step 4).
    fn synthesize_direct_link(&mut self, neighbor: &NodeId) {
        if self.local_graph.get_edge(&self.owner, neighbor).is_some() {
            return;
        }
        let default_link = Link::new(1.0e9, true);
        let key = EdgeKey::new(&self.owner, neighbor);
        let effective_bandwidth = effective_bandwidth(&default_link, 0.0, 0.0);
        self.local_graph
            .add_edge(self.owner.clone(), neighbor.clone(), default_link.clone());
        self.link_records.insert(
            key,
            LinkRecord {
                link: default_link,
                peer: neighbor.clone(),
                effective_bandwidth,
            },
        );
        let mut owner_record = self
            .node_records
            .get(&self.owner)
            .cloned()
            .unwrap_or_else(|| NodeRecord {
                node: self.owner.clone(),
                links: Vec::new(),
                highest_observed_queue_ratio: None,
                byte_loss_rate: 0.0,
            });
        if owner_record.link_to(neighbor).is_none() {
            owner_record.links.push(LinkRecord {
                link: Link::new(1.0e9, true),
                peer: neighbor.clone(),
                effective_bandwidth,
            });
        }
        self.upsert_node_record(owner_record);
    }

    /// Merge `record` into the local graph (§4.4.2).
    pub fn upsert_node_record(&mut self, record: NodeRecord) {
        self.local_graph.add_vertex(record.node.clone());

        for link_record in &record.links {
            self.local_graph.add_vertex(link_record.peer.clone());
            let key = EdgeKey::new(&record.node, &link_record.peer);

            if self.local_graph.get_edge(&record.node, &link_record.peer).is_none() {
                self.local_graph.add_edge(
                    record.node.clone(),
                    link_record.peer.clone(),
                    link_record.link.clone_attributes(),
                );
            }

            let effective_bandwidth = if self.top_k > 1 {
                let peer_loss = self
                    .node_records
                    .get(&link_record.peer)
                    .map(|r| r.byte_loss_rate)
                    .unwrap_or(0.0);
                effective_bandwidth(&link_record.link, record.byte_loss_rate, peer_loss)
            } else {
                link_record.effective_bandwidth
            };

            self.link_records.insert(
                key,
                LinkRecord {
                    link: link_record.link.clone_attributes(),
                    peer: link_record.peer.clone(),
                    effective_bandwidth,
                },
            );
        }

        if record.node != self.owner {
            let keep: std::collections::HashSet<NodeId> =
                record.links.iter().map(|l| l.peer.clone()).collect();
            let current_peers: Vec<NodeId> = self
                .local_graph
                .neighbors(&record.node)
                .map(|(v, _)| v.clone())
                .collect();
            for peer in current_peers {
                if !keep.contains(&peer) {
                    self.local_graph.remove_edge(&record.node, &peer);
                    self.link_records.remove(&EdgeKey::new(&record.node, &peer));
                }
            }
        }

        self.node_records.insert(record.node.clone(), record);
        self.routes.clear();
    }

    /// Build a fresh snapshot of the owner's own links (§4.4.3).
    pub fn create_node_record(
        &self,
        highest_observed_queue_ratio: Option<f64>,
        byte_loss_rate: f64,
    ) -> NodeRecord {
        let links = self
            .local_graph
            .neighbors(&self.owner)
            .map(|(peer, link)| {
                let key = EdgeKey::new(&self.owner, peer);
                let effective_bandwidth = self
                    .link_records
                    .get(&key)
                    .map(|lr| lr.effective_bandwidth)
                    .unwrap_or_else(|| {
                        let peer_loss = self
                            .node_records
                            .get(peer)
                            .map(|r| r.byte_loss_rate)
                            .unwrap_or(0.0);
                        effective_bandwidth(link, byte_loss_rate, peer_loss)
                    });
                LinkRecord {
                    link: link.clone_attributes(),
                    peer: peer.clone(),
                    effective_bandwidth,
                }
            })
            .collect();

        NodeRecord {
            node: self.owner.clone(),
            links,
            highest_observed_queue_ratio,
            byte_loss_rate,
        }
    }

    /// Advance all direct-neighbor liveness timers by `delta` seconds,
    /// declaring any neighbor that reaches `lsa_neighbor_timeout` dead
    /// (§4.4.4).
    pub fn update_liveness(&mut self, delta: f64) -> Vec<DeadNeighborNotice> {
        for timer in self.direct_neighbors.values_mut() {
            *timer += delta;
        }

        let dead: Vec<NodeId> = self
            .direct_neighbors
            .iter()
            .filter(|(_, &t)| t >= self.lsa_neighbor_timeout)
            .map(|(n, _)| n.clone())
            .collect();

        let mut notices = Vec::new();
        for dead_node in dead {
            self.direct_neighbors.remove(&dead_node);
            let dead_record = self.node_records.remove(&dead_node);
            self.local_graph.remove_edge(&self.owner, &dead_node);
            self.link_records.remove(&EdgeKey::new(&self.owner, &dead_node));
            self.routes.clear();

            log::info!("{}: declaring neighbor {dead_node:?} dead", self.owner);

            let mut corrective_lsas = Vec::new();
            if let Some(record) = dead_record {
                let seq = self.get_next_sequence_number();
                self.sequence_numbers.insert(self.owner.clone(), seq);
                self.max_sequence_number = self.max_sequence_number.max(seq);
                let owner_record = self.create_node_record(None, 0.0);
                for link in &record.links {
                    if link.peer == self.owner || link.peer == dead_node {
                        continue;
                    }
                    corrective_lsas.push((
                        link.peer.clone(),
                        Lsa {
                            node_record: owner_record.clone(),
                            sequence_number: seq,
                            forwarding_node: self.owner.clone(),
                            destination: Some(link.peer.clone()),
                        },
                    ));
                }
            }

            notices.push(DeadNeighborNotice {
                dead: dead_node,
                corrective_lsas,
            });
        }

        notices
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::collab::NullTopologyOracle;

    fn n(name: &str) -> NodeId {
        NodeId::new(name)
    }

    fn lsa_for(owner: &NodeId, links: Vec<(&str, f64)>, seq: u64, forwarder: &NodeId) -> Lsa {
        Lsa {
            node_record: NodeRecord {
                node: owner.clone(),
                links: links
                    .into_iter()
                    .map(|(peer, bw)| LinkRecord {
                        link: Link::new(bw, true),
                        peer: n(peer),
                        effective_bandwidth: bw,
                    })
                    .collect(),
                highest_observed_queue_ratio: None,
                byte_loss_rate: 0.0,
            },
            sequence_number: seq,
            forwarding_node: forwarder.clone(),
            destination: None,
        }
    }

    #[test]
    fn process_lsa_accepts_strictly_increasing_sequence() {
        let mut db = LocalDatabase::new(n("me"), 1, 15.0);
        let b = n("b");
        let lsa1 = lsa_for(&b, vec![("c", 100.0)], 1, &b);
        assert!(db.process_lsa(&lsa1, &NullTopologyOracle));
        assert_eq!(db.sequence_numbers[&b], 1);

        let stale = lsa_for(&b, vec![("d", 50.0)], 1, &b);
        assert!(!db.process_lsa(&stale, &NullTopologyOracle));
        assert_eq!(db.node_records[&b].links[0].peer, n("c"));

        let fresh = lsa_for(&b, vec![("d", 50.0)], 2, &b);
        assert!(db.process_lsa(&fresh, &NullTopologyOracle));
        assert_eq!(db.node_records[&b].links[0].peer, n("d"));
    }

    #[test]
    fn upsert_removes_edges_dropped_from_record() {
        let mut db = LocalDatabase::new(n("me"), 1, 15.0);
        db.upsert_node_record(NodeRecord {
            node: n("b"),
            links: vec![LinkRecord {
                link: Link::new(100.0, true),
                peer: n("c"),
                effective_bandwidth: 100.0,
            }],
            highest_observed_queue_ratio: None,
            byte_loss_rate: 0.0,
        });
        assert!(db.local_graph.get_edge(&n("b"), &n("c")).is_some());

        db.upsert_node_record(NodeRecord {
            node: n("b"),
            links: vec![],
            highest_observed_queue_ratio: None,
            byte_loss_rate: 0.0,
        });
        assert!(db.local_graph.get_edge(&n("b"), &n("c")).is_none());
    }

    #[test]
    fn owner_record_never_drops_its_own_edges() {
        let mut db = LocalDatabase::new(n("me"), 1, 15.0);
        db.local_graph
            .add_edge(n("me"), n("x"), Link::new(10.0, true));
        db.upsert_node_record(NodeRecord {
            node: n("me"),
            links: vec![],
            highest_observed_queue_ratio: None,
            byte_loss_rate: 0.0,
        });
        assert!(db.local_graph.get_edge(&n("me"), &n("x")).is_some());
    }

    #[test]
    fn dead_neighbor_removes_edge_and_notifies_others() {
        let mut db = LocalDatabase::new(n("a"), 1, 10.0);
        db.direct_neighbors.insert(n("b"), 0.0);
        db.upsert_node_record(NodeRecord {
            node: n("b"),
            links: vec![
                LinkRecord {
                    link: Link::new(100.0, true),
                    peer: n("a"),
                    effective_bandwidth: 100.0,
                },
                LinkRecord {
                    link: Link::new(100.0, true),
                    peer: n("c"),
                    effective_bandwidth: 100.0,
                },
            ],
            highest_observed_queue_ratio: None,
            byte_loss_rate: 0.0,
        });

        let notices = db.update_liveness(20.0);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].dead, n("b"));
        assert_eq!(notices[0].corrective_lsas.len(), 1);
        assert_eq!(notices[0].corrective_lsas[0].0, n("c"));
        assert!(!db.direct_neighbors.contains_key(&n("b")));
        assert!(db.node_records.get(&n("b")).is_none());
    }

    #[test]
    fn round_trip_create_then_upsert_is_idempotent() {
        let mut db = LocalDatabase::new(n("a"), 1, 15.0);
        db.local_graph
            .add_edge(n("a"), n("b"), Link::new(500.0, true));
        db.link_records.insert(
            EdgeKey::new(&n("a"), &n("b")),
            LinkRecord {
                link: Link::new(500.0, true),
                peer: n("b"),
                effective_bandwidth: 500.0,
            },
        );
        let before: Vec<_> = db.local_graph.neighbors(&n("a")).map(|(v, _)| v.clone()).collect();
        let record = db.create_node_record(None, 0.0);
        db.upsert_node_record(record);
        let after: Vec<_> = db.local_graph.neighbors(&n("a")).map(|(v, _)| v.clone()).collect();
        assert_eq!(before, after);
    }
}
