//! Node records and link-state advertisements: the payloads the local
//! database (C4) and flooder (C5) exchange.

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;
use crate::link::LinkRecord;

/// A snapshot of a node's local view of itself, as built by
/// [`crate::database::LocalDatabase::create_node_record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// The node this record describes.
    pub node: NodeId,
    /// The node's current links, as seen from its own side.
    pub links: Vec<LinkRecord>,
    /// Maximum queue-fill ratio across the node's outbound link queues, a
    /// load hint for downstream effective-bandwidth adjustments.
    pub highest_observed_queue_ratio: Option<f64>,
    /// Byte-loss rate attributed to this node, read by neighbors when
    /// they derive effective bandwidth for links incident to it. Not
    /// itemized separately in the minimal data model, but required by
    /// the effective-bandwidth formula; see `DESIGN.md`.
    pub byte_loss_rate: f64,
}

impl NodeRecord {
    /// Find the link record describing the link to `peer`, if any.
    pub fn link_to(&self, peer: &NodeId) -> Option<&LinkRecord> {
        self.links.iter().find(|l| &l.peer == peer)
    }
}

/// A Link State Advertisement: one node's record, sequenced and
/// attributed to the neighbor that relayed this particular copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lsa {
    /// The advertised node record.
    pub node_record: NodeRecord,
    /// Strictly monotonic per-origin sequence number.
    pub sequence_number: u64,
    /// The neighbor that relayed this copy. Equal to `node_record.node`
    /// on first emission.
    pub forwarding_node: NodeId,
    /// `Some(n)` for a unicast hello addressed to `n`; `None` for a flood.
    pub destination: Option<NodeId>,
}

impl Lsa {
    /// The node that originated this advertisement.
    pub fn origin(&self) -> &NodeId {
        &self.node_record.node
    }

    /// Whether this copy is a unicast hello (as opposed to a flood).
    pub fn is_unicast(&self) -> bool {
        self.destination.is_some()
    }

    /// Approximate wire size in bytes, matching the simulator's
    /// transmission-timing accounting: a fixed `4 + 4` byte datagram
    /// header plus a `4 + 4 + links_count * 12` byte LSA payload.
    pub fn wire_size_bytes(&self) -> usize {
        8 + 8 + self.node_record.links.len() * 12
    }
}
