//! Collaborator traits: the seams WARP's core is injected through instead
//! of owning the physical/transport/event layers itself.
//!
//! Grounded in the teacher's split between `OspfProcess` (the protocol
//! logic) and the `Network`/event-queue machinery it is driven by — here
//! made explicit as traits rather than a concrete simulator singleton, per
//! the redesign away from a singleton simulation instance.

use crate::forwarding::Datagram;
use crate::graph::NodeId;

/// Read-only access to the *real* network topology, used only to
/// recognize a physically-adjacent neighbor that has relayed an LSA
/// before a graph edge to it exists locally (§4.4.1).
///
/// A WARP node's [`crate::database::LocalDatabase`] never consults this
/// to make routing decisions — only its own `local_graph` does that. This
/// trait exists purely to answer "is this forwarder actually one of my
/// physical links".
pub trait TopologyOracle {
    /// The physically-adjacent neighbors of `node`.
    fn neighbors_of(&self, node: &NodeId) -> Vec<NodeId>;
}

/// A `TopologyOracle` that claims no physical adjacency. Useful in tests
/// and for nodes that only ever learn neighbors via LSAs already carrying
/// a matching `direct_neighbors` entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTopologyOracle;

impl TopologyOracle for NullTopologyOracle {
    fn neighbors_of(&self, _node: &NodeId) -> Vec<NodeId> {
        Vec::new()
    }
}

/// The outbound send path: handing a datagram to the transport layer for
/// delivery to `target`. Delivery mechanics (queueing, serialization,
/// per-hop transmission delay) are out of scope — this is the boundary
/// the spec calls "physical link/queue".
pub trait OutboundQueue {
    /// Enqueue `datagram` for delivery toward `target`.
    fn send_datagram(&mut self, target: &NodeId, datagram: Datagram);
}

/// An `OutboundQueue` that records every send, for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutboundQueue {
    /// `(target, datagram)` pairs, in send order.
    pub sent: Vec<(NodeId, Datagram)>,
}

impl OutboundQueue for RecordingOutboundQueue {
    fn send_datagram(&mut self, target: &NodeId, datagram: Datagram) {
        self.sent.push((target.clone(), datagram));
    }
}

/// Observer hook for accepted/pruned paths and neighbor liveness events.
/// Generalizes the teacher's observer-multicast pattern down to a single
/// sink, per the redesign away from an observer list.
pub trait EventSink {
    /// A datagram addressed to `owner` was delivered locally.
    fn on_datagram_received(&mut self, _owner: &NodeId, _datagram: &Datagram) {}
    /// A datagram at `owner` had no usable next hop and was dropped
    /// silently (`ForwardUnroutable`): off-route, or its source route was
    /// exhausted before reaching the destination.
    fn on_datagram_dropped(&mut self, _owner: &NodeId, _datagram: &Datagram) {}
    /// A candidate path was accepted into the k-path set for `destination`.
    fn on_path_accepted(&mut self, _owner: &NodeId, _destination: &NodeId, _path: &[NodeId]) {}
    /// A previously accepted path was pruned for `destination`.
    fn on_path_pruned(&mut self, _owner: &NodeId, _destination: &NodeId, _path: &[NodeId]) {}
    /// A direct neighbor was declared dead.
    fn on_neighbor_dead(&mut self, _owner: &NodeId, _neighbor: &NodeId) {}
}

/// An `EventSink` that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {}

/// An `EventSink` that logs every event via the `log` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn on_datagram_received(&mut self, owner: &NodeId, datagram: &Datagram) {
        log::trace!("{owner}: delivered datagram from {}", datagram.source);
    }

    fn on_datagram_dropped(&mut self, owner: &NodeId, datagram: &Datagram) {
        log::debug!("{owner}: dropped unroutable datagram from {}", datagram.source);
    }

    fn on_path_accepted(&mut self, owner: &NodeId, destination: &NodeId, path: &[NodeId]) {
        log::info!("{owner}: accepted path to {destination}: {path:?}");
    }

    fn on_path_pruned(&mut self, owner: &NodeId, destination: &NodeId, path: &[NodeId]) {
        log::info!("{owner}: pruned path to {destination}: {path:?}");
    }

    fn on_neighbor_dead(&mut self, owner: &NodeId, neighbor: &NodeId) {
        log::warn!("{owner}: neighbor {neighbor} is dead");
    }
}
