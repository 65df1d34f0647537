//! The forwarding plane (C8): source-routed datagrams and the next-hop
//! decision tree that walks them hop by hop.
//!
//! Grounded in the teacher's `forwarding_state.rs`, which resolves a
//! destination to an egress interface from precomputed per-router state;
//! WARP instead bakes the whole route into the datagram at the source
//! (the path was already chosen by [`crate::picker::pick_path`]), so
//! forwarding at each hop is a route-list lookup rather than a
//! recomputation.

use serde::{Deserialize, Serialize};

use crate::error::WarpError;
use crate::graph::NodeId;
use crate::lsa::Lsa;

/// What a datagram carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Ordinary data traffic of the given size.
    Data(usize),
    /// A link-state advertisement riding as a datagram payload.
    LinkState(Lsa),
}

/// A source-routed datagram: the full hop sequence is fixed at the
/// source and never recomputed in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datagram {
    /// Originating node.
    pub source: NodeId,
    /// Final destination.
    pub destination: NodeId,
    /// What is being carried.
    pub payload: Payload,
    /// The chosen path, source first, destination last.
    pub route: Vec<NodeId>,
}

impl Datagram {
    /// Build a data datagram along `route` (source-first, destination-last).
    pub fn data(route: Vec<NodeId>, size_bytes: usize) -> Self {
        let source = route.first().cloned().expect("route has at least one hop");
        let destination = route.last().cloned().expect("route has at least one hop");
        Self {
            source,
            destination,
            payload: Payload::Data(size_bytes),
            route,
        }
    }

    /// Build a datagram carrying `lsa` along `route`.
    pub fn lsa(route: Vec<NodeId>, lsa: Lsa) -> Self {
        let source = route.first().cloned().expect("route has at least one hop");
        let destination = route.last().cloned().expect("route has at least one hop");
        Self {
            source,
            destination,
            payload: Payload::LinkState(lsa),
            route,
        }
    }

    /// Wire size in bytes: the payload size plus a fixed datagram header.
    pub fn size_bytes(&self) -> usize {
        const HEADER_BYTES: usize = 16;
        HEADER_BYTES
            + match &self.payload {
                Payload::Data(n) => *n,
                Payload::LinkState(lsa) => lsa.wire_size_bytes(),
            }
    }
}

/// The outcome of walking the forwarding decision tree for one datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Forward {
    /// `owner` is the destination; deliver locally.
    Deliver,
    /// Forward on to the next hop.
    ToNextHop(NodeId),
    /// `owner` is not on the route, or the route is exhausted before
    /// reaching the destination. Expected outcome (`ForwardUnroutable`):
    /// the datagram is dropped silently, never surfaced as an error.
    Unroutable,
}

/// Walk the decision tree for a datagram arriving at `owner`: deliver
/// locally, forward to the next hop, or drop.
///
/// Only source-routed datagrams with a concrete destination are valid
/// input here — a link-state payload that is itself a flood (its
/// `Lsa::destination` unset) has no single next hop by definition and is
/// instead routed by the flooder's own split-horizon re-flood, never by
/// this function; passing one in is a programming error
/// ([`WarpError::BroadcastNextHop`]).
pub fn next_hop(owner: &NodeId, datagram: &Datagram) -> Result<Forward, WarpError> {
    if let Payload::LinkState(lsa) = &datagram.payload {
        if lsa.destination.is_none() {
            return Err(WarpError::BroadcastNextHop);
        }
    }

    if &datagram.destination == owner {
        return Ok(Forward::Deliver);
    }
    let next = datagram
        .route
        .iter()
        .position(|hop| hop == owner)
        .and_then(|position| datagram.route.get(position + 1));
    match next {
        Some(next) => Ok(Forward::ToNextHop(next.clone())),
        None => Ok(Forward::Unroutable),
    }
}
