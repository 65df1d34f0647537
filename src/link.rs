//! Link attributes and effective-bandwidth/weight derivation (C3).

use serde::{Deserialize, Serialize};

use crate::error::{WarpError, WarpErrorOption};
use crate::graph::NodeId;

/// Attributes of an undirected link between two nodes.
///
/// A `Link` carries what the two nodes negotiated (`bandwidth`,
/// `full_duplex`) plus the endpoint pair it was last inserted with;
/// byte-loss rates live on the endpoints themselves and are supplied at
/// evaluation time by [`effective_bandwidth`], matching the spec's "read
/// from the two endpoint nodes at evaluation time".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Raw transmission rate, in bits per second.
    pub bandwidth: f64,
    /// `false` halves the effective bandwidth.
    pub full_duplex: bool,
    endpoints: Option<(NodeId, NodeId)>,
}

impl Link {
    /// Build a new link with given bandwidth and duplex mode. Endpoints
    /// are unset until the link is placed into a graph.
    pub fn new(bandwidth: f64, full_duplex: bool) -> Self {
        Self {
            bandwidth,
            full_duplex,
            endpoints: None,
        }
    }

    /// The endpoint pair this link was last inserted with, if any.
    pub fn endpoints(&self) -> Option<(&NodeId, &NodeId)> {
        self.endpoints.as_ref().map(|(a, b)| (a, b))
    }

    /// Set the endpoint slots. Called by [`crate::graph::WarpGraph::add_edge`].
    pub fn set_endpoints(&mut self, a: NodeId, b: NodeId) {
        self.endpoints = Some((a, b));
    }

    /// Clone the link's bandwidth/duplex attributes, clearing the
    /// endpoint slots — the form the spec requires when cloning a link
    /// for re-insertion into another node's graph.
    pub fn clone_attributes(&self) -> Self {
        Self::new(self.bandwidth, self.full_duplex)
    }

    /// The endpoint other than `from`.
    ///
    /// Fails with [`WarpError::NotAdjacent`] if `from` is neither endpoint,
    /// and with [`WarpError::InvariantViolation`] if the link's endpoints
    /// were never set (it was never inserted into a graph).
    pub fn other_endpoint(&self, from: &NodeId) -> Result<&NodeId, WarpError> {
        let (a, b) = self
            .endpoints()
            .ok_or_else(|| WarpError::InvariantViolation("link has no endpoints set".into()))?;
        if a == from {
            Some(b)
        } else if b == from {
            Some(a)
        } else {
            None
        }
        .or_not_adjacent(from.clone())
    }
}

/// Compute the effective bandwidth of `link` given the byte-loss rates of
/// its two endpoints.
///
/// `effective_bandwidth = bandwidth * (full_duplex ? 1 : 0.5) * (1 -
/// loss_a) * (1 - loss_b)`.
pub fn effective_bandwidth(link: &Link, loss_a: f64, loss_b: f64) -> f64 {
    let duplex_factor = if link.full_duplex { 1.0 } else { 0.5 };
    link.bandwidth * duplex_factor * (1.0 - loss_a) * (1.0 - loss_b)
}

/// Convert an effective bandwidth into a scalar routing weight:
/// `1 / effective_bandwidth`, or `+inf` when the bandwidth is zero.
pub fn link_weight(effective_bandwidth: f64) -> f64 {
    if effective_bandwidth <= 0.0 {
        f64::INFINITY
    } else {
        1.0 / effective_bandwidth
    }
}

/// A neighbor's identity together with the link that reaches it, as
/// reported from one node's point of view inside a [`crate::lsa::NodeRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// The link itself.
    pub link: Link,
    /// The node at the far end of the link.
    pub peer: NodeId,
    /// Effective bandwidth at the time this record was produced.
    pub effective_bandwidth: f64,
}
