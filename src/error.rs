//! Error types for the WARP routing engine.
//!
//! Expected outcomes (a stale LSA, an unroutable datagram) are never
//! modeled as errors here — they are plain return values (`false`,
//! `None`) observed through the [`crate::collab::EventSink`]. `WarpError`
//! is reserved for programming errors and corrupted local state.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised by the WARP routing engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WarpError {
    /// A null/default vertex was passed to a graph mutation.
    #[error("invalid vertex: node ids must be non-empty")]
    InvalidVertex,
    /// A node was asked about a link it is not an endpoint of.
    #[error("{0:?} is not adjacent via the requested edge")]
    NotAdjacent(NodeId),
    /// The owner of a local database is missing from its own local graph.
    ///
    /// This indicates corrupted routing state and should abort the
    /// simulation rather than be handled locally.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    /// `next_hop` was called on a destination-less datagram: a
    /// link-state payload whose own `Lsa::destination` is unset (a
    /// flood), which only the flooder's split-horizon re-flood may
    /// route, never the single-next-hop forwarding plane.
    #[error("next_hop called on a destination-less (flood) datagram")]
    BroadcastNextHop,
}

/// Convenience trait to turn an `Option` into a `Result<_, WarpError>`.
pub trait WarpErrorOption<T> {
    /// Transform `None` into `Err(WarpError::InvalidVertex)`.
    fn or_invalid_vertex(self) -> Result<T, WarpError>;

    /// Transform `None` into `Err(WarpError::NotAdjacent(who))`.
    fn or_not_adjacent(self, who: NodeId) -> Result<T, WarpError>;
}

impl<T> WarpErrorOption<T> for Option<T> {
    fn or_invalid_vertex(self) -> Result<T, WarpError> {
        self.ok_or(WarpError::InvalidVertex)
    }

    fn or_not_adjacent(self, who: NodeId) -> Result<T, WarpError> {
        self.ok_or(WarpError::NotAdjacent(who))
    }
}
