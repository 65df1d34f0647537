//! Convenience re-exports for common downstream usage.

pub use crate::collab::{
    EventSink, LoggingEventSink, NullEventSink, NullTopologyOracle, OutboundQueue,
    RecordingOutboundQueue, TopologyOracle,
};
pub use crate::config::WarpConfig;
pub use crate::database::{LocalDatabase, RouteInformation};
pub use crate::error::{WarpError, WarpErrorOption};
pub use crate::flooder::{EmissionKind, LsaFlooder};
pub use crate::forwarding::{next_hop, Datagram, Payload};
pub use crate::graph::{EdgeKey, NodeId, WarpGraph};
pub use crate::kpath::k_path_selection;
pub use crate::link::{effective_bandwidth, link_weight, Link, LinkRecord};
pub use crate::lsa::{Lsa, NodeRecord};
pub use crate::node::WarpNode;
pub use crate::picker::pick_path;
pub use crate::spt::{dijkstra, yens, EdgeWeights};
