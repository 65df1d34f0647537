// WarpRouting: a weighted multipath link-state routing protocol
// Copyright 2022-2026 The WarpRouting Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![deny(missing_debug_implementations)]

//! # WARP — Weighted Average Routing Protocol
//!
//! This crate implements the per-node routing engine of WARP, a link-state
//! multipath routing protocol for mesh networks. WARP computes several
//! diverse paths from a source to a destination, prunes candidates that
//! share a saturated bottleneck with a better path, and spreads traffic
//! across the survivors with a deficit-weighted random policy so that
//! long-run byte shares converge to the weight distribution.
//!
//! This library does not model a physical or transport layer, a topology
//! file format, or a user interface: it exchanges opaque [`Datagram`]s
//! through the [`OutboundQueue`] collaborator and learns about physical
//! adjacency through the [`TopologyOracle`] collaborator. Callers provide
//! both, together with an [`EventSink`] for observability, and drive the
//! simulation with periodic calls to [`WarpNode::update`].
//!
//! ## Main types
//!
//! - [`graph::Graph`] is the generic undirected weighted multigraph (its
//!   WARP specialization is [`graph::WarpGraph`]).
//! - [`spt`] contains the shortest-path engine: [`spt::dijkstra`] and
//!   [`spt::yens`].
//! - [`link::Link`] and [`link::effective_bandwidth`] implement the
//!   duplex/loss effective-bandwidth model.
//! - [`database::LocalDatabase`] is the per-node link-state database.
//! - [`flooder::LsaFlooder`] drives hello/LSA scheduling and flooding.
//! - [`kpath::k_path_selection`] is the filtered multipath selector.
//! - [`picker::pick_path`] is the deficit-weighted route picker.
//! - [`node::WarpNode`] wires all of the above into a single per-node state
//!   machine driven by [`node::WarpNode::update`] and
//!   [`node::WarpNode::receive`].
//!
//! ## Example
//!
//! ```
//! use warp_routing::prelude::*;
//!
//! let mut a = WarpConfig::default();
//! a.top_k = 2;
//! assert_eq!(a.top_k, 2);
//! ```

pub mod collab;
pub mod config;
pub mod database;
pub mod error;
pub mod flooder;
pub mod forwarding;
pub mod graph;
pub mod kpath;
pub mod link;
pub mod lsa;
pub mod node;
pub mod picker;
pub mod prelude;
pub mod spt;

#[cfg(test)]
mod test;
