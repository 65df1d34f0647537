//! The WARP node (C4+C5+C6+C7+C8 glue): one node's full protocol state,
//! driven by `update`/`receive` calls from the surrounding simulation.
//!
//! Grounded in the teacher's `Router`/`OspfProcess` pairing: a router
//! struct that owns protocol sub-state and exposes `handle_event`-style
//! entry points, generalized here over the collaborator traits in
//! [`crate::collab`] instead of a concrete `Network` the router reaches
//! back into.

use rand::Rng;

use crate::collab::{EventSink, OutboundQueue, TopologyOracle};
use crate::config::WarpConfig;
use crate::database::LocalDatabase;
use crate::error::WarpError;
use crate::flooder::{EmissionKind, LsaFlooder};
use crate::forwarding::{self, Datagram, Payload};
use crate::graph::NodeId;
use crate::kpath::k_path_selection;
use crate::lsa::Lsa;
use crate::picker::pick_path;

/// The candidate-path search budget for k-path selection, expressed as a
/// multiple of `top_k`: generous enough that a sparsely connected graph
/// still fills the k-path set when it can, small enough to bound work on
/// a dense one.
const CANDIDATE_BUDGET_FACTOR: usize = 20;

/// Default byte-loss rate assumed for a node until told otherwise.
/// Overridable via [`WarpNode::set_byte_loss_rate`].
const DEFAULT_BYTE_LOSS_RATE: f64 = 0.0;

/// One node's full WARP protocol state.
///
/// `R` is the random source behind path draws ([`crate::picker::pick_path`]),
/// injected rather than freshly instantiated per call, per the redesign
/// away from ad hoc `rand::thread_rng()` calls scattered through protocol
/// logic.
#[derive(Debug)]
pub struct WarpNode<R: Rng> {
    id: NodeId,
    config: WarpConfig,
    database: LocalDatabase,
    flooder: LsaFlooder,
    rng: R,
    byte_loss_rate: f64,
    highest_observed_queue_ratio: Option<f64>,
}

impl<R: Rng> WarpNode<R> {
    /// Build a fresh node identified by `id`. Give each node in a fleet a
    /// distinct `config.hello_jitter_seed` (see
    /// [`crate::flooder::node_jitter_seed`] for a ready-made derivation
    /// from `id`) so their hello schedules don't start in lockstep (§4.5).
    pub fn new(id: NodeId, config: WarpConfig, rng: R) -> Self {
        let database = LocalDatabase::new(id.clone(), config.top_k, config.lsa_neighbor_timeout);
        let flooder = LsaFlooder::new(&config);
        Self {
            id,
            config,
            database,
            flooder,
            rng,
            byte_loss_rate: DEFAULT_BYTE_LOSS_RATE,
            highest_observed_queue_ratio: None,
        }
    }

    /// This node's identity.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Read-only access to the local database, e.g. for inspection in
    /// tests or monitoring.
    pub fn database(&self) -> &LocalDatabase {
        &self.database
    }

    /// Set the byte-loss rate this node reports about itself in its own
    /// node records.
    pub fn set_byte_loss_rate(&mut self, rate: f64) {
        self.byte_loss_rate = rate;
    }

    /// Record the highest observed outbound-queue fill ratio, folded
    /// into the next self-record this node emits.
    pub fn record_queue_ratio(&mut self, ratio: f64) {
        self.highest_observed_queue_ratio =
            Some(self.highest_observed_queue_ratio.map_or(ratio, |m| m.max(ratio)));
    }

    /// Advance this node's clock by `delta` seconds: first liveness
    /// timers (dead neighbors may be declared and notified), then the
    /// hello/broadcast schedule (per §5's ordering: neighbor timeouts
    /// before emissions before ingestion).
    pub fn update(
        &mut self,
        delta: f64,
        topology: &impl TopologyOracle,
        outbound: &mut impl OutboundQueue,
        sink: &mut impl EventSink,
    ) {
        for notice in self.database.update_liveness(delta) {
            sink.on_neighbor_dead(&self.id, &notice.dead);
            for (target, lsa) in notice.corrective_lsas {
                self.send_lsa(target, lsa, topology, outbound);
            }
        }

        if let Some(kind) = self.flooder.tick(delta) {
            self.emit(kind, topology, outbound);
        }
    }

    /// Emit a scheduled hello or broadcast (§4.5).
    fn emit(&mut self, kind: EmissionKind, topology: &impl TopologyOracle, outbound: &mut impl OutboundQueue) {
        let seq = self.database.get_next_sequence_number();
        let record = self
            .database
            .create_node_record(self.highest_observed_queue_ratio.take(), self.byte_loss_rate);
        self.database.sequence_numbers.insert(self.id.clone(), seq);
        self.database.max_sequence_number = self.database.max_sequence_number.max(seq);

        let neighbors: Vec<NodeId> = self
            .database
            .local_graph
            .neighbors(&self.id)
            .map(|(v, _)| v.clone())
            .collect();

        for neighbor in neighbors {
            let destination = match kind {
                EmissionKind::Unicast => Some(neighbor.clone()),
                EmissionKind::Broadcast => None,
            };
            let lsa = Lsa {
                node_record: record.clone(),
                sequence_number: seq,
                forwarding_node: self.id.clone(),
                destination,
            };
            self.send_lsa(neighbor, lsa, topology, outbound);
        }
    }

    /// Hand a single-hop LSA datagram to the outbound queue, addressed
    /// directly to `target` — the transport boundary is responsible for
    /// actual delivery, whether or not `target` is graph-adjacent (see
    /// [`crate::collab::OutboundQueue`]).
    fn send_lsa(
        &self,
        target: NodeId,
        lsa: Lsa,
        _topology: &impl TopologyOracle,
        outbound: &mut impl OutboundQueue,
    ) {
        let route = vec![self.id.clone(), target.clone()];
        outbound.send_datagram(&target, Datagram::lsa(route, lsa));
    }

    /// Handle an inbound datagram. For link-state payloads, processes
    /// and (for floods) re-floods per split horizon. For data payloads
    /// not addressed here, forwards per [`forwarding::next_hop`].
    pub fn receive(
        &mut self,
        datagram: Datagram,
        topology: &impl TopologyOracle,
        outbound: &mut impl OutboundQueue,
        sink: &mut impl EventSink,
    ) -> Result<(), WarpError> {
        match &datagram.payload {
            Payload::LinkState(lsa) => self.receive_lsa(lsa.clone(), topology, outbound),
            Payload::Data(_) => self.forward(datagram, outbound, sink),
        }
    }

    fn receive_lsa(
        &mut self,
        lsa: Lsa,
        topology: &impl TopologyOracle,
        outbound: &mut impl OutboundQueue,
    ) -> Result<(), WarpError> {
        let accepted = self.database.process_lsa(&lsa, topology);
        if accepted && !lsa.is_unicast() {
            let origin = lsa.origin().clone();
            let forwarder = lsa.forwarding_node.clone();
            let targets: Vec<NodeId> =
                LsaFlooder::reflood_targets(&self.database.local_graph, &self.id, &origin, &forwarder)
                    .cloned()
                    .collect();
            for target in targets {
                let route = vec![self.id.clone(), target.clone()];
                outbound.send_datagram(&target, Datagram::lsa(route, lsa.clone()));
            }
        }
        Ok(())
    }

    fn forward(
        &mut self,
        datagram: Datagram,
        outbound: &mut impl OutboundQueue,
        sink: &mut impl EventSink,
    ) -> Result<(), WarpError> {
        match forwarding::next_hop(&self.id, &datagram)? {
            forwarding::Forward::ToNextHop(next) => {
                outbound.send_datagram(&next, datagram);
            }
            forwarding::Forward::Deliver => {
                sink.on_datagram_received(&self.id, &datagram);
            }
            forwarding::Forward::Unroutable => {
                sink.on_datagram_dropped(&self.id, &datagram);
            }
        }
        Ok(())
    }

    /// Choose a route to `destination` and build a ready-to-send data
    /// datagram of `packet_size` bytes, recomputing the k-path set first
    /// if none is cached (C6 + C7).
    ///
    /// `Ok(None)` means no route exists to `destination` (expected — not
    /// every destination is reachable). `Err` propagates
    /// [`WarpError::InvariantViolation`] out of [`k_path_selection`],
    /// which should abort the simulation rather than be handled locally.
    pub fn originate(
        &mut self,
        destination: &NodeId,
        packet_size: usize,
        sink: &mut impl EventSink,
    ) -> Result<Option<Datagram>, WarpError> {
        if !self.database.routes.contains_key(destination) {
            let weights = self.database.edge_weights();
            let capacities = self.database.edge_capacities();
            let candidate_budget = self.config.top_k * CANDIDATE_BUDGET_FACTOR;
            let routes = k_path_selection(
                &self.id,
                destination,
                &self.database.local_graph,
                &weights,
                &capacities,
                self.config.top_k,
                candidate_budget,
                sink,
            )?;
            if routes.is_empty() {
                return Ok(None);
            }
            self.database.routes.insert(destination.clone(), routes);
        }

        let Some(routes) = self.database.routes.get_mut(destination) else {
            return Ok(None);
        };
        let chosen = pick_path(routes, packet_size as f64, &mut self.rng);
        let route = routes[chosen].path.clone();
        Ok(Some(Datagram::data(route, packet_size)))
    }
}
