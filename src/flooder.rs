//! The LSA flooder (C5): the hello/broadcast schedule and split-horizon
//! re-flood rule.
//!
//! Grounded in the teacher's generic per-tick `update()`/event-queue
//! scheduling pattern (the way `Network` and its protocol processes are
//! driven one `delta` at a time rather than by real wall-clock timers),
//! generalized to WARP's two-tier schedule: most ticks emit a unicast
//! hello per direct neighbor, and every `hello_broadcast_interval` ticks
//! instead emit a full flood of the owner's own node record.

use crate::config::WarpConfig;
use crate::graph::{NodeId, WarpGraph};

/// What kind of emission a flooder tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionKind {
    /// A unicast hello to each direct neighbor.
    Unicast,
    /// A full flood of the owner's own record to every direct neighbor.
    Broadcast,
}

/// Drives the hello/broadcast schedule for one node.
#[derive(Debug, Clone)]
pub struct LsaFlooder {
    hello_interval: f64,
    hello_broadcast_interval: u32,
    elapsed_since_hello: f64,
    hello_count: u32,
}

impl LsaFlooder {
    /// Build a flooder from `config`'s hello timing. The first hello is
    /// due after `hello_interval` minus a deterministic jitter offset
    /// derived from `config.hello_jitter_seed`, so a fleet of nodes
    /// sharing one `WarpConfig` doesn't all emit their first hello on
    /// the same tick (§4.5).
    pub fn new(config: &WarpConfig) -> Self {
        Self {
            hello_interval: config.hello_interval,
            hello_broadcast_interval: config.hello_broadcast_interval,
            elapsed_since_hello: initial_jitter(config.hello_jitter_seed, config.hello_interval),
            hello_count: 0,
        }
    }

    /// Advance the schedule by `delta` seconds. Returns the kind of
    /// emission due, if any; may fire at most once per call even if
    /// `delta` spans multiple intervals (the caller is expected to tick
    /// at a finer granularity than `hello_interval`).
    pub fn tick(&mut self, delta: f64) -> Option<EmissionKind> {
        self.elapsed_since_hello += delta;
        if self.elapsed_since_hello < self.hello_interval {
            return None;
        }
        self.elapsed_since_hello -= self.hello_interval;
        self.hello_count += 1;

        if self.hello_broadcast_interval > 0 && self.hello_count % self.hello_broadcast_interval == 0 {
            Some(EmissionKind::Broadcast)
        } else {
            Some(EmissionKind::Unicast)
        }
    }

    /// The direct neighbors of `owner` in `graph`, excluding both `origin`
    /// (the LSA's originating node) and `forwarding_node` (the neighbor
    /// that relayed this copy to `owner`) — the split-horizon re-flood
    /// rule: never send an LSA back toward where it came from or where it
    /// was created, even when those are two different neighbors.
    pub fn reflood_targets<'a>(
        graph: &'a WarpGraph,
        owner: &NodeId,
        origin: &NodeId,
        forwarding_node: &NodeId,
    ) -> impl Iterator<Item = &'a NodeId> + 'a {
        let origin = origin.clone();
        let forwarding_node = forwarding_node.clone();
        graph
            .neighbors(owner)
            .map(|(v, _)| v)
            .filter(move |v| **v != origin && **v != forwarding_node)
    }
}

/// A deterministic offset into `[0, hello_interval)` derived from `seed`.
/// `seed == 0` always yields `0.0`, so `WarpConfig::default()` leaves
/// existing fixed-tick tests unaffected.
fn initial_jitter(seed: u64, hello_interval: f64) -> f64 {
    if hello_interval <= 0.0 {
        return 0.0;
    }
    const PRIME: u64 = 1_000_003;
    (seed % PRIME) as f64 / PRIME as f64 * hello_interval
}

/// A per-node seed folded into [`WarpConfig::hello_jitter_seed`] so nodes
/// sharing one config still jitter independently, derived from the
/// node's own id.
pub fn node_jitter_seed(id: &NodeId) -> u64 {
    // FNV-1a, matching nothing fancier than "cheap, deterministic, well
    // distributed" — this is a schedule offset, not a security boundary.
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in id.0.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::link::Link;

    fn n(name: &str) -> NodeId {
        NodeId::new(name)
    }

    #[test]
    fn tick_fires_only_after_interval_elapses() {
        let config = WarpConfig::default().with_hello_interval(5.0);
        let mut flooder = LsaFlooder::new(&config);
        assert_eq!(flooder.tick(3.0), None);
        assert_eq!(flooder.tick(3.0), Some(EmissionKind::Unicast));
    }

    #[test]
    fn every_nth_tick_is_a_broadcast() {
        let config = WarpConfig::default()
            .with_hello_interval(1.0)
            .with_hello_broadcast_interval(3);
        let mut flooder = LsaFlooder::new(&config);
        let kinds: Vec<_> = (0..6).map(|_| flooder.tick(1.0).unwrap()).collect();
        assert_eq!(
            kinds,
            vec![
                EmissionKind::Unicast,
                EmissionKind::Unicast,
                EmissionKind::Broadcast,
                EmissionKind::Unicast,
                EmissionKind::Unicast,
                EmissionKind::Broadcast,
            ]
        );
    }

    #[test]
    fn reflood_excludes_the_forwarder() {
        let mut g = WarpGraph::new();
        g.add_edge(n("a"), n("b"), Link::new(100.0, true));
        g.add_edge(n("a"), n("c"), Link::new(100.0, true));
        g.add_edge(n("a"), n("d"), Link::new(100.0, true));
        let targets: Vec<_> = LsaFlooder::reflood_targets(&g, &n("a"), &n("z"), &n("b"))
            .cloned()
            .collect();
        assert_eq!(targets, vec![n("c"), n("d")]);
    }

    #[test]
    fn reflood_excludes_both_origin_and_forwarder() {
        let mut g = WarpGraph::new();
        g.add_edge(n("a"), n("b"), Link::new(100.0, true));
        g.add_edge(n("a"), n("c"), Link::new(100.0, true));
        g.add_edge(n("a"), n("z"), Link::new(100.0, true));
        let targets: Vec<_> = LsaFlooder::reflood_targets(&g, &n("a"), &n("z"), &n("b"))
            .cloned()
            .collect();
        assert_eq!(targets, vec![n("c")], "origin z and forwarder b both excluded even though distinct");
    }

    #[test]
    fn jitter_seed_zero_leaves_schedule_unjittered() {
        let config = WarpConfig::default().with_hello_interval(5.0);
        let flooder = LsaFlooder::new(&config);
        assert_eq!(flooder.elapsed_since_hello, 0.0);
    }

    #[test]
    fn distinct_jitter_seeds_offset_the_first_hello_differently() {
        let a = LsaFlooder::new(&WarpConfig::default().with_hello_interval(5.0).with_hello_jitter_seed(1));
        let b = LsaFlooder::new(&WarpConfig::default().with_hello_interval(5.0).with_hello_jitter_seed(2));
        assert_ne!(a.elapsed_since_hello, b.elapsed_since_hello);
        assert!(a.elapsed_since_hello < 5.0);
        assert!(b.elapsed_since_hello < 5.0);
    }

    #[test]
    fn node_jitter_seed_differs_by_node_id() {
        assert_ne!(node_jitter_seed(&n("a")), node_jitter_seed(&n("b")));
    }
}
