//! Per-node configuration.

use serde::{Deserialize, Serialize};

/// Configuration knobs for a [`crate::node::WarpNode`].
///
/// Constructed with [`Default::default`] and then adjusted field-by-field
/// or through the `with_*` builder methods, the way the teacher's
/// `Network` is configured through individual setters rather than a single
/// config-file load (topology files are a Non-goal collaborator here).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarpConfig {
    /// Seconds between hello emissions.
    pub hello_interval: f64,
    /// Every this many hellos, the emission is a broadcast instead of a
    /// per-neighbor unicast.
    pub hello_broadcast_interval: u32,
    /// Maximum number of candidate paths cached per destination.
    ///
    /// Setting this to `1` degenerates WARP into shortest-path routing.
    pub top_k: usize,
    /// Seconds without any LSA from a direct neighbor before it is
    /// declared dead.
    pub lsa_neighbor_timeout: f64,
    /// Seed folded into each node's initial hello-schedule jitter (see
    /// [`crate::flooder::LsaFlooder`]), so a shared `WarpConfig` cloned
    /// across many nodes doesn't by itself synchronize their hello
    /// ticks. `0` (the default) contributes no jitter on its own;
    /// `WarpNode::new` additionally folds in a per-node offset derived
    /// from the node's own id.
    pub hello_jitter_seed: u64,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            hello_interval: 5.0,
            hello_broadcast_interval: 3,
            top_k: 3,
            lsa_neighbor_timeout: 15.0,
            hello_jitter_seed: 0,
        }
    }
}

impl WarpConfig {
    /// Set `top_k`.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set `hello_interval`.
    pub fn with_hello_interval(mut self, seconds: f64) -> Self {
        self.hello_interval = seconds;
        self
    }

    /// Set `hello_broadcast_interval`.
    pub fn with_hello_broadcast_interval(mut self, n: u32) -> Self {
        self.hello_broadcast_interval = n;
        self
    }

    /// Set `lsa_neighbor_timeout`.
    pub fn with_lsa_neighbor_timeout(mut self, seconds: f64) -> Self {
        self.lsa_neighbor_timeout = seconds;
        self
    }

    /// Set `hello_jitter_seed`.
    pub fn with_hello_jitter_seed(mut self, seed: u64) -> Self {
        self.hello_jitter_seed = seed;
        self
    }
}
