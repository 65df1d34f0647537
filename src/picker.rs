//! The deficit-weighted path picker (C7): draws one of the candidate
//! routes toward a destination, favoring paths that have fallen behind
//! their weight-implied traffic share.
//!
//! Grounded in the teacher's `custom_protocol::distance_vector` module,
//! which picks among several next hops by a configurable weighting
//! rather than always taking the single cheapest one — generalized here
//! from "next hop" to "whole path" and from "static weight" to
//! "weight adjusted by accumulated deficit".

use rand::Rng;

use crate::database::RouteInformation;

/// Pick one of `routes` to send the next packet of `packet_size` bytes
/// along, weighted by each route's deficit-adjusted share, then update
/// every route's deficit bookkeeping to reflect the send.
///
/// `alpha = 1 + packet_size / (packet_size + 512)`, in `[1, 2)` — larger
/// packets push `alpha` closer to 2. Each route's draw weight is
/// `max(0, total_weight ^ alpha + deficit_bytes / alpha)`; this is the
/// "deficit divided by alpha" variant (as opposed to dividing by
/// `packet_size`), per the newest-snapshot behavior.
///
/// After a route is picked, `total_bytes_sent` grows by `packet_size` and
/// every route's `deficit_bytes` is recomputed so the deficits still sum
/// to (approximately) zero: each route's bytes-sent is compared against
/// the weight-implied ideal share of the new total.
pub fn pick_path(routes: &mut [RouteInformation], packet_size: f64, rng: &mut impl Rng) -> usize {
    assert!(!routes.is_empty(), "pick_path requires at least one route");

    let alpha = 1.0 + packet_size / (packet_size + 512.0);
    let draw_weights: Vec<f64> = routes
        .iter()
        .map(|r| (r.total_weight.powf(alpha) + r.deficit_bytes / alpha).max(0.0))
        .collect();

    let total: f64 = draw_weights.iter().sum();
    let chosen = if total <= 0.0 {
        0
    } else {
        let mut draw = rng.gen_range(0.0..total);
        let mut chosen = routes.len() - 1;
        for (i, w) in draw_weights.iter().enumerate() {
            if draw < *w {
                chosen = i;
                break;
            }
            draw -= w;
        }
        chosen
    };

    routes[chosen].total_bytes_sent += packet_size;
    rebalance_deficits(routes);
    chosen
}

/// Recompute every route's `deficit_bytes` so they sum to (approximately)
/// zero: `G_bytes * total_weight / G_weight - total_bytes_sent`, the
/// weight-implied ideal share of the total bytes sent so far minus what
/// it has actually carried.
fn rebalance_deficits(routes: &mut [RouteInformation]) {
    let total_bytes: f64 = routes.iter().map(|r| r.total_bytes_sent).sum();
    let total_weight: f64 = routes.iter().map(|r| r.total_weight).sum();
    if total_weight <= 0.0 {
        return;
    }
    for route in routes.iter_mut() {
        route.deficit_bytes = total_bytes * route.total_weight / total_weight - route.total_bytes_sent;
    }
}
