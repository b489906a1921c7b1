//! Scenario selection
//!
//! Produces the presentation order for one attempt at a level.

use crate::data::Scenario;
use rand::seq::SliceRandom;
use rand::Rng;

/// A uniformly random permutation of `pool`; the pool itself is untouched
pub fn select_session<R: Rng + ?Sized>(pool: &[Scenario], rng: &mut R) -> Vec<Scenario> {
    let mut order = pool.to_vec();
    if order.len() > 1 {
        // Fisher-Yates
        order.shuffle(rng);
    }
    order
}

/// Like [`select_session`], keeping at most `limit` scenarios
pub fn select_session_limited<R: Rng + ?Sized>(
    pool: &[Scenario],
    limit: Option<usize>,
    rng: &mut R,
) -> Vec<Scenario> {
    let mut order = select_session(pool, rng);
    if let Some(limit) = limit {
        order.truncate(limit);
    }
    order
}
