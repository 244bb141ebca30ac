//! The process-wide, deterministically seeded source of node priorities.
//!
//! Randomized balance only needs priorities drawn independently of insertion
//! order; a fixed seed keeps test behavior reproducible across runs, per
//! the same `once_cell::sync::Lazy<Mutex<_>>` shape `gtars` uses for its own
//! process-wide singletons (`gtars::bbcache::consts`, `gtars::bbclient::utils`).

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

const SEED: u64 = 0x7265_7261_7470_5f69;

static RNG: Lazy<Mutex<StdRng>> = Lazy::new(|| Mutex::new(StdRng::seed_from_u64(SEED)));

/// Draws the next node priority. A 32-bit space is large enough that
/// collisions are negligible for the tree sizes this structure targets.
pub(crate) fn next_priority() -> u32 {
    RNG.lock().unwrap().gen()
}
