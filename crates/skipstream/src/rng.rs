//! # Seeded RNG Resource
//!
//! All randomized operations in this crate draw from a single
//! [`ModelRng`] owned by the [`crate::model::Model`] and threaded by
//! `&mut` into component calls. Snapshots serialize the generator state,
//! so a restored model continues the exact same random sequence.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Environment variable consulted for a seed when none is configured.
pub const SEED_ENV_VAR: &str = "ATHENA_SEED";

/// The concrete generator used by models.
pub type ModelRng = ChaCha8Rng;

/// Build a [`ModelRng`] from an explicit seed, the [`SEED_ENV_VAR`]
/// environment variable, or OS entropy, in that order.
pub fn seeded_rng(seed: Option<u64>) -> ModelRng {
    match seed.or_else(env_seed) {
        Some(seed) => ModelRng::seed_from_u64(seed),
        None => ModelRng::from_entropy(),
    }
}

fn env_seed() -> Option<u64> {
    std::env::var(SEED_ENV_VAR).ok()?.trim().parse().ok()
}
