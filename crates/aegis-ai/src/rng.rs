//! Seeded randomness for the stand-in models.
//!
//! Wraps `ChaCha8Rng` so identical seeds produce identical stand-in output
//! on every platform. Nothing in this crate calls `rand::thread_rng()`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed used when no explicit seed is provided.
pub const DEFAULT_SEED: u64 = 42;

/// Deterministic RNG handed to every stand-in.
///
/// Callers that need randomness take `&mut InferenceRng` and use `.0`
/// (a `ChaCha8Rng` implementing `rand::Rng`), or the helpers below.
#[derive(Debug, Clone)]
pub struct InferenceRng(pub ChaCha8Rng);

impl Default for InferenceRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl InferenceRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Uniform value in `[base, base + span)`.
    pub fn jitter(&mut self, base: f64, span: f64) -> f64 {
        base + self.0.r#gen::<f64>() * span
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.0.gen_range(0..items.len())])
    }
}
