//! Seeded simulation randomness.
//!
//! Every random decision in the engine (bounce jitter, split headings, spawn
//! ring placement, boss scatter points) draws from this single resource so a
//! given seed always produces the same fight.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Resource, Debug, Clone)]
pub struct SimRng {
    rng: ChaCha8Rng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform value in `[lo, hi)`; returns `lo` for an empty range.
    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Symmetric jitter in `[-max, max]`.
    #[inline]
    pub fn jitter(&mut self, max: f32) -> f32 {
        let max = max.abs();
        if max == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-max..=max)
    }

    /// Uniform angle in radians.
    #[inline]
    pub fn angle(&mut self) -> f32 {
        self.range(0.0, std::f32::consts::TAU)
    }

    /// Uniform index in `0..len`; `0` for an empty range.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::new(0x5EED)
    }
}
