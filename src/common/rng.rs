//! Seeded random source shared by every gameplay roll.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const DEFAULT_SEED: u64 = 0x5EED_0F_A11E5;

#[derive(Resource)]
pub struct GameRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Bernoulli draw. Chances above 1 always succeed.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.rng.gen_range(0.0f32..1.0) < p
    }

    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.rng.gen_range(0.0f32..1.0)
    }

    #[inline]
    pub fn sign(&mut self) -> f32 {
        if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
