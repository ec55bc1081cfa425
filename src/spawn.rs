//! Spawn context for particle initialization.
//!
//! Every random decision the engine makes goes through one [`SpawnContext`]:
//! respawn positions, drift velocities, color tiers, breathing oscillators
//! and the point shuffle during target assignment. Seeding it makes a whole
//! engine run reproducible.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Seeded random source with helpers for common spawn patterns.
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context seeded from the system clock.
    ///
    /// Different on every program execution.
    pub fn new() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::from_seed(seed)
    }

    /// Create a context with a fixed seed for reproducible runs.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random() * (max - min)
    }

    // ========== Particle helpers ==========

    /// Uniformly random point inside the `width` x `height` rectangle at the origin.
    pub fn random_in_rect(&mut self, width: f32, height: f32) -> Vec2 {
        Vec2::new(self.random_range(0.0, width), self.random_range(0.0, height))
    }

    /// Random drift vector with each axis in `[-max_axis, max_axis)`.
    pub fn random_drift(&mut self, max_axis: f32) -> Vec2 {
        Vec2::new(
            self.random_range(-max_axis, max_axis),
            self.random_range(-max_axis, max_axis),
        )
    }

    /// Random oscillator phase in `[0, TAU)`.
    pub fn random_phase(&mut self) -> f32 {
        self.random_range(0.0, TAU)
    }

    /// Shuffle a slice in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for SpawnContext {
    fn default() -> Self {
        Self::new()
    }
}
