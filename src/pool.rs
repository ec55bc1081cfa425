//! Fixed-size particle storage.
//!
//! The pool is allocated once and never grows or shrinks. Modes decide which
//! slots take part in a frame through each particle's visibility flag.

use glam::Vec2;

use crate::config::{AmbientConfig, MorphConfig};
use crate::particle::Particle;
use crate::spawn::SpawnContext;

/// Owns every particle for the lifetime of an engine.
pub struct ParticlePool {
    particles: Vec<Particle>,
}

impl ParticlePool {
    /// Allocate `size` particles spread over `surface`.
    pub fn new(size: usize, ctx: &mut SpawnContext, surface: Vec2) -> Self {
        let particles = (0..size).map(|_| Particle::spawn(ctx, surface)).collect();
        Self { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    /// Number of particles currently flagged visible.
    pub fn visible_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_visible()).count()
    }

    /// Ambient pass. Slots below `active` are visible and updated; dormant
    /// slots that wake up are released straight into motion. Slots from
    /// `active` on are hidden and skipped.
    pub fn update_ambient(
        &mut self,
        params: &AmbientConfig,
        active: usize,
        surface: Vec2,
        cursor: Option<Vec2>,
        ctx: &mut SpawnContext,
    ) {
        for (i, particle) in self.particles.iter_mut().enumerate() {
            if i >= active {
                particle.set_visible(false);
                continue;
            }
            if !particle.is_visible() {
                particle.release_to_ambient(ctx, surface);
            }
            particle.update_ambient(params, surface, cursor, ctx);
        }
    }

    /// Morph pass over visible particles.
    pub fn update_morph(&mut self, params: &MorphConfig, cursor: Option<Vec2>) {
        for particle in self.particles.iter_mut().filter(|p| p.is_visible()) {
            particle.update_morph(params, cursor);
        }
    }

    /// Hide every particle from `start` to the end of the pool.
    pub fn hide_from(&mut self, start: usize) {
        for particle in self.particles.iter_mut().skip(start) {
            particle.set_visible(false);
        }
    }

    /// Give every particle a random target inside `surface`.
    pub fn scatter_targets(&mut self, ctx: &mut SpawnContext, surface: Vec2) {
        for particle in &mut self.particles {
            particle.retarget(ctx.random_in_rect(surface.x, surface.y));
        }
    }
}
