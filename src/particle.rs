//! Particle entity: per-particle state and the two physics rules.
//!
//! A particle lives in one of two regimes, chosen by the engine each frame:
//!
//! - **Ambient** ([`Particle::update_ambient`]): drifts along its base
//!   velocity, is pushed away by the cursor, fades near the surface edges and
//!   breathes. Leaving the surface by more than the padding respawns it.
//! - **Morph** ([`Particle::update_morph`]): a damped spring pulls it toward
//!   its target, where it locks once close enough.
//!
//! Particles are never created or destroyed after the pool is built; they are
//! re-initialized in place.

use glam::Vec2;

use crate::color::{Rgb, ACCENT, DARK_1, DARK_2};
use crate::config::{AmbientConfig, MorphConfig};
use crate::spawn::SpawnContext;

/// Smallest particle radius, in pixels.
pub const RADIUS_MIN: f32 = 0.8;
/// Largest particle radius, in pixels.
pub const RADIUS_MAX: f32 = 1.5;
/// Largest per-axis drift speed, in pixels per frame.
pub const DRIFT_MAX: f32 = 0.3;

/// Color/opacity tier drawn at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTier {
    /// Rare, bright accent particles (10%).
    Accent,
    /// Dark particles (30%).
    Dark,
    /// Muted particles (60%).
    Muted,
}

impl ColorTier {
    /// Pick a tier from a uniform roll in `[0, 1)`.
    pub fn from_roll(roll: f32) -> Self {
        if roll > 0.9 {
            ColorTier::Accent
        } else if roll > 0.6 {
            ColorTier::Dark
        } else {
            ColorTier::Muted
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            ColorTier::Accent => ACCENT,
            ColorTier::Dark => DARK_1,
            ColorTier::Muted => DARK_2,
        }
    }

    pub fn max_alpha(self) -> f32 {
        match self {
            ColorTier::Accent => 0.9,
            ColorTier::Dark => 0.5,
            ColorTier::Muted => 0.4,
        }
    }
}

/// A single particle.
#[derive(Debug, Clone)]
pub struct Particle {
    position: Vec2,
    velocity: Vec2,
    base_velocity: Vec2,
    radius: f32,
    base_color: Rgb,
    current_color: Rgb,
    target_color: Rgb,
    max_alpha: f32,
    breath_phase: f32,
    breath_speed: f32,
    breath_amp: f32,
    fade_in: f32,
    render_alpha: f32,
    visible: bool,
    target: Vec2,
}

impl Particle {
    /// Spawn a particle at a random position inside `surface`.
    pub fn spawn(ctx: &mut SpawnContext, surface: Vec2) -> Self {
        let mut particle = Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            base_velocity: Vec2::ZERO,
            radius: ctx.random_range(RADIUS_MIN, RADIUS_MAX),
            base_color: DARK_2,
            current_color: DARK_2,
            target_color: DARK_2,
            max_alpha: 0.0,
            breath_phase: 0.0,
            breath_speed: 0.0,
            breath_amp: 0.0,
            fade_in: 0.0,
            render_alpha: 0.0,
            visible: true,
            target: Vec2::ZERO,
        };
        particle.respawn(ctx, surface);
        particle
    }

    /// Re-initialize in place: new position, drift, tier and oscillator.
    /// The radius is kept.
    pub fn respawn(&mut self, ctx: &mut SpawnContext, surface: Vec2) {
        self.position = ctx.random_in_rect(surface.x, surface.y);
        self.velocity = Vec2::ZERO;
        self.base_velocity = ctx.random_drift(DRIFT_MAX);
        self.render_alpha = 0.0;
        self.visible = true;

        let tier = ColorTier::from_roll(ctx.random());
        self.base_color = tier.color();
        self.current_color = self.base_color;
        self.target_color = self.base_color;
        self.max_alpha = tier.max_alpha();

        self.breath_phase = ctx.random_phase();
        self.breath_speed = ctx.random_range(0.02, 0.05);
        self.breath_amp = ctx.random_range(0.3, 0.5);
        self.fade_in = 0.0;

        self.target = self.position;
    }

    /// Ambient step: drift, cursor repulsion, edge fade, breathing.
    pub fn update_ambient(
        &mut self,
        params: &AmbientConfig,
        surface: Vec2,
        cursor: Option<Vec2>,
        ctx: &mut SpawnContext,
    ) {
        self.velocity += (self.base_velocity - self.velocity) * params.return_speed;

        if let Some(cursor) = cursor {
            let away = self.position - cursor;
            let dist_sq = away.length_squared();
            if dist_sq < params.cursor_radius * params.cursor_radius {
                let dist = dist_sq.sqrt();
                let falloff = (params.cursor_radius - dist) / params.cursor_radius;
                let dir = away.try_normalize().unwrap_or(Vec2::X);
                self.velocity += dir * falloff * params.cursor_force;
            }
        }

        self.position += self.velocity;

        self.fade_in = (self.fade_in + params.fade_in_step).min(1.0);

        let edge_fade = edge_fade(self.position, surface, params.screen_padding);

        self.breath_phase += self.breath_speed;
        let breath = 1.0 - (self.breath_phase.sin() * 0.5 + 0.5) * self.breath_amp;

        self.render_alpha = (self.max_alpha * edge_fade * self.fade_in * breath).clamp(0.0, 1.0);

        let pad = params.screen_padding;
        if self.position.x < -pad
            || self.position.x > surface.x + pad
            || self.position.y < -pad
            || self.position.y > surface.y + pad
        {
            self.respawn(ctx, surface);
        }

        if self.current_color != self.base_color {
            self.current_color = self.current_color.approach(self.base_color, params.color_relax);
        }
    }

    /// Morph step: spring toward the target, locking on once close.
    pub fn update_morph(&mut self, params: &MorphConfig, cursor: Option<Vec2>) {
        let to_target = self.target - self.position;

        if to_target.length_squared() < params.snap_epsilon_sq {
            self.position = self.target;
            self.velocity = Vec2::ZERO;
            self.current_color = self.target_color;
        } else {
            let mut force = Vec2::ZERO;
            if let Some(cursor) = cursor {
                let away = self.position - cursor;
                let dist_sq = away.length_squared();
                if dist_sq < params.cursor_repulsion_sq {
                    let strength = (params.cursor_repulsion_sq - dist_sq) / params.cursor_repulsion_sq;
                    force = away * strength * params.cursor_repulsion_force;
                }
            }

            self.velocity += to_target * params.ease + force;
            self.velocity *= params.drag;
            self.position += self.velocity;

            self.current_color = self.current_color.approach(self.target_color, params.ease);
        }

        self.fade_in = (self.fade_in + params.fade_in_step).min(1.0);
        self.render_alpha = (self.max_alpha * self.fade_in).clamp(0.0, 1.0);
    }

    /// Assign a new morph target. Resets fade-in, velocity and target color.
    pub fn move_to(&mut self, target: Vec2) {
        self.target = target;
        self.visible = true;
        self.fade_in = 0.0;
        self.velocity = Vec2::ZERO;
        self.target_color = self.base_color;
    }

    /// Override the color the particle eases toward while morphing.
    pub fn set_target_color(&mut self, color: Rgb) {
        self.target_color = color;
    }

    /// Point the particle somewhere new without touching anything else.
    pub(crate) fn retarget(&mut self, target: Vec2) {
        self.target = target;
    }

    /// Respawn and start moving at full drift speed immediately.
    pub fn release_to_ambient(&mut self, ctx: &mut SpawnContext, surface: Vec2) {
        self.respawn(ctx, surface);
        self.velocity = self.base_velocity;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // ========== Read access ==========

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn base_velocity(&self) -> Vec2 {
        self.base_velocity
    }

    #[inline]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn base_color(&self) -> Rgb {
        self.base_color
    }

    #[inline]
    pub fn color(&self) -> Rgb {
        self.current_color
    }

    #[inline]
    pub fn target_color(&self) -> Rgb {
        self.target_color
    }

    #[inline]
    pub fn max_alpha(&self) -> f32 {
        self.max_alpha
    }

    #[inline]
    pub fn fade_in(&self) -> f32 {
        self.fade_in
    }

    /// Alpha computed by the last update.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.render_alpha
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Linear fade across the padding margin outside the surface. 1 inside,
/// 0 at the padding edge; the stronger of the two axes wins.
fn edge_fade(pos: Vec2, surface: Vec2, padding: f32) -> f32 {
    let overshoot = |v: f32, max: f32| {
        if v < 0.0 {
            -v
        } else if v > max {
            v - max
        } else {
            0.0
        }
    };
    let worst = overshoot(pos.x, surface.x).max(overshoot(pos.y, surface.y));
    (1.0 - worst / padding).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: Vec2 = Vec2::new(800.0, 600.0);

    fn particle() -> (Particle, SpawnContext) {
        let mut ctx = SpawnContext::from_seed(11);
        let p = Particle::spawn(&mut ctx, SURFACE);
        (p, ctx)
    }

    #[test]
    fn test_tier_weights() {
        assert_eq!(ColorTier::from_roll(0.95), ColorTier::Accent);
        assert_eq!(ColorTier::from_roll(0.7), ColorTier::Dark);
        assert_eq!(ColorTier::from_roll(0.1), ColorTier::Muted);
        assert_eq!(ColorTier::from_roll(0.9), ColorTier::Dark);
        assert_eq!(ColorTier::Accent.max_alpha(), 0.9);
    }

    #[test]
    fn test_spawn_state() {
        let (p, _) = particle();
        assert!(p.radius() >= RADIUS_MIN && p.radius() <= RADIUS_MAX);
        assert_eq!(p.fade_in(), 0.0);
        assert_eq!(p.alpha(), 0.0);
        assert!(p.is_visible());
        assert_eq!(p.color(), p.base_color());
        assert!(p.position().x >= 0.0 && p.position().x <= SURFACE.x);
    }

    #[test]
    fn test_velocity_relaxes_toward_base() {
        let (mut p, mut ctx) = particle();
        let params = AmbientConfig::default();
        p.position = SURFACE / 2.0;
        p.velocity = Vec2::ZERO;
        p.base_velocity = Vec2::new(0.2, 0.0);
        p.update_ambient(&params, SURFACE, None, &mut ctx);
        assert!((p.velocity.x - 0.2 * 0.04).abs() < 1e-6);
        assert!(p.velocity.x < p.base_velocity.x);
    }

    #[test]
    fn test_cursor_pushes_away() {
        let (mut p, mut ctx) = particle();
        let params = AmbientConfig::default();
        p.position = Vec2::new(400.0, 300.0);
        p.velocity = Vec2::ZERO;
        p.base_velocity = Vec2::ZERO;
        p.update_ambient(&params, SURFACE, Some(Vec2::new(390.0, 300.0)), &mut ctx);
        // (60 - 10) / 60 * 2
        assert!((p.velocity.x - 50.0 / 60.0 * 2.0).abs() < 1e-5);
        assert!(p.velocity.y.abs() < 1e-6);
    }

    #[test]
    fn test_cursor_outside_radius_ignored() {
        let (mut p, mut ctx) = particle();
        let params = AmbientConfig::default();
        p.position = Vec2::new(400.0, 300.0);
        p.velocity = Vec2::ZERO;
        p.base_velocity = Vec2::ZERO;
        p.update_ambient(&params, SURFACE, Some(Vec2::new(400.0, 200.0)), &mut ctx);
        assert_eq!(p.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_edge_fade() {
        assert_eq!(edge_fade(Vec2::new(10.0, 10.0), SURFACE, 150.0), 1.0);
        assert!((edge_fade(Vec2::new(-75.0, 10.0), SURFACE, 150.0) - 0.5).abs() < 1e-6);
        assert!((edge_fade(Vec2::new(10.0, 630.0), SURFACE, 150.0) - 0.8).abs() < 1e-6);
        assert_eq!(edge_fade(Vec2::new(-400.0, 10.0), SURFACE, 150.0), 0.0);
    }

    #[test]
    fn test_out_of_bounds_respawns_inside() {
        let (mut p, mut ctx) = particle();
        let params = AmbientConfig::default();
        p.position = Vec2::new(-149.9, 300.0);
        p.base_velocity = Vec2::new(-0.3, 0.0);
        p.velocity = Vec2::new(-0.3, 0.0);
        p.fade_in = 1.0;
        p.update_ambient(&params, SURFACE, None, &mut ctx);
        assert!(p.position.x >= 0.0 && p.position.x <= SURFACE.x);
        assert_eq!(p.fade_in(), 0.0);
        assert_eq!(p.alpha(), 0.0);
    }

    #[test]
    fn test_ambient_alpha_in_unit_range() {
        let (mut p, mut ctx) = particle();
        let params = AmbientConfig::default();
        for _ in 0..500 {
            p.update_ambient(&params, SURFACE, Some(SURFACE / 2.0), &mut ctx);
            assert!((0.0..=1.0).contains(&p.alpha()));
            assert!((0.0..=1.0).contains(&p.fade_in()));
        }
    }

    #[test]
    fn test_color_relaxes_to_base_gradually() {
        let (mut p, mut ctx) = particle();
        let params = AmbientConfig::default();
        p.position = SURFACE / 2.0;
        p.current_color = Rgb::WHITE;
        p.update_ambient(&params, SURFACE, None, &mut ctx);
        assert_ne!(p.color(), Rgb::WHITE);
        assert_ne!(p.color(), p.base_color());
        for _ in 0..400 {
            p.position = SURFACE / 2.0;
            p.update_ambient(&params, SURFACE, None, &mut ctx);
        }
        assert_eq!(p.color(), p.base_color());
    }

    #[test]
    fn test_move_to_resets_state() {
        let (mut p, _) = particle();
        p.velocity = Vec2::new(3.0, 3.0);
        p.fade_in = 1.0;
        p.visible = false;
        p.target_color = Rgb::WHITE;
        p.move_to(Vec2::new(100.0, 100.0));
        assert_eq!(p.target(), Vec2::new(100.0, 100.0));
        assert!(p.is_visible());
        assert_eq!(p.fade_in(), 0.0);
        assert_eq!(p.velocity(), Vec2::ZERO);
        assert_eq!(p.target_color(), p.base_color());
    }

    #[test]
    fn test_morph_converges_and_snaps() {
        let (mut p, _) = particle();
        let params = MorphConfig::default();
        p.move_to(Vec2::new(120.0, 80.0));
        p.set_target_color(Rgb::WHITE);
        let mut snapped_at = None;
        for frame in 0..600 {
            p.update_morph(&params, None);
            if p.position() == p.target() {
                snapped_at = Some(frame);
                break;
            }
        }
        assert!(snapped_at.is_some(), "particle never locked onto its target");
        assert_eq!(p.velocity(), Vec2::ZERO);
        assert_eq!(p.color(), Rgb::WHITE);

        // Stays locked
        for _ in 0..10 {
            p.update_morph(&params, None);
            assert_eq!(p.position(), Vec2::new(120.0, 80.0));
            assert_eq!(p.velocity(), Vec2::ZERO);
        }
    }

    #[test]
    fn test_morph_spring_step() {
        let (mut p, _) = particle();
        let params = MorphConfig::default();
        p.position = Vec2::ZERO;
        p.move_to(Vec2::new(10.0, 0.0));
        p.update_morph(&params, None);
        // v = 10 * 0.15 * 0.92
        assert!((p.velocity().x - 1.38).abs() < 1e-5);
        assert!((p.position().x - 1.38).abs() < 1e-5);
        assert!((p.fade_in() - 0.05).abs() < 1e-6);
        assert!((p.alpha() - p.max_alpha() * 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_morph_cursor_repulsion() {
        let (mut p, _) = particle();
        let params = MorphConfig::default();
        p.position = Vec2::new(100.0, 100.0);
        p.move_to(Vec2::new(100.0, 110.0));
        let mut calm = p.clone();
        p.update_morph(&params, Some(Vec2::new(90.0, 100.0)));
        calm.update_morph(&params, None);
        assert!(p.velocity().x > calm.velocity().x);
    }

    #[test]
    fn test_release_starts_moving() {
        let (mut p, mut ctx) = particle();
        p.release_to_ambient(&mut ctx, SURFACE);
        assert_eq!(p.velocity(), p.base_velocity());
        assert!(p.is_visible());
    }
}
