//! Mode state machine and the ambient growth clock.
//!
//! ```text
//!            request with >= 1 shape
//!   AMBIENT ------------------------> MORPH  <--+
//!      ^                                |       | request with >= 1 shape
//!      |      request with 0 shapes     |-------+ (targets recomputed)
//!      +--------------------------------+
//! ```
//!
//! Entering `AMBIENT` restarts two eased timers: one grows the number of
//! visible particles, the other grows the connection distance.

use std::time::Duration;

use crate::config::AmbientConfig;

/// Which update rule drives the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Ambient,
    Morph,
}

/// Cubic ease-out: fast start, gentle landing. `t` is clamped to `[0, 1]`.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Time since the field last entered ambient mode.
///
/// The clock only moves when advanced, so a paused host or a test harness
/// fully controls growth.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AmbientClock {
    elapsed_ms: f32,
}

impl AmbientClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }

    pub fn advance(&mut self, delta: Duration) {
        self.elapsed_ms += delta.as_secs_f32() * 1000.0;
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Eased progress of a timer lasting `duration_ms`.
    pub fn eased(&self, duration_ms: f32) -> f32 {
        if duration_ms <= 0.0 {
            return 1.0;
        }
        ease_out_cubic(self.elapsed_ms / duration_ms)
    }

    /// Number of pool slots visible right now.
    pub fn active_count(&self, params: &AmbientConfig) -> usize {
        let grown = self.eased(params.particle_growth_ms) * params.visible_count as f32;
        (grown.floor() as usize).min(params.visible_count)
    }

    /// Current connection distance in pixels.
    pub fn connection_distance(&self, params: &AmbientConfig) -> f32 {
        self.eased(params.distance_growth_ms) * params.max_connection_distance
    }
}

/// Current mode plus the clock that belongs to it.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: Mode,
    clock: AmbientClock,
}

impl ModeController {
    /// Starts in [`Mode::Ambient`] with a fresh clock.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn clock(&self) -> &AmbientClock {
        &self.clock
    }

    /// Advance the ambient timers. Ignored while morphing.
    pub fn tick(&mut self, delta: Duration) {
        if self.mode == Mode::Ambient {
            self.clock.advance(delta);
        }
    }

    /// Switch to morph mode. Timers reset so the next ambient entry grows
    /// from zero.
    pub fn enter_morph(&mut self) {
        if self.mode != Mode::Morph {
            log::debug!("mode: ambient -> morph");
        }
        self.mode = Mode::Morph;
        self.clock.reset();
    }

    /// Switch to ambient mode. Returns `false` (and leaves the timers alone)
    /// if already ambient.
    pub fn enter_ambient(&mut self) -> bool {
        if self.mode == Mode::Ambient {
            return false;
        }
        log::debug!("mode: morph -> ambient");
        self.mode = Mode::Ambient;
        self.clock.reset();
        true
    }
}
