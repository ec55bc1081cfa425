//! The simulation engine.
//!
//! [`Engine`] owns everything a running field needs: the particle pool, the
//! mode controller, the cursor, the random source and the background loader.
//! A host drives it with one [`Engine::frame`] call per display refresh and
//! forwards pointer input with [`Engine::set_pointer`] /
//! [`Engine::clear_pointer`].
//!
//! ```ignore
//! let mut engine = Engine::new(EngineConfig::default(), 1280, 720, rasterizer);
//! engine.request_shapes(vec![SourceConfig::text("HELLO")]);
//!
//! loop {
//!     engine.frame(&mut canvas, Duration::from_millis(16));
//! }
//! ```
//!
//! Morph requests never block the frame loop. Extraction runs in the
//! background; the old state keeps animating until the result arrives, and
//! the switch happens at the start of the next frame. Every request bumps a
//! generation counter, and results for anything but the latest generation
//! are dropped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;

use crate::config::EngineConfig;
use crate::layout;
use crate::loader::{ExtractionBatch, ShapeLoader};
use crate::mode::{Mode, ModeController};
use crate::pool::ParticlePool;
use crate::raster::RasterScanner;
use crate::shape::{Shape, SourceConfig};
use crate::spawn::SpawnContext;
use crate::surface::DrawSurface;
use crate::text::TextRasterizer;

/// Particles fainter than this are not drawn.
const DRAW_ALPHA_MIN: f32 = 0.01;
/// Particles fainter than this take no part in connections.
const CONNECT_ALPHA_MIN: f32 = 0.05;
/// Connection lines fainter than this are not drawn.
const LINE_ALPHA_MIN: f32 = 0.02;
const LINE_WIDTH: f32 = 1.0;

/// A running particle field.
pub struct Engine {
    config: EngineConfig,
    pool: ParticlePool,
    modes: ModeController,
    cursor: Option<Vec2>,
    surface: Vec2,
    ctx: SpawnContext,
    loader: ShapeLoader,
    /// Latest request issued.
    generation: u64,
    /// Generation still waiting on extraction, if any.
    pending: Option<u64>,
}

impl Engine {
    /// Allocate the pool for a `width` x `height` surface and enter ambient mode.
    pub fn new(
        config: EngineConfig,
        width: u32,
        height: u32,
        rasterizer: Arc<dyn TextRasterizer>,
    ) -> Self {
        let mut ctx = match config.seed {
            Some(seed) => SpawnContext::from_seed(seed),
            None => SpawnContext::new(),
        };
        let surface = Vec2::new(width as f32, height as f32);
        let pool = ParticlePool::new(config.pool_size, &mut ctx, surface);
        let loader = ShapeLoader::new(RasterScanner::new(&config.scan), rasterizer);

        log::info!(
            "engine initialized: {} particles on {}x{}",
            pool.len(),
            width,
            height
        );

        let mut engine = Self {
            config,
            pool,
            modes: ModeController::new(),
            cursor: None,
            surface,
            ctx,
            loader,
            generation: 0,
            pending: None,
        };
        // Nothing is visible until the ambient growth timer lets it in
        engine.pool.hide_from(0);
        engine
    }

    /// Stop background work and release the pool.
    pub fn shutdown(self) {
        log::info!("engine shutting down after {} request(s)", self.generation);
        self.loader.shutdown();
    }

    // ========== Input ==========

    /// Cursor position in surface-local pixels.
    pub fn set_pointer(&mut self, position: Vec2) {
        self.cursor = Some(position);
    }

    /// The pointer left the surface; nothing is repelled.
    pub fn clear_pointer(&mut self) {
        self.cursor = None;
    }

    /// Set the surface size used by the next update.
    pub fn resize(&mut self, width: u32, height: u32) {
        let size = Vec2::new(width as f32, height as f32);
        if size != self.surface {
            log::debug!("surface resized to {width}x{height}");
            self.surface = size;
        }
    }

    // ========== Requests ==========

    /// Morph into the given sources, or return to ambient when `sources` is
    /// empty. Never fails: sources that cannot be extracted are dropped and,
    /// if none remain, the field returns to ambient.
    ///
    /// Returns the generation assigned to this request.
    pub fn request_shapes(&mut self, sources: Vec<SourceConfig>) -> u64 {
        self.generation += 1;
        let generation = self.generation;

        if sources.is_empty() {
            log::debug!("request #{generation}: no sources");
            self.pending = None;
            self.apply_ambient_transition();
        } else {
            log::debug!("request #{generation}: extracting {} source(s)", sources.len());
            self.pending = Some(generation);
            self.loader.submit(generation, sources);
        }
        generation
    }

    /// Block until the latest request has been applied, or `timeout` passes.
    /// Returns `true` if nothing is pending anymore.
    pub fn wait_for_shapes(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.loader.recv_timeout(remaining) {
                Some(batch) => self.handle_batch(batch),
                None => break,
            }
        }
        self.pending.is_none()
    }

    /// Whether a request is still being extracted.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn poll_requests(&mut self) {
        while let Some(batch) = self.loader.try_recv() {
            self.handle_batch(batch);
        }
    }

    fn handle_batch(&mut self, batch: ExtractionBatch) {
        if batch.generation != self.generation {
            log::debug!(
                "discarding stale result #{} (latest is #{})",
                batch.generation,
                self.generation
            );
            return;
        }
        self.pending = None;
        self.apply_shapes(batch.shapes);
    }

    fn apply_shapes(&mut self, shapes: Vec<Shape>) {
        if shapes.is_empty() {
            log::debug!("no usable shapes; returning to ambient");
            self.apply_ambient_transition();
            return;
        }

        let mut placements = layout::place(shapes, self.surface, &self.config.layout);
        let assigned = layout::assign_targets(
            &mut self.pool,
            &mut placements,
            &mut self.ctx,
            &self.config.layout,
        );
        log::debug!(
            "morphing {} shape(s) with {} of {} particles",
            placements.len(),
            assigned,
            self.pool.len()
        );
        self.modes.enter_morph();
    }

    /// Leave morph mode: scatter targets and restart the ambient timers.
    /// Does nothing if already ambient.
    fn apply_ambient_transition(&mut self) {
        if self.modes.enter_ambient() {
            self.pool.scatter_targets(&mut self.ctx, self.surface);
        }
    }

    // ========== Frame ==========

    /// Advance one frame and draw it. The surface size is re-read every frame.
    pub fn frame<S: DrawSurface + ?Sized>(&mut self, surface: &mut S, delta: Duration) {
        let (width, height) = surface.size();
        self.resize(width, height);
        self.update(delta);
        self.draw(surface);
    }

    /// Apply finished requests and step the active mode.
    pub fn update(&mut self, delta: Duration) {
        self.poll_requests();
        self.modes.tick(delta);

        match self.modes.mode() {
            Mode::Ambient => {
                let active = self.active_count();
                self.pool.update_ambient(
                    &self.config.ambient,
                    active,
                    self.surface,
                    self.cursor,
                    &mut self.ctx,
                );
            }
            Mode::Morph => self.pool.update_morph(&self.config.morph, self.cursor),
        }
    }

    /// Draw the current state without advancing it.
    pub fn draw<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        surface.clear(self.config.background);

        if self.modes.mode() == Mode::Ambient {
            self.draw_connections(surface);
        }

        for p in self.pool.iter() {
            if p.is_visible() && p.alpha() > DRAW_ALPHA_MIN {
                surface.fill_circle(p.position(), p.radius(), p.color(), p.alpha());
            }
        }
    }

    fn draw_connections<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        let max_dist = self.connection_distance();
        if max_dist < self.config.ambient.min_connection_distance {
            return;
        }
        let color = self.config.ambient.line_color;

        let linked: Vec<(Vec2, f32)> = self
            .pool
            .iter()
            .take(self.active_count())
            .filter(|p| p.is_visible() && p.alpha() > CONNECT_ALPHA_MIN)
            .map(|p| (p.position(), p.alpha()))
            .collect();

        for (i, &(a, alpha_a)) in linked.iter().enumerate() {
            for &(b, alpha_b) in &linked[i + 1..] {
                let d = b - a;
                if d.x.abs() > max_dist || d.y.abs() > max_dist {
                    continue;
                }
                let dist = d.length();
                if dist >= max_dist {
                    continue;
                }
                let alpha = (1.0 - dist / max_dist) * alpha_a.min(alpha_b) * 0.8;
                if alpha > LINE_ALPHA_MIN {
                    surface.stroke_line(a, b, LINE_WIDTH, color, alpha);
                }
            }
        }
    }

    // ========== Read access ==========

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Latest request generation (0 before any request).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn surface_size(&self) -> Vec2 {
        self.surface
    }

    /// Milliseconds since the field last entered ambient mode.
    pub fn ambient_elapsed_ms(&self) -> f32 {
        self.modes.clock().elapsed_ms()
    }

    /// Ambient particles allowed to be visible right now.
    pub fn active_count(&self) -> usize {
        self.modes
            .clock()
            .active_count(&self.config.ambient)
            .min(self.pool.len())
    }

    /// Current ambient connection distance.
    pub fn connection_distance(&self) -> f32 {
        self.modes.clock().connection_distance(&self.config.ambient)
    }
}
