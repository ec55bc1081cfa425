//! # morphfield
//!
//! An ambient particle field that morphs into text and images.
//!
//! A fixed pool of small particles drifts across a 2D surface, breathing,
//! fading at the edges, linking to near neighbors with faint lines and
//! scattering away from the pointer. On request the field morphs: text and
//! images are rasterized, sampled into colored points, laid out around the
//! surface center, and every point pulls one particle onto it with a damped
//! spring. An empty request sends the field back to ambient drift.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use morphfield::prelude::*;
//!
//! let fonts = FontRasterizer::new().with_default(load_font("Inter-Bold.ttf".as_ref())?);
//! let mut engine = Engine::new(EngineConfig::default(), 1280, 720, Arc::new(fonts));
//! let mut canvas = Canvas::new(1280, 720);
//!
//! engine.request_shapes(vec![
//!     SourceConfig::image("qr.png", 0.5),
//!     SourceConfig::text("SCAN ME").with_font_size(72.0),
//! ]);
//!
//! for _ in 0..120 {
//!     engine.frame(&mut canvas, Duration::from_millis(16));
//! }
//! canvas.save("frame.png")?;
//! ```
//!
//! ## Core Concepts
//!
//! ### Modes
//!
//! The engine is always in one of two [`Mode`]s:
//!
//! - **Ambient**: particles drift. Over the first seconds after entering the
//!   mode, the number of visible particles and the connection distance grow
//!   along a cubic ease-out.
//! - **Morph**: particles spring toward their assigned targets and lock on
//!   once close enough.
//!
//! ### Sources and shapes
//!
//! A [`SourceConfig`] names a text string or an image file. The
//! [`RasterScanner`] draws it into a pixel buffer and samples that buffer on
//! a fixed stride; the samples form a [`Shape`]. Text is drawn by a
//! [`TextRasterizer`], so the font backend can be swapped.
//!
//! ### Layout
//!
//! At most three shapes are shown: the first image left of a central safe
//! zone, the second image right of it, and the first text centered below.
//!
//! ### Requests
//!
//! [`Engine::request_shapes`] never blocks and never fails. Extraction runs
//! on a worker thread; the field keeps animating until the result is ready.
//! Only the result of the latest request is applied.
//!
//! ## Rendering
//!
//! The engine draws through the [`DrawSurface`] trait. [`Canvas`] renders on
//! the CPU into an image; [`gpu::GpuRenderer`] renders into a window with
//! wgpu. [`window::run`] opens an interactive window with presets bound to
//! the digit keys.

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod layout;
pub mod loader;
pub mod mode;
pub mod particle;
pub mod pool;
pub mod raster;
pub mod shape;
pub mod spawn;
pub mod surface;
pub mod text;
pub mod time;
pub mod window;

pub use glam::Vec2;

pub use color::Rgb;
pub use config::{AppConfig, EngineConfig};
pub use engine::Engine;
pub use mode::Mode;
pub use raster::RasterScanner;
pub use shape::{Shape, ShapeKind, SourceConfig};
pub use surface::{Canvas, DrawSurface};
pub use text::TextRasterizer;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use morphfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Rgb;
    pub use crate::config::{AppConfig, EngineConfig, Preset};
    pub use crate::engine::Engine;
    pub use crate::mode::Mode;
    pub use crate::shape::{Shape, ShapeKind, SourceConfig, SourceOptions};
    pub use crate::surface::{Canvas, DrawSurface};
    pub use crate::text::{load_font, FontRasterizer, TextRasterizer, TextStyle};
    pub use crate::Vec2;
}
