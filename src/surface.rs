//! Drawing surfaces.
//!
//! The engine renders through the small [`DrawSurface`] trait: clear, filled
//! circles and thin lines, each with a color and an opacity. [`Canvas`] is a
//! CPU implementation over an [`RgbaImage`], used for headless rendering and
//! tests; the window host uses the GPU renderer.

use std::path::Path;

use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::color::Rgb;

/// Something the engine can draw a frame onto.
pub trait DrawSurface {
    /// Current size in pixels. Read once per frame.
    fn size(&self) -> (u32, u32);

    /// Fill the whole surface with an opaque color.
    fn clear(&mut self, color: Rgb);

    /// Fill a circle centered at `center`.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32);

    /// Stroke a straight line segment.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgb, alpha: f32);
}

/// CPU rasterizer with anti-aliased edges and source-over blending.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Reallocate for a new size. Contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.pixels.dimensions() != (width, height) {
            self.pixels = RgbaImage::new(width, height);
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Write the current frame to an image file (format from the extension).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.pixels.save(path)
    }

    /// Blend `color` at `alpha` over one pixel. Out-of-bounds writes are ignored.
    fn blend(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || alpha <= 0.0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.pixels.width() || y >= self.pixels.height() {
            return;
        }

        let a = alpha.min(1.0);
        let src = color.to_array();
        let dst = self.pixels.get_pixel_mut(x, y);
        for c in 0..3 {
            let mixed = src[c] as f32 * a + dst[c] as f32 * (1.0 - a);
            dst[c] = mixed.round().clamp(0.0, 255.0) as u8;
        }
        let da = dst[3] as f32 / 255.0;
        dst[3] = ((a + da * (1.0 - a)) * 255.0).round() as u8;
    }
}

impl DrawSurface for Canvas {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn clear(&mut self, color: Rgb) {
        let [r, g, b] = color.to_array();
        let fill = Rgba([r, g, b, 255]);
        for pixel in self.pixels.pixels_mut() {
            *pixel = fill;
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        if radius <= 0.0 || alpha <= 0.0 {
            return;
        }

        let min_x = (center.x - radius - 1.0).floor() as i32;
        let max_x = (center.x + radius + 1.0).ceil() as i32;
        let min_y = (center.y - radius - 1.0).floor() as i32;
        let max_y = (center.y + radius + 1.0).ceil() as i32;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                // Distance from the pixel center, one pixel of soft edge
                let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5).distance(center);
                let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(px, py, color, alpha * coverage);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgb, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }

        // Wu-style: step along the major axis, split coverage across the
        // two pixels straddling the minor axis.
        let delta = to - from;
        let steep = delta.y.abs() > delta.x.abs();
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as i32;
        let strength = alpha * width.clamp(0.0, 1.0);

        for i in 0..=steps {
            let p = from + delta * (i as f32 / steps as f32) - Vec2::splat(0.5);
            let (major, minor) = if steep { (p.y, p.x) } else { (p.x, p.y) };
            let major = major.round() as i32;
            let base = minor.floor();
            let frac = minor - base;
            let base = base as i32;

            let (a, b) = if steep {
                ((base, major), (base + 1, major))
            } else {
                ((major, base), (major, base + 1))
            };
            self.blend(a.0, a.1, color, strength * (1.0 - frac));
            self.blend(b.0, b.1, color, strength * frac);
        }
    }
}
