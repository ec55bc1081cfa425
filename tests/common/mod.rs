//! Shared fixtures for integration tests.
//!
//! Real fonts are not available in CI, so text goes through [`BlockText`]:
//! every non-space character becomes a solid block in the fill color.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use morphfield::error::ExtractionError;
use morphfield::prelude::*;

/// Rasterizes each character as a filled block with a one-pixel gutter.
pub struct BlockText;

impl BlockText {
    pub fn cell_width(style: &TextStyle) -> u32 {
        (style.font_size * 0.6).ceil() as u32
    }
}

impl TextRasterizer for BlockText {
    fn rasterize(&self, text: &str, style: &TextStyle) -> Result<RgbaImage, ExtractionError> {
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyText);
        }
        let cell = Self::cell_width(style);
        let width = cell * text.chars().count() as u32;
        let height = style.font_size.ceil() as u32;
        if width == 0 || height == 0 {
            return Err(ExtractionError::ZeroSize(text.to_string()));
        }

        let [r, g, b] = style.color.to_array();
        let mut buffer = RgbaImage::new(width, height);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = i as u32 * cell;
            for y in 1..height - 1 {
                for x in left + 1..left + cell - 1 {
                    buffer.put_pixel(x, y, Rgba([r, g, b, 255]));
                }
            }
        }
        Ok(buffer)
    }
}

/// [`BlockText`] that stalls on strings starting with `SLOW`.
pub struct SlowText {
    pub delay: Duration,
}

impl TextRasterizer for SlowText {
    fn rasterize(&self, text: &str, style: &TextStyle) -> Result<RgbaImage, ExtractionError> {
        if text.starts_with("SLOW") {
            thread::sleep(self.delay);
        }
        BlockText.rasterize(text, style)
    }
}

/// Panics on every string, like a rasterizer with a broken glyph cache.
pub struct PanicText;

impl TextRasterizer for PanicText {
    fn rasterize(&self, text: &str, _style: &TextStyle) -> Result<RgbaImage, ExtractionError> {
        panic!("cannot shape '{text}'");
    }
}

/// Path of the bundled DejaVu Sans Bold test font.
pub fn fixture_font() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSans-Bold.ttf")
}

/// Write a solid `width` x `height` PNG into `dir`.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, color: Rgb) -> PathBuf {
    let [r, g, b] = color.to_array();
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]))
        .save(&path)
        .unwrap();
    path
}

/// Seeded engine config with a small pool.
pub fn config(pool: usize) -> EngineConfig {
    EngineConfig::new().with_pool_size(pool).with_seed(7)
}
