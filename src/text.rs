//! Text rendering into offscreen pixel buffers.
//!
//! The scanner does not care how text becomes pixels; it asks a
//! [`TextRasterizer`] for a buffer sized exactly to the string. The
//! [`FontRasterizer`] implementation draws with TrueType fonts loaded from disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};

use crate::color::Rgb;
use crate::config::FontConfig;
use crate::error::{ConfigError, ExtractionError};

/// How a string should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Pixel size; also the height of the produced buffer.
    pub font_size: f32,
    pub font_family: String,
    pub color: Rgb,
}

/// Renders a string into a transparent buffer whose width is the measured
/// advance of the string and whose height is the font size, with the string
/// centered in it.
pub trait TextRasterizer: Send + Sync {
    fn rasterize(&self, text: &str, style: &TextStyle) -> Result<RgbaImage, ExtractionError>;
}

/// Usual install locations of a bold sans-serif font, tried in order.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// First system font from the known install locations that exists on disk.
pub fn find_system_font() -> Option<PathBuf> {
    SYSTEM_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

/// TrueType text rasterizer with per-family font lookup.
#[derive(Default)]
pub struct FontRasterizer {
    families: HashMap<String, Font<'static>>,
    fallback: Option<Font<'static>>,
}

impl FontRasterizer {
    /// A rasterizer with no fonts. Every text source fails until fonts are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every font named in the configuration.
    pub fn from_config(config: &FontConfig) -> Result<Self, ConfigError> {
        let mut rasterizer = Self::new();
        if let Some(path) = &config.default {
            rasterizer.fallback = Some(load_font(path)?);
        }
        for (family, path) in &config.families {
            rasterizer.families.insert(family.clone(), load_font(path)?);
        }
        log::info!(
            "loaded {} font famil{}{}",
            rasterizer.families.len(),
            if rasterizer.families.len() == 1 { "y" } else { "ies" },
            if rasterizer.fallback.is_some() { " plus default" } else { "" }
        );
        Ok(rasterizer)
    }

    /// Register a font for a family name.
    pub fn with_family(mut self, family: impl Into<String>, font: Font<'static>) -> Self {
        self.families.insert(family.into(), font);
        self
    }

    /// Set the font used for unknown families.
    pub fn with_default(mut self, font: Font<'static>) -> Self {
        self.fallback = Some(font);
        self
    }

    /// Use an installed system font as the default when none is configured.
    pub fn with_system_fallback(mut self) -> Self {
        if self.fallback.is_some() {
            return self;
        }
        let Some(path) = find_system_font() else {
            log::debug!("no system font found in {} known locations", SYSTEM_FONTS.len());
            return self;
        };
        match load_font(&path) {
            Ok(font) => {
                log::info!("using system font '{}' as default", path.display());
                self.fallback = Some(font);
            }
            Err(e) => log::warn!("skipping system font: {e}"),
        }
        self
    }

    /// Whether any font is available at all.
    pub fn has_fonts(&self) -> bool {
        self.fallback.is_some() || !self.families.is_empty()
    }

    fn font_for(&self, family: &str) -> Option<&Font<'static>> {
        self.families.get(family).or(self.fallback.as_ref())
    }
}

impl TextRasterizer for FontRasterizer {
    fn rasterize(&self, text: &str, style: &TextStyle) -> Result<RgbaImage, ExtractionError> {
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyText);
        }
        let font = self
            .font_for(&style.font_family)
            .ok_or_else(|| ExtractionError::NoFont(style.font_family.clone()))?;

        let scale = Scale::uniform(style.font_size);
        let advance = font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map_or(0.0, |g| g.position().x + g.unpositioned().h_metrics().advance_width);

        let width = advance.ceil().max(0.0) as u32;
        let height = style.font_size.ceil().max(0.0) as u32;
        if width == 0 || height == 0 {
            return Err(ExtractionError::ZeroSize(text.to_string()));
        }

        // Middle baseline: center the ascent/descent box vertically
        let v_metrics = font.v_metrics(scale);
        let baseline = height as f32 / 2.0 + (v_metrics.ascent + v_metrics.descent) / 2.0;
        let start_x = (width as f32 - advance) / 2.0;

        let mut buffer = RgbaImage::new(width, height);
        let [r, g, b] = style.color.to_array();

        for glyph in font.layout(text, scale, point(start_x, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                let pixel = buffer.get_pixel_mut(px as u32, py as u32);
                if alpha > pixel[3] {
                    *pixel = Rgba([r, g, b, alpha]);
                }
            });
        }

        Ok(buffer)
    }
}

/// Read and parse a font file.
pub fn load_font(path: &Path) -> Result<Font<'static>, ConfigError> {
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Font::try_from_vec(bytes).ok_or_else(|| ConfigError::Font {
        path: path.to_path_buf(),
        reason: "not a TrueType/OpenType font".to_string(),
    })
}
