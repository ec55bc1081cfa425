//! Morph sources and the shapes extracted from them.

use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use crate::color::Rgb;

/// Whether a source is rendered text or a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Image,
    #[default]
    Text,
}

/// Per-source rendering options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceOptions {
    pub kind: ShapeKind,
    /// Image scale factor.
    pub scale: f32,
    /// Fill color used when drawing text into the offscreen buffer.
    pub color: Rgb,
    /// Text size in pixels; also the text buffer height.
    pub font_size: f32,
    pub font_family: String,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Text,
            scale: 1.0,
            color: Rgb::WHITE,
            font_size: 120.0,
            font_family: "Arial".to_string(),
        }
    }
}

/// One morph source: a text string or an image path, plus options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    pub source: String,
    #[serde(default)]
    pub options: SourceOptions,
}

impl SourceConfig {
    /// A text source with default options.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            source: text.into(),
            options: SourceOptions::default(),
        }
    }

    /// An image source at the given scale.
    pub fn image(path: impl Into<String>, scale: f32) -> Self {
        Self {
            source: path.into(),
            options: SourceOptions {
                kind: ShapeKind::Image,
                scale,
                ..SourceOptions::default()
            },
        }
    }

    /// Set the text size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.options.font_size = size;
        self
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.options.font_family = family.into();
        self
    }

    /// Set the text fill color.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.options.color = color;
        self
    }

    pub(crate) fn resolve_image_path(&mut self, base: &Path) {
        if self.options.kind == ShapeKind::Image && Path::new(&self.source).is_relative() {
            self.source = base.join(&self.source).to_string_lossy().into_owned();
        }
    }
}

/// A sampled foreground pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePoint {
    pub x: u32,
    pub y: u32,
    pub color: Rgb,
}

impl SamplePoint {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Axis-aligned bounds of a point set, in buffer pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// Bounds of a point set, or `None` when it is empty.
    pub fn of(points: &[SamplePoint]) -> Option<Self> {
        let first = points.first()?.position();
        let init = BoundingBox {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(points.iter().fold(init, |b, p| {
            let pos = p.position();
            BoundingBox {
                min_x: b.min_x.min(pos.x),
                max_x: b.max_x.max(pos.x),
                min_y: b.min_y.min(pos.y),
                max_y: b.max_y.max(pos.y),
            }
        }))
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.min_x, self.min_y)
    }
}

/// Points extracted from one source, ready for layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub points: Vec<SamplePoint>,
    pub bounds: BoundingBox,
    pub kind: ShapeKind,
}

impl Shape {
    /// Wrap scanner output. Returns `None` for an empty point set, which
    /// marks the source as invalid.
    pub fn from_points(points: Vec<SamplePoint>, kind: ShapeKind) -> Option<Self> {
        let bounds = BoundingBox::of(&points)?;
        Some(Self {
            points,
            bounds,
            kind,
        })
    }

    pub fn width(&self) -> f32 {
        self.bounds.width()
    }

    pub fn height(&self) -> f32 {
        self.bounds.height()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
