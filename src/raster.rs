//! Raster scanner: pixel buffers to sample points.
//!
//! Sources are drawn into an offscreen RGBA buffer (text through a
//! [`TextRasterizer`], images by decoding and scaling), then sampled on a
//! fixed grid. A pixel becomes a point when it is not fully transparent and
//! at least one color channel clears the brightness floor, so dark
//! anti-aliased fringes are treated as background.
//!
//! Scanning is deterministic: the same buffer and stride always produce the
//! same points in the same (row-major) order.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::color::Rgb;
use crate::config::ScanConfig;
use crate::error::ExtractionError;
use crate::shape::{SamplePoint, ShapeKind, SourceConfig};
use crate::text::{TextRasterizer, TextStyle};

/// Points sampled from one buffer, plus the buffer size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub points: Vec<SamplePoint>,
    pub width: u32,
    pub height: u32,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Samples pixel buffers on a fixed stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterScanner {
    stride: u32,
    brightness_floor: u8,
}

impl RasterScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            stride: config.stride.max(1),
            brightness_floor: config.brightness_floor,
        }
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Sample `buffer` row by row.
    pub fn scan(&self, buffer: &RgbaImage) -> Extraction {
        let (width, height) = buffer.dimensions();
        let step = self.stride as usize;
        let floor = self.brightness_floor;

        let mut points = Vec::new();
        for y in (0..height).step_by(step) {
            for x in (0..width).step_by(step) {
                let [r, g, b, a] = buffer.get_pixel(x, y).0;
                if a > 0 && (r > floor || g > floor || b > floor) {
                    points.push(SamplePoint {
                        x,
                        y,
                        color: Rgb::new(r, g, b),
                    });
                }
            }
        }

        Extraction {
            points,
            width,
            height,
        }
    }

    /// Scale a decoded image and scan it.
    pub fn scan_image(
        &self,
        image: &DynamicImage,
        scale: f32,
        name: &str,
    ) -> Result<Extraction, ExtractionError> {
        let rgba = image.to_rgba8();
        let (w, h) = rgba.dimensions();
        let scaled_w = (w as f32 * scale) as u32;
        let scaled_h = (h as f32 * scale) as u32;
        if scaled_w == 0 || scaled_h == 0 {
            return Err(ExtractionError::ZeroSize(name.to_string()));
        }

        if (scaled_w, scaled_h) == (w, h) {
            Ok(self.scan(&rgba))
        } else {
            let resized = image::imageops::resize(&rgba, scaled_w, scaled_h, FilterType::Triangle);
            Ok(self.scan(&resized))
        }
    }

    /// Decode an image file, scale it and scan it.
    pub fn scan_image_file(&self, path: &Path, scale: f32) -> Result<Extraction, ExtractionError> {
        let name = path.display().to_string();
        let image = image::open(path).map_err(|source| ExtractionError::Image {
            path: name.clone(),
            source,
        })?;
        self.scan_image(&image, scale, &name)
    }

    /// Draw a string and scan it.
    pub fn scan_text(
        &self,
        text: &str,
        style: &TextStyle,
        rasterizer: &dyn TextRasterizer,
    ) -> Result<Extraction, ExtractionError> {
        let buffer = rasterizer.rasterize(text, style)?;
        Ok(self.scan(&buffer))
    }

    /// Extract points for one source. Failures are logged and yield an empty
    /// extraction.
    pub fn extract(&self, source: &SourceConfig, rasterizer: &dyn TextRasterizer) -> Extraction {
        let options = &source.options;
        let result = match options.kind {
            ShapeKind::Image => self.scan_image_file(Path::new(&source.source), options.scale),
            ShapeKind::Text => {
                let style = TextStyle {
                    font_size: options.font_size,
                    font_family: options.font_family.clone(),
                    color: options.color,
                };
                self.scan_text(&source.source, &style, rasterizer)
            }
        };

        match result {
            Ok(extraction) => {
                log::debug!(
                    "extracted {} points from {:?} source '{}' ({}x{})",
                    extraction.points.len(),
                    options.kind,
                    source.source,
                    extraction.width,
                    extraction.height
                );
                extraction
            }
            Err(e) => {
                log::warn!("extraction failed, dropping source: {e}");
                Extraction::default()
            }
        }
    }
}

impl Default for RasterScanner {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn scanner(stride: u32) -> RasterScanner {
        RasterScanner::new(&ScanConfig {
            stride,
            brightness_floor: 20,
        })
    }

    #[test]
    fn test_stride_sampling() {
        let buffer = RgbaImage::from_pixel(6, 4, Rgba([200, 0, 0, 255]));
        let points = scanner(2).scan(&buffer).points;
        // x in {0,2,4}, y in {0,2}
        assert_eq!(points.len(), 6);
        assert_eq!((points[0].x, points[0].y), (0, 0));
        assert_eq!((points[1].x, points[1].y), (2, 0));
        assert_eq!((points[3].x, points[3].y), (0, 2));
        assert!(points.iter().all(|p| p.color == Rgb::new(200, 0, 0)));
    }

    #[test]
    fn test_transparent_and_dark_pixels_skipped() {
        let mut buffer = RgbaImage::new(3, 1);
        buffer.put_pixel(0, 0, Rgba([255, 255, 255, 0])); // transparent
        buffer.put_pixel(1, 0, Rgba([20, 20, 20, 255])); // at the floor
        buffer.put_pixel(2, 0, Rgba([0, 21, 0, 1])); // one channel above, barely opaque
        let points = scanner(1).scan(&buffer).points;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].x, 2);
        assert_eq!(points[0].color, Rgb::new(0, 21, 0));
    }

    #[test]
    fn test_zero_stride_treated_as_one() {
        let buffer = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
        assert_eq!(scanner(0).stride(), 1);
        assert_eq!(scanner(0).scan(&buffer).points.len(), 9);
    }

    #[test]
    fn test_scan_reports_dimensions() {
        let buffer = RgbaImage::new(17, 9);
        let extraction = scanner(2).scan(&buffer);
        assert!(extraction.is_empty());
        assert_eq!((extraction.width, extraction.height), (17, 9));
    }

    #[test]
    fn test_image_scaled_before_scan() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            40,
            20,
            Rgba([255, 255, 255, 255]),
        ));
        let extraction = scanner(2).scan_image(&image, 0.5, "test").unwrap();
        assert_eq!((extraction.width, extraction.height), (20, 10));
        assert_eq!(extraction.points.len(), 10 * 5);
    }

    #[test]
    fn test_image_scaled_to_nothing_fails() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        let err = scanner(2).scan_image(&image, 0.1, "tiny").unwrap_err();
        assert!(matches!(err, ExtractionError::ZeroSize(_)));
    }

    #[test]
    fn test_missing_image_extracts_nothing() {
        let source = SourceConfig::image("/nonexistent/morphfield/qr.png", 1.0);
        let extraction = scanner(2).extract(&source, &crate::text::FontRasterizer::new());
        assert!(extraction.is_empty());
    }
}
