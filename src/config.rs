//! Engine tunables and the application configuration file.
//!
//! [`EngineConfig`] carries every constant the simulation, scanner and
//! layout use. Defaults reproduce the reference look; override them with the
//! `with_*` builder methods or from the `[engine]` table of a TOML file.
//!
//! # Example file
//!
//! ```toml
//! [window]
//! title = "morphfield"
//! width = 1440
//! height = 900
//!
//! [engine]
//! pool_size = 4000
//! seed = 7
//!
//! [engine.ambient]
//! visible_count = 250
//!
//! [fonts]
//! default = "assets/fonts/Inter-Bold.ttf"
//!
//! [fonts.families]
//! Arial = "/usr/share/fonts/truetype/msttcorefonts/Arial_Bold.ttf"
//!
//! [[presets]]
//! name = "contact"
//! key = 1
//!
//! [[presets.sources]]
//! source = "assets/qr_wechat.png"
//! options = { kind = "image", scale = 0.5 }
//!
//! [[presets.sources]]
//! source = "SCAN TO CONNECT"
//! options = { kind = "text", font_size = 72 }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::color::{Rgb, ACCENT};
use crate::error::ConfigError;
use crate::shape::SourceConfig;

/// Ambient-mode tunables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    /// Number of pool slots that become ambient-visible once growth completes.
    pub visible_count: usize,
    /// Duration of the visible-count growth, in milliseconds.
    pub particle_growth_ms: f32,
    /// Duration of the connection-distance growth, in milliseconds.
    pub distance_growth_ms: f32,
    /// Connection distance reached once growth completes, in pixels.
    pub max_connection_distance: f32,
    /// Connections are not drawn while the grown distance is below this.
    pub min_connection_distance: f32,
    pub line_color: Rgb,
    /// Margin outside the surface across which particles fade out before respawning.
    pub screen_padding: f32,
    pub cursor_radius: f32,
    pub cursor_force: f32,
    /// Fraction of the gap to the base velocity closed per frame.
    pub return_speed: f32,
    pub fade_in_step: f32,
    /// Fraction of the gap to the base color closed per frame.
    pub color_relax: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            visible_count: 300,
            particle_growth_ms: 8000.0,
            distance_growth_ms: 10000.0,
            max_connection_distance: 200.0,
            min_connection_distance: 5.0,
            line_color: ACCENT,
            screen_padding: 150.0,
            cursor_radius: 60.0,
            cursor_force: 2.0,
            return_speed: 0.04,
            fade_in_step: 0.015,
            color_relax: 0.05,
        }
    }
}

/// Morph-mode tunables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MorphConfig {
    /// Velocity multiplier applied after forces accumulate.
    pub drag: f32,
    /// Spring stiffness toward the target; also the color ease fraction.
    pub ease: f32,
    /// Squared cursor distance inside which particles are pushed away.
    pub cursor_repulsion_sq: f32,
    pub cursor_repulsion_force: f32,
    /// Squared distance below which a particle locks onto its target.
    pub snap_epsilon_sq: f32,
    pub fade_in_step: f32,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            drag: 0.92,
            ease: 0.15,
            cursor_repulsion_sq: 8000.0,
            cursor_repulsion_force: 5.0,
            snap_epsilon_sq: 0.25,
            fade_in_step: 0.05,
        }
    }
}

/// Placement rules for the three layout slots.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal clearance kept free around the surface center.
    pub safe_zone: f32,
    /// Vertical bias applied to image slots (negative is up).
    pub image_vertical_offset: f32,
    /// Distance below center of the text slot's top edge.
    pub text_bottom_offset: f32,
    /// Target color for particles assigned to text shapes.
    pub text_color: Rgb,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            safe_zone: 450.0,
            image_vertical_offset: -50.0,
            text_bottom_offset: 220.0,
            text_color: ACCENT,
        }
    }
}

/// Raster scanning parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Sampling step in pixels on both axes. Values below 1 are treated as 1.
    pub stride: u32,
    /// A pixel needs at least one channel above this to count as foreground.
    pub brightness_floor: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            stride: 2,
            brightness_floor: 20,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed number of particles; never changes during the engine lifetime.
    pub pool_size: usize,
    /// Seed for all random decisions. `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Surface clear color.
    pub background: Rgb,
    pub ambient: AmbientConfig,
    pub morph: MorphConfig,
    pub layout: LayoutConfig,
    pub scan: ScanConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_size: 6000,
            seed: None,
            background: Rgb::new(0xf5, 0xf6, 0xf8),
            ambient: AmbientConfig::default(),
            morph: MorphConfig::default(),
            layout: LayoutConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of particles in the pool.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Use a fixed random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set how many particles the ambient field grows to.
    pub fn with_ambient_count(mut self, count: usize) -> Self {
        self.ambient.visible_count = count;
        self
    }

    /// Set both ambient growth durations, in milliseconds.
    pub fn with_growth_times(mut self, particle_ms: f32, distance_ms: f32) -> Self {
        self.ambient.particle_growth_ms = particle_ms;
        self.ambient.distance_growth_ms = distance_ms;
        self
    }

    /// Set the horizontal safe zone kept clear at the surface center.
    pub fn with_safe_zone(mut self, width: f32) -> Self {
        self.layout.safe_zone = width;
        self
    }

    /// Set the raster sampling stride.
    pub fn with_scan_stride(mut self, stride: u32) -> Self {
        self.scan.stride = stride;
        self
    }

    /// Set the surface clear color.
    pub fn with_background(mut self, color: Rgb) -> Self {
        self.background = color;
        self
    }
}

/// Window settings for the interactive host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "morphfield".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Font files available to the text rasterizer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Used when a source names a family that is not listed.
    pub default: Option<PathBuf>,
    /// Family name to TrueType/OpenType file.
    pub families: HashMap<String, PathBuf>,
}

/// A named set of sources the host can morph into.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Preset {
    pub name: String,
    /// Digit key (1-9) that triggers the preset in the window host.
    #[serde(default)]
    pub key: Option<u8>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// Top-level application configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub engine: EngineConfig,
    pub fonts: FontConfig,
    pub presets: Vec<Preset>,
}

impl AppConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.resolve_paths(path.parent().unwrap_or_else(|| Path::new(".")));
        log::debug!(
            "loaded config '{}' ({} presets)",
            path.display(),
            config.presets.len()
        );
        Ok(config)
    }

    /// Find a preset by name.
    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Find the preset bound to a digit key.
    pub fn preset_for_key(&self, digit: u8) -> Option<&Preset> {
        self.presets.iter().find(|p| p.key == Some(digit))
    }

    /// Make relative font and image paths relative to the config file's directory.
    fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(default) = self.fonts.default.as_mut() {
            join(default);
        }
        for path in self.fonts.families.values_mut() {
            join(path);
        }
        for preset in &mut self.presets {
            for source in &mut preset.sources {
                source.resolve_image_path(base);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeKind;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.pool_size, 6000);
        assert_eq!(config.ambient.visible_count, 300);
        assert_eq!(config.ambient.max_connection_distance, 200.0);
        assert_eq!(config.morph.snap_epsilon_sq, 0.25);
        assert_eq!(config.layout.safe_zone, 450.0);
        assert_eq!(config.scan.stride, 2);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_pool_size(100)
            .with_seed(5)
            .with_ambient_count(10)
            .with_growth_times(1000.0, 2500.0)
            .with_safe_zone(300.0)
            .with_scan_stride(3)
            .with_background(Rgb::BLACK);
        assert_eq!(config.pool_size, 100);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.ambient.visible_count, 10);
        assert_eq!(config.ambient.particle_growth_ms, 1000.0);
        assert_eq!(config.ambient.distance_growth_ms, 2500.0);
        assert_eq!(config.layout.safe_zone, 300.0);
        assert_eq!(config.scan.stride, 3);
        assert_eq!(config.background, Rgb::BLACK);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r##"
            [engine]
            pool_size = 1200
            background = "#000"

            [engine.morph]
            drag = 0.8
            "##,
        )
        .unwrap();
        assert_eq!(config.engine.pool_size, 1200);
        assert_eq!(config.engine.background, Rgb::BLACK);
        assert_eq!(config.engine.morph.drag, 0.8);
        assert_eq!(config.engine.morph.ease, 0.15);
        assert_eq!(config.engine.ambient, AmbientConfig::default());
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_presets_parse() {
        let config = AppConfig::from_toml_str(
            r#"
            [[presets]]
            name = "hello"
            key = 2

            [[presets.sources]]
            source = "HELLO"

            [[presets.sources]]
            source = "qr.png"
            options = { kind = "image", scale = 0.5 }
            "#,
        )
        .unwrap();
        let preset = config.preset("hello").unwrap();
        assert_eq!(preset.sources.len(), 2);
        assert_eq!(preset.sources[0].options.kind, ShapeKind::Text);
        assert_eq!(preset.sources[1].options.kind, ShapeKind::Image);
        assert_eq!(preset.sources[1].options.scale, 0.5);
        assert!(config.preset_for_key(2).is_some());
        assert!(config.preset_for_key(3).is_none());
    }

    #[test]
    fn test_bad_color_is_parse_error() {
        let err = AppConfig::from_toml_str("[engine]\nbackground = \"#nothex\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_relative_paths_resolved_against_config_dir() {
        let mut config = AppConfig::from_toml_str(
            r#"
            [fonts]
            default = "fonts/a.ttf"

            [[presets]]
            name = "p"

            [[presets.sources]]
            source = "img/qr.png"
            options = { kind = "image" }

            [[presets.sources]]
            source = "TEXT"
            "#,
        )
        .unwrap();
        config.resolve_paths(Path::new("/etc/morphfield"));
        assert_eq!(
            config.fonts.default.as_deref(),
            Some(Path::new("/etc/morphfield/fonts/a.ttf"))
        );
        let sources = &config.presets[0].sources;
        assert_eq!(sources[0].source, "/etc/morphfield/img/qr.png");
        assert_eq!(sources[1].source, "TEXT");
    }
}
