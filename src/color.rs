//! RGB colors and per-channel blending.
//!
//! Colors travel through the whole pipeline as [`Rgb`]: sampled from pixel
//! buffers by the scanner, assigned as particle targets by the layout pass,
//! eased every frame by the physics, and finally handed to a [`DrawSurface`].
//!
//! [`DrawSurface`]: crate::surface::DrawSurface

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Accent blue used for text shapes, accent-tier particles and connection lines.
pub const ACCENT: Rgb = Rgb::new(0x61, 0xb1, 0xd6);
/// Darker of the two ambient particle colors.
pub const DARK_1: Rgb = Rgb::new(0x33, 0x33, 0x33);
/// Lighter of the two ambient particle colors.
pub const DARK_2: Rgb = Rgb::new(0x55, 0x55, 0x55);

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create a color from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn r(self) -> u8 {
        self.r
    }

    #[inline]
    pub const fn g(self) -> u8 {
        self.g
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.b
    }

    /// Channels as an array, red first.
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Channels normalized to `0.0..=1.0`.
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Channels converted from sRGB to linear light, for sRGB render targets.
    pub fn to_linear_f32(self) -> [f32; 3] {
        self.to_f32().map(|c| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        })
    }

    /// Move each channel `t` of the way toward `target`, rounding to the
    /// nearest integer.
    ///
    /// A channel that still differs from the target after rounding but did
    /// not move is stepped by one unit, so repeated calls always reach the
    /// target exactly.
    pub fn approach(self, target: Rgb, t: f32) -> Rgb {
        Rgb::new(
            approach_channel(self.r, target.r, t),
            approach_channel(self.g, target.g, t),
            approach_channel(self.b, target.b, t),
        )
    }
}

fn approach_channel(from: u8, to: u8, t: f32) -> u8 {
    if from == to {
        return from;
    }
    let next = (from as f32 + (to as f32 - from as f32) * t).round() as i32;
    let next = if next == from as i32 {
        if to > from {
            from as i32 + 1
        } else {
            from as i32 - 1
        }
    } else {
        next
    };
    next.clamp(0, 255) as u8
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Rgb::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}': expected #rgb or #rrggbb")]
pub struct ParseColorError(pub String);

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(err());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());

        match hex.len() {
            6 => Ok(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |digit: &str| channel(digit).map(|v| v * 17);
                Ok(Rgb::new(
                    expand(&hex[0..1])?,
                    expand(&hex[1..2])?,
                    expand(&hex[2..3])?,
                ))
            }
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
