//! Block color bands
//!
//! Remaining layers map onto five gradient bands of ten layers each, so a
//! block visibly fades toward its band's light end as it loses health.

use serde::{Deserialize, Serialize};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend toward `other`; `ratio` is clamped to [0, 1]
    pub fn lerp(self, other: Color, ratio: f32) -> Color {
        let t = ratio.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Layers per band
const BAND_WIDTH: i32 = 10;

/// (light, dark) endpoints per band: red, green, blue, amber, violet
const BANDS: [(Color, Color); 5] = [
    (Color::rgb(0xFF, 0xB3, 0xBA), Color::rgb(0x99, 0x00, 0x00)),
    (Color::rgb(0xBA, 0xFF, 0xB3), Color::rgb(0x00, 0x99, 0x00)),
    (Color::rgb(0xB3, 0xD9, 0xFF), Color::rgb(0x00, 0x66, 0xCC)),
    (Color::rgb(0xFF, 0xFF, 0xB3), Color::rgb(0xFF, 0x8C, 0x00)),
    (Color::rgb(0xE6, 0xB3, 0xFF), Color::rgb(0x66, 0x00, 0xCC)),
];

/// Display color for a block with `layers` remaining
pub fn color_of(layers: i32) -> Color {
    let layers = layers.max(1);
    let band = (((layers - 1) / BAND_WIDTH) as usize).min(BANDS.len() - 1);
    let band_start = band as i32 * BAND_WIDTH + 1;
    let ratio = (layers - band_start) as f32 / (BAND_WIDTH - 1) as f32;
    let (light, dark) = BANDS[band];
    light.lerp(dark, ratio)
}
