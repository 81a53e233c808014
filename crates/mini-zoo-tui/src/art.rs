//! Procedural stand-in for the animal picture
//!
//! A terminal cannot show the resolved image, so each image reference is
//! hashed into a small set of parameters and the picture is painted from
//! those. The same reference always yields the same picture, and every region
//! of it looks different enough for the pieces to be told apart.

use crate::animations::particles::hue_to_rgb;
use crossterm::style::Color;

/// FNV-1a, stable across runs and platforms
fn fnv1a(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in text.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

#[derive(Debug, Clone, PartialEq)]
pub struct Art {
    base_hue: f32,
    accent_hue: f32,
    rings: f32,
    tilt: f32,
    initial: char,
    canvas_size: f32,
}

impl Art {
    pub fn new(image_uri: &str, animal: &str, canvas_size: f32) -> Self {
        let hash = fnv1a(image_uri);
        let unit = |shift: u32| ((hash >> shift) & 0xffff) as f32 / 65535.0;
        Self {
            base_hue: unit(0),
            accent_hue: (unit(0) + 0.35 + unit(16) * 0.3) % 1.0,
            rings: 2.0 + unit(32) * 4.0,
            tilt: unit(48) * std::f32::consts::PI,
            initial: animal.chars().next().unwrap_or('?').to_ascii_uppercase(),
            canvas_size,
        }
    }

    /// Color of the picture at a canvas point
    pub fn color_at(&self, x: f32, y: f32) -> Color {
        let size = self.canvas_size.max(1.0);
        let u = (x / size).clamp(0.0, 1.0);
        let v = (y / size).clamp(0.0, 1.0);
        let dx = u - 0.5;
        let dy = v - 0.5;
        let dist = (dx * dx + dy * dy).sqrt();

        // Body: a disc of the accent hue with rings
        if dist < 0.32 {
            let ring = ((dist * self.rings * 10.0).sin() * 0.5 + 0.5) * 0.25;
            return shade(hue_to_rgb(self.accent_hue), 0.65 + ring);
        }

        // Background: diagonal bands of the base hue
        let band = (u * self.tilt.cos() + v * self.tilt.sin()) * 3.0;
        let hue = (self.base_hue + band * 0.08) % 1.0;
        shade(hue_to_rgb(hue), 0.35 + 0.3 * (1.0 - v))
    }

    /// Letter drawn in the middle of the picture
    pub fn initial(&self) -> char {
        self.initial
    }
}

/// Scale an RGB color's brightness
pub fn shade(color: Color, factor: f32) -> Color {
    match color {
        Color::Rgb { r, g, b } => {
            let f = factor.clamp(0.0, 1.0);
            Color::Rgb {
                r: (r as f32 * f) as u8,
                g: (g as f32 * f) as u8,
                b: (b as f32 * f) as u8,
            }
        }
        other => other,
    }
}
