use crossterm::style::Color;
use rand::Rng;

/// A single particle in the celebration
#[derive(Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub char: char,
    pub color: Color,
    pub lifetime: f32,
}

impl Particle {
    pub fn is_visible(&self, width: u16, height: u16) -> bool {
        self.x >= 0.0
            && self.x < width as f32
            && self.y >= 0.0
            && self.y < height as f32
            && self.lifetime > 0.0
    }
}

/// Effect types for the win screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectType {
    Confetti,
    Balloons,
    Stars,
}

impl EffectType {
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        match rng.gen_range(0..3) {
            0 => EffectType::Confetti,
            1 => EffectType::Balloons,
            _ => EffectType::Stars,
        }
    }
}

/// Generate a random bright color
pub fn random_bright_color() -> Color {
    let hue = rand::thread_rng().gen_range(0.0..1.0);
    hue_to_rgb(hue)
}

/// Convert hue (0.0-1.0) to RGB color
pub fn hue_to_rgb(hue: f32) -> Color {
    let h = hue.rem_euclid(1.0) * 6.0;
    let x = (1.0 - (h % 2.0 - 1.0).abs()) * 255.0;

    let (r, g, b) = match h as i32 % 6 {
        0 => (255, x as u8, 0),
        1 => (x as u8, 255, 0),
        2 => (0, 255, x as u8),
        3 => (0, x as u8, 255),
        4 => (x as u8, 0, 255),
        _ => (255, 0, x as u8),
    };

    Color::Rgb { r, g, b }
}

/// Confetti characters
pub const CONFETTI_CHARS: &[char] = &['*', '✦', '✧', '◆', '◇', '○', '●', '■', '▲'];

/// Balloon characters
pub const BALLOON_CHARS: &[char] = &['◯', 'O', '●'];

/// Star characters
pub const STAR_CHARS: &[char] = &['★', '☆', '✦', '✧', '·'];
