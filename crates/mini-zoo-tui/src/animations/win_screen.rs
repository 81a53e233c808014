use crossterm::style::Color;
use rand::prelude::SliceRandom;
use rand::Rng;

use super::particles::{
    hue_to_rgb, random_bright_color, EffectType, Particle, BALLOON_CHARS, CONFETTI_CHARS,
    STAR_CHARS,
};

const WIN_MESSAGES: [&str; 8] = [
    "GREAT JOB!",
    "YOU DID IT!",
    "HOORAY!",
    "WELL DONE!",
    "AMAZING!",
    "SUPER STAR!",
    "FANTASTIC!",
    "WOW!",
];

const BANNER: &str = r#"
__   __          ____  _     _   ___ _   _
\ \ / /__ _  _  |  _ \(_) __| | |_ _| |_| |
 \ V / _ \ || | | | | | |/ _` |  | ||  _|_|
  |_|\___/\_,_| | |_| | | (_| |  | || |_(_)
                |____/|_|\__,_| |___|\__|
"#;

/// The animated win screen
pub struct WinScreen {
    particles: Vec<Particle>,
    effect_type: EffectType,
    frame_count: u32,
    rainbow_offset: f32,
    message_index: usize,
    pub width: u16,
    pub height: u16,
}

impl WinScreen {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            effect_type: EffectType::random(),
            frame_count: 0,
            rainbow_offset: 0.0,
            message_index: rand::thread_rng().gen_range(0..WIN_MESSAGES.len()),
            width: 80,
            height: 24,
        }
    }

    pub fn reset(&mut self) {
        self.particles.clear();
        self.frame_count = 0;
        self.rainbow_offset = 0.0;
        self.effect_type = EffectType::random();
        self.message_index = rand::thread_rng().gen_range(0..WIN_MESSAGES.len());
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn update(&mut self) {
        self.frame_count += 1;
        self.rainbow_offset += 0.04;

        if self.frame_count % 240 == 0 {
            self.effect_type = EffectType::random();
        }

        let floor = self.height as f32 + 3.0;
        self.particles.retain_mut(|p| {
            p.x += p.vx;
            p.y += p.vy;
            p.lifetime -= 0.016;
            p.lifetime > 0.0 && p.y < floor && p.y > -6.0
        });

        match self.effect_type {
            EffectType::Confetti => self.spawn_confetti(),
            EffectType::Balloons => self.spawn_balloons(),
            EffectType::Stars => self.spawn_stars(),
        }
    }

    fn spawn_confetti(&mut self) {
        let mut rng = rand::thread_rng();
        for _ in 0..3 {
            self.particles.push(Particle {
                x: rng.gen_range(0.0..self.width.max(1) as f32),
                y: -1.0,
                vx: rng.gen_range(-0.4..0.4),
                vy: rng.gen_range(0.3..0.9),
                char: CONFETTI_CHARS.choose(&mut rng).copied().unwrap_or('*'),
                color: random_bright_color(),
                lifetime: rng.gen_range(3.0..6.0),
            });
        }
    }

    fn spawn_balloons(&mut self) {
        let mut rng = rand::thread_rng();
        if rng.gen_bool(0.3) {
            self.particles.push(Particle {
                x: rng.gen_range(0.0..self.width.max(1) as f32),
                y: self.height as f32,
                vx: rng.gen_range(-0.1..0.1),
                vy: -rng.gen_range(0.2..0.5),
                char: BALLOON_CHARS.choose(&mut rng).copied().unwrap_or('O'),
                color: random_bright_color(),
                lifetime: rng.gen_range(4.0..8.0),
            });
        }
    }

    fn spawn_stars(&mut self) {
        let mut rng = rand::thread_rng();
        for _ in 0..3 {
            self.particles.push(Particle {
                x: rng.gen_range(0.0..self.width.max(1) as f32),
                y: rng.gen_range(0.0..self.height.max(1) as f32),
                vx: 0.0,
                vy: 0.0,
                char: STAR_CHARS.choose(&mut rng).copied().unwrap_or('*'),
                color: Color::Rgb {
                    r: 255,
                    g: 255,
                    b: rng.gen_range(120..255),
                },
                lifetime: rng.gen_range(0.4..1.2),
            });
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn current_message(&self) -> &str {
        WIN_MESSAGES[self.message_index]
    }

    pub fn banner(&self) -> &'static str {
        BANNER
    }

    /// Rainbow color for a banner line
    pub fn line_color(&self, line: usize) -> Color {
        hue_to_rgb(self.rainbow_offset + line as f32 * 0.1)
    }
}

impl Default for WinScreen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_stay_bounded() {
        let mut screen = WinScreen::new();
        screen.resize(40, 12);
        for _ in 0..2000 {
            screen.update();
        }
        assert!(screen.particles().len() < 1000);
        assert!(WIN_MESSAGES.contains(&screen.current_message()));
    }
}
