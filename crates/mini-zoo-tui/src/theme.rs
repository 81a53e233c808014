use crossterm::style::Color;

/// Color palette for the TUI
#[derive(Debug, Clone)]
pub struct Palette {
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Frame and slot-grid color
    pub border: Color,
    /// Headings
    pub title: Color,
    /// Highlighted menu entry background
    pub selected_bg: Color,
    /// Locked tiles and mystery animals
    pub locked: Color,
    /// Filled difficulty paws
    pub paw: Color,
    pub error: Color,
    pub success: Color,
    /// Secondary text
    pub info: Color,
    /// Key binding text color
    pub key: Color,
    /// Dimmed background of the puzzle board
    pub board_bg: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::zoo()
    }
}

impl Palette {
    /// Bright palette for young players
    pub fn zoo() -> Self {
        Self {
            bg: Color::Rgb { r: 18, g: 24, b: 38 },
            fg: Color::Rgb { r: 236, g: 240, b: 248 },
            border: Color::Rgb { r: 80, g: 92, b: 120 },
            title: Color::Rgb { r: 250, g: 204, b: 21 },
            selected_bg: Color::Rgb { r: 168, g: 85, b: 247 },
            locked: Color::Rgb { r: 110, g: 115, b: 130 },
            paw: Color::Rgb { r: 249, g: 115, b: 22 },
            error: Color::Rgb { r: 255, g: 99, b: 99 },
            success: Color::Rgb { r: 74, g: 222, b: 128 },
            info: Color::Rgb { r: 160, g: 170, b: 190 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
            board_bg: Color::Rgb { r: 28, g: 36, b: 56 },
        }
    }

    /// Terminal color for a catalog accent
    pub fn accent((r, g, b): (u8, u8, u8)) -> Color {
        Color::Rgb { r, g, b }
    }
}
