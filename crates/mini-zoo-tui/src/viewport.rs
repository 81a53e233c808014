//! Mapping between terminal cells and canvas units
//!
//! The visible world is a square around the canvas large enough to hold the
//! scatter ring. Terminal cells are about twice as tall as they are wide, so
//! one row covers twice the canvas units of one column.

use mini_zoo_core::board::{SCATTER_RADIUS_FACTOR, SCATTER_RADIUS_SPREAD};

/// Rows reserved above and below the board for text
pub const HEADER_ROWS: u16 = 2;
pub const FOOTER_ROWS: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Terminal cell of the world's top-left corner
    pub origin_col: u16,
    pub origin_row: u16,
    /// World span covered by the board, in cells
    pub cols: u16,
    pub rows: u16,
    /// Canvas coordinate of the world's top-left corner
    pub world_min: f32,
    pub units_per_col: f32,
    pub units_per_row: f32,
}

impl Viewport {
    /// Fit the world for `canvas_size` into a terminal
    pub fn fit(term_width: u16, term_height: u16, canvas_size: f32) -> Self {
        let extent = canvas_size * SCATTER_RADIUS_FACTOR + SCATTER_RADIUS_SPREAD + canvas_size / 2.0;
        let span = extent * 2.0;
        let world_min = canvas_size / 2.0 - extent;

        let avail_rows = term_height.saturating_sub(HEADER_ROWS + FOOTER_ROWS).max(1);
        let avail_cols = term_width.max(2);

        let mut units_per_row = span / avail_rows as f32;
        let mut units_per_col = units_per_row / 2.0;
        if span / units_per_col > avail_cols as f32 {
            units_per_col = span / avail_cols as f32;
            units_per_row = units_per_col * 2.0;
        }

        let cols = ((span / units_per_col).floor() as u16).clamp(1, avail_cols);
        let rows = ((span / units_per_row).floor() as u16).clamp(1, avail_rows);

        Self {
            origin_col: (avail_cols - cols) / 2,
            origin_row: HEADER_ROWS + (avail_rows - rows) / 2,
            cols,
            rows,
            world_min,
            units_per_col,
            units_per_row,
        }
    }

    /// Canvas point at the centre of a terminal cell
    pub fn to_canvas(&self, col: u16, row: u16) -> (f32, f32) {
        let dc = col as f32 - self.origin_col as f32 + 0.5;
        let dr = row as f32 - self.origin_row as f32 + 0.5;
        (
            self.world_min + dc * self.units_per_col,
            self.world_min + dr * self.units_per_row,
        )
    }

    /// Terminal cell containing a canvas point; may be off screen
    pub fn to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        let col = ((x - self.world_min) / self.units_per_col).floor() as i32 + self.origin_col as i32;
        let row = ((y - self.world_min) / self.units_per_row).floor() as i32 + self.origin_row as i32;
        (col, row)
    }

    /// Canvas distance covered by moving between two cells
    pub fn delta(&self, from: (u16, u16), to: (u16, u16)) -> (f32, f32) {
        (
            (to.0 as f32 - from.0 as f32) * self.units_per_col,
            (to.1 as f32 - from.1 as f32) * self.units_per_row,
        )
    }

    /// Whether a terminal cell lies on the board
    pub fn contains_cell(&self, col: i32, row: i32) -> bool {
        col >= self.origin_col as i32
            && col < (self.origin_col + self.cols) as i32
            && row >= self.origin_row as i32
            && row < (self.origin_row + self.rows) as i32
    }
}
