//! Grid partitioning and initial scatter of puzzle pieces
//!
//! A picture of `CANVAS_SIZE` x `CANVAS_SIZE` units is cut into a
//! `cols` x `rows` grid of rectangular slots, row-major. Pieces then start
//! on a ring around the canvas and have to be dragged back in.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use thiserror::Error;

/// Native canvas size in canvas units
pub const CANVAS_SIZE: f32 = 512.0;

/// Inner scatter radius as a fraction of the canvas size
pub const SCATTER_RADIUS_FACTOR: f32 = 0.6;

/// Extra random spread added on top of the inner scatter radius
pub const SCATTER_RADIUS_SPREAD: f32 = 100.0;

/// Errors building a puzzle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("invalid puzzle configuration: piece count {piece_count} is below 1")]
    InvalidConfig { piece_count: usize },
}

/// Column/row split for a piece count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub cols: usize,
    pub rows: usize,
    pub piece_width: f32,
    pub piece_height: f32,
}

impl GridLayout {
    pub fn for_count(piece_count: usize, canvas_size: f32) -> Result<Self, PuzzleError> {
        if piece_count < 1 {
            return Err(PuzzleError::InvalidConfig { piece_count });
        }

        let cols = ceil_sqrt(piece_count);
        let rows = piece_count.div_ceil(cols);

        Ok(Self {
            cols,
            rows,
            piece_width: canvas_size / cols as f32,
            piece_height: canvas_size / rows as f32,
        })
    }

    /// Number of grid cells, which may exceed the piece count on the last row
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }
}

/// Smallest `c` with `c * c >= n`
fn ceil_sqrt(n: usize) -> usize {
    let mut c = (n as f64).sqrt() as usize;
    while c * c < n {
        c += 1;
    }
    while c > 1 && (c - 1) * (c - 1) >= n {
        c -= 1;
    }
    c.max(1)
}

/// Immutable geometry of one piece
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceSpec {
    pub id: usize,
    /// Slot origin in canvas space
    pub target_x: f32,
    pub target_y: f32,
    pub width: f32,
    pub height: f32,
    /// Offset of the source picture so the slot's region shows through
    pub source_offset_x: f32,
    pub source_offset_y: f32,
}

impl PieceSpec {
    pub fn target(&self) -> (f32, f32) {
        (self.target_x, self.target_y)
    }

    /// Region of the source picture this piece shows, in canvas units
    pub fn source_origin(&self) -> (f32, f32) {
        (-self.source_offset_x, -self.source_offset_y)
    }
}

/// Live, per-session state of one piece
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceDragState {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub dragging: bool,
    /// Once set, never cleared for the rest of the session
    pub snapped: bool,
    /// Draw order; higher is on top
    pub stack_order: u64,
}

impl PieceDragState {
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Whether a canvas point falls on this piece at its current position
    pub fn contains(&self, spec: &PieceSpec, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + spec.width && y >= self.y && y < self.y + spec.height
    }
}

/// Cut a canvas into `piece_count` slots, row-major
pub fn partition(piece_count: usize, canvas_size: f32) -> Result<Vec<PieceSpec>, PuzzleError> {
    let layout = GridLayout::for_count(piece_count, canvas_size)?;

    let pieces = (0..piece_count)
        .map(|id| {
            let row = id / layout.cols;
            let col = id % layout.cols;
            let target_x = col as f32 * layout.piece_width;
            let target_y = row as f32 * layout.piece_height;
            PieceSpec {
                id,
                target_x,
                target_y,
                width: layout.piece_width,
                height: layout.piece_height,
                source_offset_x: -target_x,
                source_offset_y: -target_y,
            }
        })
        .collect();

    Ok(pieces)
}

/// Place every piece on a random ring around the canvas centre
///
/// Best effort only: a piece can still land close enough to its slot to
/// snap on first release.
pub fn scatter<R: Rng + ?Sized>(
    pieces: &[PieceSpec],
    canvas_size: f32,
    rng: &mut R,
) -> Vec<PieceDragState> {
    let centre = canvas_size / 2.0;
    let inner = canvas_size * SCATTER_RADIUS_FACTOR;

    pieces
        .iter()
        .enumerate()
        .map(|(index, piece)| {
            let angle = rng.gen_range(0.0..TAU);
            let radius = rng.gen_range(inner..=inner + SCATTER_RADIUS_SPREAD);
            PieceDragState {
                id: piece.id,
                x: centre + angle.cos() * radius - piece.width / 2.0,
                y: centre + angle.sin() * radius - piece.height / 2.0,
                dragging: false,
                snapped: false,
                stack_order: index as u64 + 1,
            }
        })
        .collect()
}
