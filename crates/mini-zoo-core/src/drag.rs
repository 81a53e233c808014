//! Pointer-driven drag sessions
//!
//! Each pointer (mouse, or one finger of a multi-touch surface) holds at most
//! one session at a time. Sessions are registered on pointer-down and must be
//! released on every exit path: pointer-up, pointer-cancel, the pointer
//! leaving the surface, or the puzzle being torn down.

use crate::board::PieceDragState;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Identity of one pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

impl PointerId {
    /// The single mouse pointer
    pub const MOUSE: PointerId = PointerId(0);
}

/// Monotonic stack-order sequence shared by every piece of a puzzle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackCounter {
    current: u64,
}

impl StackCounter {
    /// Counter whose first [`next`](Self::next) yields `value + 1`
    pub fn starting_at(value: u64) -> Self {
        Self { current: value }
    }

    /// Read-then-increment
    pub fn next(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    /// Last value handed out
    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn reset(&mut self, value: u64) {
        self.current = value;
    }
}

/// One active drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub pointer: PointerId,
    pub piece: usize,
    pub stack_order: u64,
}

/// Why a pointer-down did not start a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DragRejected {
    #[error("no piece {0}")]
    UnknownPiece(usize),
    #[error("piece {0} is already snapped")]
    PieceSnapped(usize),
    #[error("piece {piece} is held by pointer {holder:?}")]
    PieceHeld { piece: usize, holder: PointerId },
    #[error("pointer {0:?} is already dragging")]
    PointerBusy(PointerId),
}

/// Registry of live drag sessions
#[derive(Debug, Default)]
pub struct DragTracker {
    active: HashMap<PointerId, DragSession>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for `pointer` picking up `piece`
    pub fn begin(
        &mut self,
        pointer: PointerId,
        piece: usize,
        pieces: &mut [PieceDragState],
        counter: &mut StackCounter,
    ) -> Result<DragSession, DragRejected> {
        if self.active.contains_key(&pointer) {
            return Err(DragRejected::PointerBusy(pointer));
        }
        if let Some(holder) = self.holder_of(piece) {
            return Err(DragRejected::PieceHeld { piece, holder });
        }

        let state = pieces
            .get_mut(piece)
            .ok_or(DragRejected::UnknownPiece(piece))?;
        if state.snapped {
            return Err(DragRejected::PieceSnapped(piece));
        }

        let stack_order = counter.next();
        state.stack_order = stack_order;
        state.dragging = true;

        let session = DragSession {
            pointer,
            piece,
            stack_order,
        };
        self.active.insert(pointer, session);
        debug!(?pointer, piece, stack_order, "drag started");
        Ok(session)
    }

    /// Apply an incremental pointer delta to the dragged piece
    pub fn drag(
        &mut self,
        pointer: PointerId,
        dx: f32,
        dy: f32,
        pieces: &mut [PieceDragState],
    ) -> bool {
        let Some(session) = self.active.get(&pointer) else {
            return false;
        };
        let Some(state) = pieces.get_mut(session.piece) else {
            return false;
        };

        state.x += dx;
        state.y += dy;
        true
    }

    /// Unregister the session held by `pointer`
    pub fn release(
        &mut self,
        pointer: PointerId,
        pieces: &mut [PieceDragState],
    ) -> Option<DragSession> {
        let session = self.active.remove(&pointer)?;
        if let Some(state) = pieces.get_mut(session.piece) {
            state.dragging = false;
        }
        debug!(?pointer, piece = session.piece, "drag released");
        Some(session)
    }

    /// Unregister every session, in pointer order
    pub fn release_all(&mut self, pieces: &mut [PieceDragState]) -> Vec<DragSession> {
        let mut pointers: Vec<PointerId> = self.active.keys().copied().collect();
        pointers.sort();
        pointers
            .into_iter()
            .filter_map(|pointer| self.release(pointer, pieces))
            .collect()
    }

    pub fn session(&self, pointer: PointerId) -> Option<&DragSession> {
        self.active.get(&pointer)
    }

    /// Pointer currently holding `piece`
    pub fn holder_of(&self, piece: usize) -> Option<PointerId> {
        self.active
            .values()
            .find(|s| s.piece == piece)
            .map(|s| s.pointer)
    }

    /// Number of registered sessions
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
