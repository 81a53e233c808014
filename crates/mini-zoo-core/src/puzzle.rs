//! One puzzle screen instance
//!
//! `PuzzleSession` ties partitioning, scatter, drag sessions, snapping and
//! completion together. A new session is built every time the puzzle screen
//! is entered, so no piece state or timer survives a level change.

use crate::board::{partition, scatter, GridLayout, PieceDragState, PieceSpec, PuzzleError};
use crate::catalog::Level;
use crate::completion::CompletionDetector;
use crate::drag::{DragRejected, DragSession, DragTracker, PointerId, StackCounter};
use crate::snap::{self, snap_threshold, SnapOutcome};
use rand::Rng;
use std::time::Duration;
use tracing::info;

/// How long the hint picture stays visible
pub const HINT_DURATION: Duration = Duration::from_millis(1000);

/// Result of releasing a dragged piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEndReport {
    pub piece: usize,
    pub outcome: SnapOutcome,
    /// Set on the release that completed the puzzle
    pub completion_at: Option<Duration>,
}

#[derive(Debug)]
pub struct PuzzleSession {
    id: u64,
    level_id: String,
    canvas_size: f32,
    layout: GridLayout,
    pieces: Vec<PieceSpec>,
    states: Vec<PieceDragState>,
    tracker: DragTracker,
    stack: StackCounter,
    detector: CompletionDetector,
    snap_threshold: f32,
    hint_until: Option<Duration>,
    /// When the Win transition is due, once every piece has snapped
    completion_at: Option<Duration>,
}

impl PuzzleSession {
    /// Partition and scatter a level's picture
    pub fn new<R: Rng + ?Sized>(
        id: u64,
        level: &Level,
        canvas_size: f32,
        rng: &mut R,
    ) -> Result<Self, PuzzleError> {
        let layout = GridLayout::for_count(level.piece_count, canvas_size)?;
        let pieces = partition(level.piece_count, canvas_size)?;
        let states = scatter(&pieces, canvas_size, rng);

        info!(
            session = id,
            level = %level.id,
            pieces = pieces.len(),
            cols = layout.cols,
            rows = layout.rows,
            "puzzle session started"
        );

        Ok(Self {
            id,
            level_id: level.id.clone(),
            canvas_size,
            layout,
            stack: StackCounter::starting_at(pieces.len() as u64),
            pieces,
            states,
            tracker: DragTracker::new(),
            detector: CompletionDetector::new(),
            snap_threshold: snap_threshold(canvas_size),
            hint_until: None,
            completion_at: None,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn level_id(&self) -> &str {
        &self.level_id
    }

    pub fn canvas_size(&self) -> f32 {
        self.canvas_size
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn pieces(&self) -> &[PieceSpec] {
        &self.pieces
    }

    pub fn states(&self) -> &[PieceDragState] {
        &self.states
    }

    pub fn snap_threshold(&self) -> f32 {
        self.snap_threshold
    }

    /// Topmost free piece under a canvas point; snapped pieces and pieces
    /// held by another pointer are skipped
    pub fn piece_at(&self, x: f32, y: f32) -> Option<usize> {
        self.states
            .iter()
            .zip(&self.pieces)
            .filter(|(state, spec)| {
                !state.snapped
                    && self.tracker.holder_of(state.id).is_none()
                    && state.contains(spec, x, y)
            })
            .max_by_key(|(state, _)| state.stack_order)
            .map(|(state, _)| state.id)
    }

    /// Pick up a specific piece
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        piece: usize,
    ) -> Result<DragSession, DragRejected> {
        self.tracker
            .begin(pointer, piece, &mut self.states, &mut self.stack)
    }

    /// Pick up whatever piece is on top at a canvas point
    pub fn pointer_down_at(&mut self, pointer: PointerId, x: f32, y: f32) -> Option<DragSession> {
        let piece = self.piece_at(x, y)?;
        self.pointer_down(pointer, piece).ok()
    }

    pub fn pointer_move(&mut self, pointer: PointerId, dx: f32, dy: f32) -> bool {
        self.tracker.drag(pointer, dx, dy, &mut self.states)
    }

    /// Release the pointer's piece and decide snap-vs-release
    pub fn pointer_up(&mut self, pointer: PointerId, now: Duration) -> Option<DragEndReport> {
        let session = self.tracker.release(pointer, &mut self.states)?;
        Some(self.settle(session.piece, now))
    }

    /// Abnormal termination: the piece is evaluated as if released
    pub fn pointer_cancel(&mut self, pointer: PointerId, now: Duration) -> Option<DragEndReport> {
        self.pointer_up(pointer, now)
    }

    /// Release every live drag, e.g. when the screen is left
    pub fn release_all(&mut self, now: Duration) -> Vec<DragEndReport> {
        self.tracker
            .release_all(&mut self.states)
            .into_iter()
            .map(|session| self.settle(session.piece, now))
            .collect()
    }

    fn settle(&mut self, piece: usize, now: Duration) -> DragEndReport {
        let outcome = match (self.states.get_mut(piece), self.pieces.get(piece)) {
            (Some(state), Some(spec)) => snap::apply(state, spec, self.snap_threshold),
            _ => SnapOutcome::Released { x: 0.0, y: 0.0 },
        };
        let completion_at = self.detector.observe(&self.states, now);
        if let Some(at) = completion_at {
            info!(session = self.id, level = %self.level_id, "all pieces snapped");
            self.completion_at = Some(at);
        }
        DragEndReport {
            piece,
            outcome,
            completion_at,
        }
    }

    pub fn active_drags(&self) -> usize {
        self.tracker.active_count()
    }

    pub fn pieces_left(&self) -> usize {
        self.states.iter().filter(|s| !s.snapped).count()
    }

    pub fn is_solved(&self) -> bool {
        !self.states.is_empty() && self.pieces_left() == 0
    }

    pub fn completion_signalled(&self) -> bool {
        self.detector.has_fired()
    }

    /// Deadline set by the release that completed the puzzle
    pub fn completion_deadline(&self) -> Option<Duration> {
        self.completion_at
    }

    pub fn show_hint(&mut self, now: Duration) {
        self.hint_until = Some(now + HINT_DURATION);
    }

    pub fn hint_visible(&self, now: Duration) -> bool {
        self.hint_until.is_some_and(|until| now < until)
    }

    pub fn stack_counter(&self) -> u64 {
        self.stack.current()
    }

    /// Rewind the stack sequence, for deterministic replays
    pub fn reset_stack_order(&mut self, value: u64) {
        self.stack.reset(value);
    }

    /// Piece indices bottom to top
    pub fn draw_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.states.len()).collect();
        order.sort_by_key(|&i| {
            let state = &self.states[i];
            // Snapped pieces sit under everything still loose
            (!state.snapped, state.stack_order)
        });
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CANVAS_SIZE;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session(pieces: usize) -> PuzzleSession {
        let level = Level::new("farm-1", "farm", "Cow", pieces);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        PuzzleSession::new(1, &level, CANVAS_SIZE, &mut rng).unwrap()
    }

    /// Drag a piece from wherever it is to an absolute position
    fn drag_to(s: &mut PuzzleSession, pointer: PointerId, piece: usize, x: f32, y: f32) {
        s.pointer_down(pointer, piece).unwrap();
        let (cx, cy) = s.states()[piece].position();
        s.pointer_move(pointer, x - cx, y - cy);
    }

    #[test]
    fn test_rejects_empty_level() {
        let level = Level::new("x", "farm", "Cow", 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            PuzzleSession::new(1, &level, CANVAS_SIZE, &mut rng),
            Err(PuzzleError::InvalidConfig { piece_count: 0 })
        ));
    }

    #[test]
    fn test_stack_counter_starts_at_piece_count() {
        let mut s = session(3);
        assert_eq!(s.stack_counter(), 3);
        let drag = s.pointer_down(PointerId::MOUSE, 1).unwrap();
        assert_eq!(drag.stack_order, 4);
        assert_eq!(s.states()[1].stack_order, 4);
    }

    #[test]
    fn test_drop_near_target_snaps() {
        let mut s = session(4);
        let target = s.pieces()[2].target();
        drag_to(&mut s, PointerId::MOUSE, 2, target.0 + 10.0, target.1 + 10.0);

        let report = s.pointer_up(PointerId::MOUSE, Duration::ZERO).unwrap();
        assert!(report.outcome.is_snapped());
        assert_eq!(s.states()[2].position(), target);
        assert_eq!(s.pieces_left(), 3);
        assert!(report.completion_at.is_none());
    }

    #[test]
    fn test_drop_far_away_stays_put() {
        let mut s = session(4);
        drag_to(&mut s, PointerId::MOUSE, 0, 400.0, 400.0);

        let report = s.pointer_up(PointerId::MOUSE, Duration::ZERO).unwrap();
        assert!(!report.outcome.is_snapped());
        let (x, y) = report.outcome.position();
        assert!((x - 400.0).abs() < 1e-3 && (y - 400.0).abs() < 1e-3);
        assert_eq!(s.states()[0].position(), (x, y));
        assert!(!s.states()[0].snapped);
        assert!(!s.states()[0].dragging);
    }

    #[test]
    fn test_completion_reported_once_on_last_snap() {
        let mut s = session(3);
        let mut reports = Vec::new();
        for piece in 0..3 {
            let (tx, ty) = s.pieces()[piece].target();
            drag_to(&mut s, PointerId::MOUSE, piece, tx, ty);
            let now = Duration::from_millis(100 * piece as u64);
            reports.push(s.pointer_up(PointerId::MOUSE, now).unwrap());
        }

        let fired: Vec<_> = reports.iter().filter_map(|r| r.completion_at).collect();
        assert_eq!(fired, vec![Duration::from_millis(200) + Duration::from_millis(500)]);
        assert!(s.is_solved());
        assert!(s.completion_signalled());
        assert_eq!(s.completion_deadline(), Some(Duration::from_millis(700)));

        // A snapped piece can no longer be picked up
        assert_eq!(
            s.pointer_down(PointerId::MOUSE, 0),
            Err(DragRejected::PieceSnapped(0))
        );
    }

    #[test]
    fn test_cancel_evaluates_and_unregisters() {
        let mut s = session(4);
        let (tx, ty) = s.pieces()[1].target();
        drag_to(&mut s, PointerId(5), 1, tx + 3.0, ty);
        assert_eq!(s.active_drags(), 1);

        let report = s.pointer_cancel(PointerId(5), Duration::ZERO).unwrap();
        assert!(report.outcome.is_snapped());
        assert_eq!(s.active_drags(), 0);
        assert!(s.states().iter().all(|p| !p.dragging));
    }

    #[test]
    fn test_release_all_clears_every_pointer() {
        let mut s = session(4);
        s.pointer_down(PointerId(1), 0).unwrap();
        s.pointer_down(PointerId(2), 1).unwrap();
        s.pointer_down(PointerId(3), 2).unwrap();

        let reports = s.release_all(Duration::ZERO);
        assert_eq!(reports.len(), 3);
        assert_eq!(s.active_drags(), 0);
        assert!(s.states().iter().all(|p| !p.dragging));
    }

    #[test]
    fn test_piece_at_prefers_topmost() {
        let mut s = session(4);
        drag_to(&mut s, PointerId::MOUSE, 0, 300.0, 300.0);
        s.pointer_up(PointerId::MOUSE, Duration::ZERO);
        drag_to(&mut s, PointerId::MOUSE, 1, 310.0, 310.0);
        s.pointer_up(PointerId::MOUSE, Duration::ZERO);

        assert_eq!(s.piece_at(320.0, 320.0), Some(1));
        assert_eq!(s.piece_at(305.0, 305.0), Some(0));

        let picked = s.pointer_down_at(PointerId::MOUSE, 320.0, 320.0).unwrap();
        assert_eq!(picked.piece, 1);
    }

    #[test]
    fn test_second_pointer_reaches_free_piece_under_held_one() {
        let mut s = session(4);
        drag_to(&mut s, PointerId::MOUSE, 0, 300.0, 300.0);
        s.pointer_up(PointerId::MOUSE, Duration::ZERO);
        drag_to(&mut s, PointerId(1), 1, 310.0, 310.0);

        // Piece 1 is on top but held by pointer 1
        assert_eq!(s.piece_at(320.0, 320.0), Some(0));
        let picked = s.pointer_down_at(PointerId(2), 320.0, 320.0).unwrap();
        assert_eq!(picked.piece, 0);
        assert_eq!(s.active_drags(), 2);

        // Nothing free under the point once both are held
        assert_eq!(s.pointer_down_at(PointerId(3), 320.0, 320.0), None);
    }

    #[test]
    fn test_hint_expires() {
        let mut s = session(3);
        assert!(!s.hint_visible(Duration::ZERO));
        s.show_hint(Duration::from_millis(200));
        assert!(s.hint_visible(Duration::from_millis(700)));
        assert!(!s.hint_visible(Duration::from_millis(1200)));
    }

    #[test]
    fn test_draw_order_puts_last_grabbed_on_top() {
        let mut s = session(3);
        s.pointer_down(PointerId::MOUSE, 0).unwrap();
        assert_eq!(s.draw_order().last(), Some(&0));
        s.pointer_up(PointerId::MOUSE, Duration::ZERO);

        s.reset_stack_order(100);
        s.pointer_down(PointerId::MOUSE, 2).unwrap();
        assert_eq!(s.states()[2].stack_order, 101);
        assert_eq!(s.draw_order().last(), Some(&2));
    }
}
