//! Snap-vs-release decision on drag end

use crate::board::{PieceDragState, PieceSpec, CANVAS_SIZE};
use tracing::debug;

/// Snap distance at the native canvas size
pub const SNAP_THRESHOLD: f32 = 50.0;

/// Snap distance scaled to a canvas size
pub fn snap_threshold(canvas_size: f32) -> f32 {
    SNAP_THRESHOLD * canvas_size / CANVAS_SIZE
}

/// What happened to a released piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapOutcome {
    /// Locked into its slot at the given position
    Snapped { x: f32, y: f32 },
    /// Left where it was dropped
    Released { x: f32, y: f32 },
}

impl SnapOutcome {
    pub fn is_snapped(&self) -> bool {
        matches!(self, SnapOutcome::Snapped { .. })
    }

    pub fn position(&self) -> (f32, f32) {
        match *self {
            SnapOutcome::Snapped { x, y } | SnapOutcome::Released { x, y } => (x, y),
        }
    }
}

/// Euclidean distance between two canvas points
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Decide whether a piece dropped at `current` locks to `target`.
///
/// The threshold is exclusive: a piece exactly `threshold` away is not snapped.
pub fn evaluate(current: (f32, f32), target: (f32, f32), threshold: f32) -> SnapOutcome {
    if distance(current, target) < threshold {
        SnapOutcome::Snapped {
            x: target.0,
            y: target.1,
        }
    } else {
        SnapOutcome::Released {
            x: current.0,
            y: current.1,
        }
    }
}

/// Evaluate a released piece and write the outcome back into its state
pub fn apply(state: &mut PieceDragState, spec: &PieceSpec, threshold: f32) -> SnapOutcome {
    state.dragging = false;

    if state.snapped {
        state.x = spec.target_x;
        state.y = spec.target_y;
        return SnapOutcome::Snapped {
            x: spec.target_x,
            y: spec.target_y,
        };
    }

    let outcome = evaluate(state.position(), spec.target(), threshold);
    let (x, y) = outcome.position();
    state.x = x;
    state.y = y;
    state.snapped = outcome.is_snapped();

    if state.snapped {
        debug!(piece = state.id, "piece snapped into its slot");
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::partition;

    #[test]
    fn test_inside_threshold_snaps_to_target() {
        let outcome = evaluate((110.0, 120.0), (100.0, 100.0), SNAP_THRESHOLD);
        assert_eq!(outcome, SnapOutcome::Snapped { x: 100.0, y: 100.0 });
    }

    #[test]
    fn test_outside_threshold_keeps_release_position() {
        let outcome = evaluate((200.0, 10.0), (0.0, 0.0), SNAP_THRESHOLD);
        assert_eq!(outcome, SnapOutcome::Released { x: 200.0, y: 10.0 });
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // 30-40-50 triangle: exactly on the boundary
        let outcome = evaluate((30.0, 40.0), (0.0, 0.0), SNAP_THRESHOLD);
        assert!(!outcome.is_snapped());
        assert_eq!(outcome.position(), (30.0, 40.0));

        let just_inside = evaluate((30.0, 39.9), (0.0, 0.0), SNAP_THRESHOLD);
        assert!(just_inside.is_snapped());
    }

    #[test]
    fn test_threshold_scales_with_canvas() {
        assert_eq!(snap_threshold(CANVAS_SIZE), 50.0);
        assert_eq!(snap_threshold(1024.0), 100.0);
        assert_eq!(snap_threshold(256.0), 25.0);
    }

    #[test]
    fn test_apply_is_sticky() {
        let spec = partition(4, CANVAS_SIZE).unwrap()[3];
        let mut state = PieceDragState {
            id: 3,
            x: spec.target_x + 5.0,
            y: spec.target_y - 5.0,
            dragging: true,
            snapped: false,
            stack_order: 9,
        };

        assert!(apply(&mut state, &spec, SNAP_THRESHOLD).is_snapped());
        assert!(state.snapped);
        assert!(!state.dragging);
        assert_eq!(state.position(), spec.target());

        state.x += 400.0;
        let outcome = apply(&mut state, &spec, SNAP_THRESHOLD);
        assert!(outcome.is_snapped());
        assert!(state.snapped);
        assert_eq!(state.position(), spec.target());
    }
}
