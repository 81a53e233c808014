//! One-shot completion signal for a puzzle session

use crate::board::PieceDragState;
use std::time::Duration;

/// Pause between the last snap and the completion signal
pub const COMPLETION_DELAY: Duration = Duration::from_millis(500);

/// Watches the snapped state of a session and schedules completion once
#[derive(Debug, Clone)]
pub struct CompletionDetector {
    delay: Duration,
    fired: bool,
}

impl Default for CompletionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionDetector {
    pub fn new() -> Self {
        Self::with_delay(COMPLETION_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            fired: false,
        }
    }

    /// Re-evaluate after a drag end.
    ///
    /// Returns the deadline of the completion signal on the first call that
    /// sees every piece snapped, and `None` on every other call.
    pub fn observe(&mut self, pieces: &[PieceDragState], now: Duration) -> Option<Duration> {
        if self.fired || pieces.is_empty() || !pieces.iter().all(|p| p.snapped) {
            return None;
        }
        self.fired = true;
        Some(now + self.delay)
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(id: usize, snapped: bool) -> PieceDragState {
        PieceDragState {
            id,
            x: 0.0,
            y: 0.0,
            dragging: false,
            snapped,
            stack_order: 1,
        }
    }

    #[test]
    fn test_fires_once_after_last_snap() {
        let mut pieces: Vec<_> = (0..5).map(|i| piece(i, false)).collect();
        let mut detector = CompletionDetector::new();
        let mut signals = Vec::new();

        for i in 0..pieces.len() {
            pieces[i].snapped = true;
            let now = Duration::from_secs(i as u64);
            if let Some(at) = detector.observe(&pieces, now) {
                signals.push((i, at));
            }
        }

        assert_eq!(signals, vec![(4, Duration::from_secs(4) + COMPLETION_DELAY)]);

        // Re-evaluation never fires again
        for _ in 0..3 {
            assert!(detector.observe(&pieces, Duration::from_secs(10)).is_none());
        }
        assert!(detector.has_fired());
    }

    #[test]
    fn test_empty_session_never_completes() {
        let mut detector = CompletionDetector::new();
        assert!(detector.observe(&[], Duration::ZERO).is_none());
        assert!(!detector.has_fired());
    }

    #[test]
    fn test_custom_delay() {
        let mut detector = CompletionDetector::with_delay(Duration::from_millis(20));
        let pieces = [piece(0, true)];
        assert_eq!(
            detector.observe(&pieces, Duration::from_millis(100)),
            Some(Duration::from_millis(120))
        );
    }
}
