//! Cancellable delayed callbacks
//!
//! Gameplay suspends work with short waits ("wait 0.1 s, then re-check").
//! Every suspension is an entry in a single queue owned by the game state;
//! handlers re-validate liveness when an entry fires, because the target
//! piece or platform may be gone or frozen by then.

use serde::{Deserialize, Serialize};

use super::piece::PieceRef;

/// What to do when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Contact-settle re-check after the player left a piece
    PieceSettle(PieceRef),
    /// Pre-fall delay elapsed: detach the piece's owning platform
    PieceFall(PieceRef),
    /// Missed-landing confirmation after a jump arc completed
    MissCheck,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    id: u64,
    kind: TimerKind,
    remaining: f32,
}

/// Pending delayed callbacks, fired in schedule order within a frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire after `delay` seconds; returns a cancel handle
    pub fn schedule(&mut self, delay: f32, kind: TimerKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            kind,
            remaining: delay.max(0.0),
        });
        id
    }

    /// Cancel a single timer by handle; unknown handles are a no-op
    pub fn cancel(&mut self, id: u64) {
        self.timers.retain(|t| t.id != id);
    }

    /// Cancel every pending timer matching the predicate
    pub fn cancel_where(&mut self, mut pred: impl FnMut(TimerKind) -> bool) {
        self.timers.retain(|t| !pred(t.kind));
    }

    /// Any pending timer matching the predicate?
    pub fn pending(&self, mut pred: impl FnMut(TimerKind) -> bool) -> bool {
        self.timers.iter().any(|t| pred(t.kind))
    }

    /// Advance all timers by `dt`, returning the kinds that fired
    /// (in schedule order). Fired entries are removed.
    pub fn advance(&mut self, dt: f32) -> Vec<TimerKind> {
        let mut fired = Vec::new();
        for t in &mut self.timers {
            t.remaining -= dt;
        }
        self.timers.retain(|t| {
            if t.remaining <= 0.0 {
                fired.push(t.kind);
                false
            } else {
                true
            }
        });
        fired
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(platform: u32, piece: u32) -> PieceRef {
        PieceRef { platform, piece }
    }

    #[test]
    fn test_fires_in_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(0.1, TimerKind::PieceSettle(piece(0, 1)));
        q.schedule(0.1, TimerKind::MissCheck);

        assert!(q.advance(0.05).is_empty());
        let fired = q.advance(0.05);
        assert_eq!(
            fired,
            vec![TimerKind::PieceSettle(piece(0, 1)), TimerKind::MissCheck]
        );
        assert!(q.is_empty());
    }

    #[test]
    fn test_cancel_by_handle() {
        let mut q = TimerQueue::new();
        let id = q.schedule(0.2, TimerKind::MissCheck);
        q.cancel(id);
        assert!(q.advance(1.0).is_empty());
    }

    #[test]
    fn test_cancel_where_only_matching() {
        let mut q = TimerQueue::new();
        q.schedule(0.2, TimerKind::PieceSettle(piece(3, 7)));
        q.schedule(0.2, TimerKind::PieceFall(piece(3, 8)));
        q.schedule(0.2, TimerKind::MissCheck);

        q.cancel_where(|k| {
            matches!(
                k,
                TimerKind::PieceSettle(p) | TimerKind::PieceFall(p) if p.platform == 3
            )
        });

        let fired = q.advance(0.2);
        assert_eq!(fired, vec![TimerKind::MissCheck]);
    }

    #[test]
    fn test_rearmed_timer_fires_next_advance() {
        let mut q = TimerQueue::new();
        q.schedule(0.1, TimerKind::MissCheck);
        let fired = q.advance(0.1);
        assert_eq!(fired.len(), 1);

        // Re-arming with zero delay must not fire inside the same advance
        q.schedule(0.0, TimerKind::MissCheck);
        assert_eq!(q.advance(0.01).len(), 1);
    }
}
