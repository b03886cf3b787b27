#![forbid(unsafe_code)]

//! Optimistic overlay for locally reordered layer lists.
//!
//! When a drag ends, the panel re-renders its rows in the new order right
//! away and dispatches the reconciled order to the store. Until the store's
//! order changes, the rows come from the overlay; afterwards they come from
//! the authoritative order again.
//!
//! # State Machine
//!
//! ```text
//!          begin(move, revision)
//!   Idle ─────────────────────────► Pending { move, base_revision, since }
//!    ▲                                   │
//!    │  order revision ≠ base_revision   │
//!    │  next gesture start               │
//!    └── timeout elapsed ────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. Rendered rows are either the pending optimistic order or the latest
//!    authoritative order, never a mix.
//! 2. Each pending move is cleared exactly once; later order changes report
//!    no transition.
//! 3. A pending move never outlives its timeout, even if the store never
//!    answers.

use std::time::Duration;

use maplayers_core::{IndexMove, moved};
use tracing::{debug, warn};
use web_time::Instant;

/// Default time a pending move waits for the store before it is dropped.
pub const DEFAULT_PENDING_TIMEOUT: Duration = Duration::from_millis(2000);

/// State of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Rows follow the authoritative order.
    Idle,
    /// Rows follow the authoritative order with `mv` applied.
    Pending {
        /// Move applied to the rows.
        mv: IndexMove,
        /// Store order revision the move was computed against.
        base_revision: u64,
        /// When the move was dispatched.
        since: Instant,
    },
}

/// `Idle → Pending → Idle` state machine for optimistic reorders.
#[derive(Debug, Clone)]
pub struct OptimisticOverlay {
    state: OverlayState,
    timeout: Duration,
}

impl Default for OptimisticOverlay {
    fn default() -> Self {
        Self::new(DEFAULT_PENDING_TIMEOUT)
    }
}

impl OptimisticOverlay {
    /// Create an idle overlay with the given safety timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: OverlayState::Idle,
            timeout,
        }
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Safety timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The pending move, if any.
    #[must_use]
    pub fn pending(&self) -> Option<IndexMove> {
        match self.state {
            OverlayState::Pending { mv, .. } => Some(mv),
            OverlayState::Idle => None,
        }
    }

    /// Whether a move is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, OverlayState::Pending { .. })
    }

    /// Enter `Pending` for `mv`, computed against store order `base_revision`.
    ///
    /// A no-op move leaves the overlay unchanged. A move begun while another
    /// is pending replaces it.
    pub fn begin(&mut self, mv: IndexMove, base_revision: u64, now: Instant) {
        if mv.is_noop() {
            return;
        }
        if let Some(previous) = self.pending() {
            debug!(?previous, "pending layer move replaced");
        }
        debug!(from = mv.from, to = mv.to, base_revision, "layer move pending");
        self.state = OverlayState::Pending {
            mv,
            base_revision,
            since: now,
        };
    }

    /// The store's order changed to `revision`.
    ///
    /// Returns `true` if this cleared a pending move.
    pub fn on_order_changed(&mut self, revision: u64) -> bool {
        match self.state {
            OverlayState::Pending { base_revision, .. } if base_revision != revision => {
                debug!(revision, "layer move confirmed by store");
                self.state = OverlayState::Idle;
                true
            }
            _ => false,
        }
    }

    /// A new drag gesture started. Returns `true` if a pending move was dropped.
    pub fn on_gesture_start(&mut self) -> bool {
        self.cancel()
    }

    /// Drop the pending move without confirmation, e.g. after a rejected
    /// dispatch. Returns `true` if a move was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.state = OverlayState::Idle;
        was_pending
    }

    /// Drop the pending move if it has waited longer than the timeout.
    ///
    /// Returns `true` if the move expired.
    pub fn expire(&mut self, now: Instant) -> bool {
        let OverlayState::Pending { mv, since, .. } = self.state else {
            return false;
        };
        let waited = now.saturating_duration_since(since);
        if waited < self.timeout {
            return false;
        }
        warn!(
            from = mv.from,
            to = mv.to,
            waited_ms = waited.as_millis() as u64,
            "layer move not confirmed by store, reverting to authoritative order"
        );
        self.state = OverlayState::Idle;
        true
    }

    /// Rows to render: `items` with the pending move applied, if any.
    ///
    /// If the pending move no longer fits `items` (the list shrank), `items`
    /// is returned unchanged.
    #[must_use]
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        match self.pending() {
            Some(mv) if mv.from < items.len() && mv.to < items.len() => {
                moved(items, mv.from, mv.to)
            }
            _ => items.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVE: IndexMove = IndexMove::new(0, 2);

    #[test]
    fn starts_idle_and_passes_rows_through() {
        let overlay = OptimisticOverlay::default();
        assert_eq!(overlay.state(), OverlayState::Idle);
        assert_eq!(overlay.apply(&['b', 'c', 'd']), vec!['b', 'c', 'd']);
    }

    #[test]
    fn pending_move_reorders_rows() {
        let mut overlay = OptimisticOverlay::default();
        overlay.begin(MOVE, 0, Instant::now());
        assert_eq!(overlay.pending(), Some(MOVE));
        assert_eq!(overlay.apply(&['b', 'c', 'd']), vec!['c', 'd', 'b']);
    }

    #[test]
    fn noop_move_stays_idle() {
        let mut overlay = OptimisticOverlay::default();
        overlay.begin(IndexMove::new(1, 1), 0, Instant::now());
        assert!(!overlay.is_pending());
    }

    #[test]
    fn same_revision_does_not_clear() {
        let mut overlay = OptimisticOverlay::default();
        overlay.begin(MOVE, 4, Instant::now());
        assert!(!overlay.on_order_changed(4));
        assert!(overlay.is_pending());
    }

    #[test]
    fn order_change_clears_exactly_once() {
        let mut overlay = OptimisticOverlay::default();
        overlay.begin(MOVE, 0, Instant::now());
        assert!(overlay.on_order_changed(1));
        assert!(!overlay.on_order_changed(2));
        assert_eq!(overlay.state(), OverlayState::Idle);
        assert_eq!(overlay.apply(&['b', 'c', 'd']), vec!['b', 'c', 'd']);
    }

    #[test]
    fn gesture_start_drops_pending() {
        let mut overlay = OptimisticOverlay::default();
        assert!(!overlay.on_gesture_start());
        overlay.begin(MOVE, 0, Instant::now());
        assert!(overlay.on_gesture_start());
        assert!(!overlay.is_pending());
    }

    #[test]
    fn timeout_reverts_to_idle() {
        let mut overlay = OptimisticOverlay::new(Duration::from_millis(100));
        let t0 = Instant::now();
        overlay.begin(MOVE, 0, t0);
        assert!(!overlay.expire(t0 + Duration::from_millis(99)));
        assert!(overlay.is_pending());
        assert!(overlay.expire(t0 + Duration::from_millis(100)));
        assert!(!overlay.is_pending());
        assert!(!overlay.expire(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn later_begin_replaces_pending() {
        let mut overlay = OptimisticOverlay::default();
        let now = Instant::now();
        overlay.begin(MOVE, 0, now);
        overlay.begin(IndexMove::new(2, 0), 0, now);
        assert_eq!(overlay.pending(), Some(IndexMove::new(2, 0)));
    }

    #[test]
    fn move_that_no_longer_fits_is_ignored() {
        let mut overlay = OptimisticOverlay::default();
        overlay.begin(MOVE, 0, Instant::now());
        assert_eq!(overlay.apply(&['b', 'c']), vec!['b', 'c']);
    }
}
