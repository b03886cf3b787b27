#![forbid(unsafe_code)]

//! Sort gesture recognition for vertically stacked list rows.
//!
//! [`SortGesture`] turns pointer input on a fixed-row-height list into sort
//! events: `SortStart` once the pointer has travelled far enough, `SortOver`
//! while the hovered row changes, and `SortEnd` with the old and new index on
//! release.
//!
//! # State Machine
//!
//! ```text
//! Idle ──Down(on a row, can_start)──► Pressed ──Move(≥ threshold)──► Sorting
//!  ▲                                     │                              │
//!  └──────────────── Up / Cancel ────────┴──────── Up → SortEnd ────────┘
//!                                                  Cancel → SortCancel
//! ```
//!
//! # Invariants
//!
//! 1. `SortEnd` and `SortCancel` are only emitted after a `SortStart`, and
//!    every `SortStart` is followed by exactly one of them (a second press
//!    cancels the running sort).
//! 2. Releasing before the distance threshold emits nothing, so a plain click
//!    on a row never reorders it.
//! 3. Indices in emitted events are always `< item_count` of the press.
//! 4. Movement is locked to the vertical axis; only `y` is tracked.

/// Thresholds for sort gesture recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortGestureConfig {
    /// Height of one row (default: 40).
    pub row_height: u16,
    /// Minimum vertical travel before sorting starts (default: 10).
    pub distance_threshold: u16,
    /// Clamp the hovered row to the list when the pointer leaves it
    /// (default: true). When false, leaving the list keeps the last row.
    pub lock_to_container_edges: bool,
}

impl Default for SortGestureConfig {
    fn default() -> Self {
        Self {
            row_height: 40,
            distance_threshold: 10,
            lock_to_container_edges: true,
        }
    }
}

/// Pointer input, with `y` relative to the top of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerInput {
    /// Button pressed.
    Down {
        /// Vertical offset.
        y: i32,
    },
    /// Pointer moved with the button held.
    Move {
        /// Vertical offset.
        y: i32,
    },
    /// Button released.
    Up {
        /// Vertical offset.
        y: i32,
    },
    /// Gesture aborted (escape, focus loss).
    Cancel,
}

/// Semantic sort events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortEvent {
    /// Sorting started on the row at `index`.
    SortStart {
        /// Row being dragged.
        index: usize,
    },
    /// The dragged row now hovers over `over`.
    SortOver {
        /// Row being dragged.
        index: usize,
        /// Row currently hovered.
        over: usize,
    },
    /// Sorting finished.
    SortEnd {
        /// Row the drag started on.
        old_index: usize,
        /// Row the drag ended on.
        new_index: usize,
    },
    /// Sorting aborted; nothing moves.
    SortCancel,
}

#[derive(Debug, Clone)]
struct PressState {
    start_y: i32,
    index: usize,
    over: usize,
    item_count: usize,
    started: bool,
}

/// Stateful sort gesture recognizer.
#[derive(Debug, Clone, Default)]
pub struct SortGesture {
    config: SortGestureConfig,
    press: Option<PressState>,
}

impl SortGesture {
    /// Create a recognizer with the given configuration.
    #[must_use]
    pub fn new(config: SortGestureConfig) -> Self {
        Self {
            config,
            press: None,
        }
    }

    /// Process one pointer input.
    ///
    /// `item_count` is the number of sortable rows; `can_start` gates new
    /// presses (a read-only list passes `false`).
    pub fn process(
        &mut self,
        input: PointerInput,
        item_count: usize,
        can_start: bool,
    ) -> Vec<SortEvent> {
        let mut out = Vec::with_capacity(2);
        match input {
            PointerInput::Down { y } => {
                self.cancel(&mut out);
                self.on_down(y, item_count, can_start);
            }
            PointerInput::Move { y } => self.on_move(y, &mut out),
            PointerInput::Up { y } => self.on_up(y, &mut out),
            PointerInput::Cancel => self.cancel(&mut out),
        }
        out
    }

    /// Whether a sort is in progress.
    #[inline]
    #[must_use]
    pub fn is_sorting(&self) -> bool {
        self.press.as_ref().is_some_and(|press| press.started)
    }

    /// Reset to idle without emitting anything.
    pub fn reset(&mut self) {
        self.press = None;
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SortGestureConfig {
        &self.config
    }

    /// Update the configuration.
    pub fn set_config(&mut self, config: SortGestureConfig) {
        self.config = config;
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl SortGesture {
    fn raw_row(&self, y: i32) -> i64 {
        i64::from(y).div_euclid(i64::from(self.config.row_height.max(1)))
    }

    fn cancel(&mut self, out: &mut Vec<SortEvent>) {
        if self.press.take().is_some_and(|press| press.started) {
            out.push(SortEvent::SortCancel);
        }
    }

    fn on_down(&mut self, y: i32, item_count: usize, can_start: bool) {
        if !can_start || item_count == 0 {
            return;
        }
        let row = self.raw_row(y);
        let Ok(index) = usize::try_from(row) else {
            return;
        };
        if index >= item_count {
            return;
        }
        self.press = Some(PressState {
            start_y: y,
            index,
            over: index,
            item_count,
            started: false,
        });
    }

    fn hovered(&self, y: i32, press: &PressState) -> usize {
        let row = self.raw_row(y);
        let last = press.item_count - 1;
        match usize::try_from(row) {
            Ok(index) if index <= last => index,
            _ if !self.config.lock_to_container_edges => press.over,
            Ok(_) => last,
            Err(_) => 0,
        }
    }

    fn on_move(&mut self, y: i32, out: &mut Vec<SortEvent>) {
        let Some(mut press) = self.press.clone() else {
            return;
        };

        if !press.started {
            let travelled = (i64::from(y) - i64::from(press.start_y)).unsigned_abs();
            if travelled >= u64::from(self.config.distance_threshold) {
                press.started = true;
                out.push(SortEvent::SortStart { index: press.index });
            }
        }

        if press.started {
            let over = self.hovered(y, &press);
            if over != press.over {
                press.over = over;
                out.push(SortEvent::SortOver {
                    index: press.index,
                    over,
                });
            }
        }

        self.press = Some(press);
    }

    fn on_up(&mut self, y: i32, out: &mut Vec<SortEvent>) {
        let Some(press) = self.press.take() else {
            return;
        };
        if !press.started {
            return;
        }
        out.push(SortEvent::SortEnd {
            old_index: press.index,
            new_index: self.hovered(y, &press),
        });
    }
}
