#![forbid(unsafe_code)]

//! Order reconciliation: map a move inside the visible subset of layers onto
//! the full authoritative layer order.
//!
//! # Algorithm
//!
//! The visible subset can omit layers (the base layer, layers the panel does
//! not list), so a subset index says nothing directly about a position in the
//! full order. [`reconcile_order`] anchors the moved layer to its new neighbour
//! in the subset instead:
//!
//! 1. `moved_subset = moved(visible, from, to)`; the moving id is
//!    `moved_subset[to]`.
//! 2. If `to` is the last subset position, the target is the full-order index
//!    of the layer now right before it.
//! 3. Otherwise the target is the full-order index of the layer now right
//!    after it, minus one when moving forward (`from < to`): the removal of
//!    the moving layer shifts that neighbour down by one. Clamped at zero.
//! 4. The moving id is moved from its full-order index to the target.
//!
//! # Invariants
//!
//! 1. The result is a permutation of the authoritative order.
//! 2. `from == to` returns the authoritative order unchanged.
//! 3. If `visible` is an order-consistent subsequence of `authoritative`, the
//!    visible ids appear in the result in the order of `moved_subset`, and
//!    ids outside the subset keep their relative order.

use std::fmt;

use crate::layer::LayerId;

/// Move the element at `from` to `to`, shifting the elements in between.
///
/// # Panics
///
/// Panics if `from` or `to` is out of bounds.
pub fn move_element<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Copy of `items` with the element at `from` moved to `to`.
///
/// # Panics
///
/// Panics if `from` or `to` is out of bounds.
#[must_use]
pub fn moved<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = items.to_vec();
    move_element(&mut out, from, to);
    out
}

/// A move from one list position to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexMove {
    /// Position the item is taken from.
    pub from: usize,
    /// Position the item lands on.
    pub to: usize,
}

impl IndexMove {
    /// Create a move.
    #[must_use]
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Whether the move leaves the list unchanged.
    #[inline]
    #[must_use]
    pub const fn is_noop(self) -> bool {
        self.from == self.to
    }

    /// Whether the item moves towards the end of the list.
    #[inline]
    #[must_use]
    pub const fn is_forward(self) -> bool {
        self.from < self.to
    }
}

/// Errors from [`reconcile_order`].
///
/// These are caller contract violations; a well-behaved drag source never
/// produces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    /// A move index is outside the visible subset.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the visible subset.
        len: usize,
    },
    /// A visible id is missing from the authoritative order.
    UnknownLayer(LayerId),
}

impl fmt::Display for ReorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "move index {index} out of range for {len} visible layers")
            }
            Self::UnknownLayer(id) => {
                write!(f, "layer {id} is not in the authoritative order")
            }
        }
    }
}

impl std::error::Error for ReorderError {}

fn position_of(order: &[LayerId], id: &LayerId) -> Result<usize, ReorderError> {
    order
        .iter()
        .position(|candidate| candidate == id)
        .ok_or_else(|| ReorderError::UnknownLayer(id.clone()))
}

/// Compute the new authoritative order for a move inside the visible subset.
///
/// See the module docs for the algorithm.
///
/// # Errors
///
/// [`ReorderError::IndexOutOfRange`] if either index is outside `visible`;
/// [`ReorderError::UnknownLayer`] if a visible id needed for the computation
/// is absent from `authoritative`.
pub fn reconcile_order(
    visible: &[LayerId],
    authoritative: &[LayerId],
    mv: IndexMove,
) -> Result<Vec<LayerId>, ReorderError> {
    let len = visible.len();
    for index in [mv.from, mv.to] {
        if index >= len {
            return Err(ReorderError::IndexOutOfRange { index, len });
        }
    }
    if mv.is_noop() {
        return Ok(authoritative.to_vec());
    }

    let moved_subset = moved(visible, mv.from, mv.to);
    let moving_id = &moved_subset[mv.to];
    let source_index = position_of(authoritative, moving_id)?;

    let target_index = if mv.to == len - 1 {
        let after_id = &moved_subset[mv.to - 1];
        position_of(authoritative, after_id)?
    } else {
        let before_id = &moved_subset[mv.to + 1];
        let displacement = usize::from(mv.is_forward());
        position_of(authoritative, before_id)?.saturating_sub(displacement)
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        layer = %moving_id,
        from = mv.from,
        to = mv.to,
        source_index,
        target_index,
        "reconciled layer move"
    );

    Ok(moved(authoritative, source_index, target_index))
}
