#![forbid(unsafe_code)]

//! Core: layer model, order reconciliation, and sort gestures.
//!
//! # Role in maplayers
//! `maplayers-core` owns the pieces of the layer panel that do not depend on a
//! store or a rendering surface: identifiers, the map-layer handle contract,
//! the pure reorder algorithm, and the pointer-to-sort gesture recognizer.
//!
//! # Primary responsibilities
//! - **Layer model**: [`LayerId`], [`ProductId`], [`MapLayer`], [`MapSurface`].
//! - **Order reconciliation**: [`reconcile_order`] maps a move within the
//!   visible subset of layers onto the full authoritative order.
//! - **Sort gestures**: [`SortGesture`] turns pointer input on a list into
//!   `SortStart` / `SortEnd` events.
//!
//! # How it fits in the system
//! `maplayers-runtime` stores authoritative orders and consumes
//! [`reconcile_order`] results; `maplayers-widgets` drives [`SortGesture`] and
//! renders rows from [`MapLayer`] handles.

pub mod layer;
pub mod reorder;
pub mod sort_gesture;

pub use layer::{
    ElementRef, LayerId, LayerProperties, LayerStack, LayerStatus, LayerStatusKind, MapLayer,
    MapSurface, ProductId, SharedLayer,
};
pub use reorder::{IndexMove, ReorderError, move_element, moved, reconcile_order};
pub use sort_gesture::{PointerInput, SortEvent, SortGesture, SortGestureConfig};
