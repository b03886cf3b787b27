#![forbid(unsafe_code)]

//! maplayers runtime
//!
//! State that outlives a single gesture: the authoritative layer order of
//! each map product, per-layer configuration, and the optimistic overlay that
//! bridges the gap between a drag ending and the store confirming it.
//!
//! # Key Components
//!
//! - [`Observable`] - Version-tracked value with change notification
//! - [`LayerStore`] - Per-product layer order and layer config, updated only
//!   through [`LayerAction`] dispatches
//! - [`OptimisticOverlay`] - `Idle → Pending → Idle` state machine for the
//!   locally reordered list
//! - [`PanelConfig`] - Tunables for the panel, loadable from TOML/JSON
//!
//! # How it fits in the system
//! `maplayers-widgets` dispatches reconciled orders from `maplayers-core` to
//! the store, shows the overlay's order while the dispatch is in flight, and
//! clears it when the store's order observable changes.

pub mod config;
pub mod observable;
pub mod overlay;
pub mod store;

pub use config::{PanelConfig, PanelConfigError};
pub use observable::{Observable, Subscription};
pub use overlay::{OptimisticOverlay, OverlayState};
pub use store::{
    LayerAction, LayerConfig, LayerConfigMap, LayerDispatch, LayerOrder, LayerStore, StoreError,
};
