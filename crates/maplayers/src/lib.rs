#![forbid(unsafe_code)]

//! maplayers public facade crate.
//!
//! Re-exports the layer model, store, and panel widgets from the internal
//! crates and offers a prelude for hosts embedding a layer panel.
//!
//! ```rust,ignore
//! use maplayers::prelude::*;
//!
//! let stack = LayerStack::from_render_order([SharedLayer::new("base"), SharedLayer::new("roads")]);
//! let store = LayerStore::new();
//! let product = ProductId::from("map-1");
//! store.create_product(product.clone(), stack.display_order())?;
//!
//! let handles = ProductHandles::from_store(&store, &product)?;
//! let mut panel = MapLayers::new(MapLayersProps::from_surface(&stack, true), handles, store.clone());
//! panel.on_toggle_layer(&LayerId::from("roads"))?;
//! ```

use std::fmt;

#[cfg(feature = "tracing-fmt")]
pub mod logging;

// --- Core re-exports -------------------------------------------------------

pub use maplayers_core::{
    ElementRef, IndexMove, LayerId, LayerProperties, LayerStack, LayerStatus, LayerStatusKind,
    MapLayer, MapSurface, PointerInput, ProductId, ReorderError, SharedLayer, SortEvent,
    SortGesture, SortGestureConfig, move_element, moved, reconcile_order,
};

// --- i18n re-exports -------------------------------------------------------

pub use maplayers_i18n::{I18nError, LocaleStrings, StringCatalog};

// --- Runtime re-exports ----------------------------------------------------

pub use maplayers_runtime::{
    LayerAction, LayerConfig, LayerConfigMap, LayerDispatch, LayerOrder, LayerStore, Observable,
    OptimisticOverlay, OverlayState, PanelConfig, PanelConfigError, StoreError, Subscription,
};

// --- Widget re-exports -----------------------------------------------------

pub use maplayers_widgets::{
    LayerRow, MapLayers, MapLayersProps, PanelError, PanelView, ProductHandles,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for maplayers hosts.
#[derive(Debug)]
pub enum Error {
    /// A move could not be reconciled with the store order.
    Reorder(ReorderError),
    /// The store rejected an action.
    Store(StoreError),
    /// A panel callback failed.
    Panel(PanelError),
    /// A required string is missing.
    I18n(I18nError),
    /// Panel configuration could not be loaded.
    Config(PanelConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reorder(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Panel(err) => write!(f, "{err}"),
            Self::I18n(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Reorder(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Panel(err) => Some(err),
            Self::I18n(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ReorderError> for Error {
    fn from(err: ReorderError) -> Self {
        Self::Reorder(err)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<PanelError> for Error {
    fn from(err: PanelError) -> Self {
        Self::Panel(err)
    }
}

impl From<I18nError> for Error {
    fn from(err: I18nError) -> Self {
        Self::I18n(err)
    }
}

impl From<PanelConfigError> for Error {
    fn from(err: PanelConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for maplayers APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, IndexMove, LayerAction, LayerDispatch, LayerId, LayerStack, LayerStore, MapLayer,
        MapLayers, MapLayersProps, MapSurface, PanelConfig, PanelView, PointerInput, ProductHandles,
        ProductId, Result, SharedLayer, StringCatalog,
    };

    pub use crate::{core, i18n, runtime, widgets};
}

pub use maplayers_core as core;
pub use maplayers_i18n as i18n;
pub use maplayers_runtime as runtime;
pub use maplayers_widgets as widgets;
