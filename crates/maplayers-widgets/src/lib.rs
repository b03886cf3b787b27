#![forbid(unsafe_code)]

//! Layer panel widgets for map products.
//!
//! - [`layer_item`]: the view model of one layer row.
//! - [`panel`]: the sortable panel and its [`MapLayers`] controller.

pub mod layer_item;
pub mod panel;

pub use layer_item::{LayerRow, RowContext, layer_title};
pub use panel::{MapLayers, MapLayersProps, PanelError, PanelView, ProductHandles};
