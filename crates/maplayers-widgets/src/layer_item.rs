#![forbid(unsafe_code)]

//! One row of the layer panel.
//!
//! A [`LayerRow`] is the view model of a single layer: checkbox state, title,
//! status subtitle, and drag handle. Rows are rebuilt from [`MapLayer`]
//! handles on every view, so they never hold stale layer state.

use maplayers_core::{LayerId, LayerStatus, MapLayer};
use maplayers_i18n::{StringCatalog, keys};

/// Strings and flags shared by every row of one view.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    /// Catalog for the untitled-layer and drag-help strings.
    pub catalog: &'a StringCatalog,
    /// Locale to look strings up in.
    pub locale: &'a str,
    /// Whether the workspace can be edited.
    pub editable: bool,
}

/// View model of one layer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRow {
    /// Position within the row's section.
    pub index: usize,
    /// Layer id.
    pub id: LayerId,
    /// Display title.
    pub title: String,
    /// Status message shown under the title.
    pub subtitle: Option<String>,
    /// Checkbox state: the layer's visibility.
    pub checked: bool,
    /// Whether the checkbox is enabled.
    pub toggleable: bool,
    /// Whether the layer reported an error status.
    pub has_error: bool,
    /// Whether the row shows a drag handle.
    pub draggable: bool,
    /// Tooltip of the drag handle.
    pub drag_help: Option<String>,
}

impl LayerRow {
    /// Build the row for `layer` at `index`.
    ///
    /// `sortable` is false for rows outside the sortable section (the base
    /// layer); those never get a drag handle.
    #[must_use]
    pub fn new<L: MapLayer>(layer: &L, index: usize, sortable: bool, ctx: RowContext<'_>) -> Self {
        let status = layer.status();
        let has_error = status.as_ref().is_some_and(LayerStatus::is_error);
        let subtitle = status.and_then(|status| status.message);
        let draggable = sortable && ctx.editable;
        Self {
            index,
            id: layer.id(),
            title: layer_title(layer, ctx.catalog, ctx.locale),
            subtitle,
            checked: layer.visible(),
            toggleable: ctx.editable && !has_error,
            has_error,
            draggable,
            drag_help: draggable.then(|| ctx.catalog.text(ctx.locale, keys::SORT_HELP).to_owned()),
        }
    }
}

/// Title of a layer: its label, else its source element's title, else the
/// localized "untitled layer" string.
#[must_use]
pub fn layer_title<L: MapLayer>(layer: &L, catalog: &StringCatalog, locale: &str) -> String {
    let properties = layer.properties();
    if let Some(label) = properties.label.filter(|label| !label.is_empty()) {
        return label;
    }
    if let Some(element) = properties.element {
        return element.display_title().to_owned();
    }
    catalog.text(locale, keys::LAYER_NO_TITLE).to_owned()
}
