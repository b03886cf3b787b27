#![forbid(unsafe_code)]

//! Layer panel: a sortable list of layers above an unsortable base layer.
//!
//! [`MapLayers`] is the panel controller. The host hands it the layers to
//! show ([`MapLayersProps`]), the product's store observables
//! ([`ProductHandles`]) and a [`LayerDispatch`] sink, then forwards pointer
//! input and checkbox clicks. [`MapLayers::view`] returns what to draw.
//!
//! # Reorder flow
//!
//! ```text
//! SortEnd(old, new)
//!   → reconcile_order(visible ids, store order, old → new)
//!   → overlay.begin(move, store revision)      rows render moved at once
//!   → dispatch(SetLayerOrder)
//!   → store order observable changes            overlay back to Idle
//! ```
//!
//! # Invariants
//!
//! 1. Rows are the props' layers in store order, with the pending move
//!    applied while one is pending; never a partially applied move.
//! 2. A read-only panel never dispatches.
//! 3. Toggling visibility dispatches `UpdateLayerConfig` only; the layer
//!    order is untouched.
//! 4. The store subscription lives exactly as long as the controller.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use maplayers_core::{
    IndexMove, LayerId, MapLayer, MapSurface, PointerInput, ProductId, ReorderError, SortEvent,
    SortGesture, reconcile_order,
};
use maplayers_i18n::{StringCatalog, keys};
use maplayers_runtime::{
    LayerAction, LayerConfig, LayerConfigMap, LayerDispatch, LayerOrder, LayerStore, Observable,
    OptimisticOverlay, PanelConfig, StoreError, Subscription,
};
use web_time::Instant;

use crate::layer_item::{LayerRow, RowContext};

// ---------------------------------------------------------------------------
// Props and view
// ---------------------------------------------------------------------------

/// Input of the panel, rebuilt by the host whenever the map's layers change.
#[derive(Debug, Clone)]
pub struct MapLayersProps<L> {
    /// Sortable layers, top-most first.
    pub layers: Vec<L>,
    /// Ids of `layers` as the host listed them.
    pub layer_order: Vec<LayerId>,
    /// Whether the user may reorder and toggle layers.
    pub editable: bool,
    /// Bottom-most layer, listed separately and never sortable.
    pub base_layer: Option<L>,
}

impl<L: MapLayer> MapLayersProps<L> {
    /// Props for `layers` (top-most first) and an optional base layer.
    #[must_use]
    pub fn new(layers: Vec<L>, base_layer: Option<L>, editable: bool) -> Self {
        let layer_order = layers.iter().map(MapLayer::id).collect();
        Self {
            layers,
            layer_order,
            editable,
            base_layer,
        }
    }

    /// Props for every layer of a map surface: the bottom-most layer is the
    /// base, the rest are sortable.
    #[must_use]
    pub fn from_surface<S>(surface: &S, editable: bool) -> Self
    where
        S: MapSurface<Layer = L>,
    {
        let (base_layer, layers) = surface.panel_layers();
        Self::new(layers, base_layer, editable)
    }

    fn find(&self, id: &LayerId) -> Option<&L> {
        self.layers
            .iter()
            .chain(self.base_layer.as_ref())
            .find(|layer| &layer.id() == id)
    }
}

/// What the panel draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelView {
    /// Neither a base layer nor sortable layers.
    Empty {
        /// Localized "no layers" message.
        message: String,
    },
    /// Sortable rows followed by the base row.
    List {
        /// Sortable rows, top-most first.
        rows: Vec<LayerRow>,
        /// Base layer row.
        base: Option<LayerRow>,
        /// A drag is in progress (the list renders its sorting style).
        sorting: bool,
    },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from panel callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    /// The move could not be mapped onto the store order.
    Reorder(ReorderError),
    /// The store rejected the dispatched action.
    Store(StoreError),
    /// The layer is not shown by the panel.
    UnknownLayer(LayerId),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reorder(e) => write!(f, "reorder failed: {e}"),
            Self::Store(e) => write!(f, "store rejected update: {e}"),
            Self::UnknownLayer(id) => write!(f, "layer {id} is not shown in the panel"),
        }
    }
}

impl std::error::Error for PanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Reorder(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::UnknownLayer(_) => None,
        }
    }
}

impl From<ReorderError> for PanelError {
    fn from(e: ReorderError) -> Self {
        Self::Reorder(e)
    }
}

impl From<StoreError> for PanelError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Store handles
// ---------------------------------------------------------------------------

/// Observables of one product in the layer store.
#[derive(Debug, Clone)]
pub struct ProductHandles {
    /// Product the panel edits.
    pub product: ProductId,
    /// Authoritative layer order.
    pub order: Observable<LayerOrder>,
    /// Per-layer config.
    pub config: Observable<LayerConfigMap>,
}

impl ProductHandles {
    /// Handles of `product` in `store`.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownProduct`] if the store has no such product.
    pub fn from_store(store: &LayerStore, product: &ProductId) -> Result<Self, StoreError> {
        let unknown = || StoreError::UnknownProduct(product.clone());
        Ok(Self {
            product: product.clone(),
            order: store.layer_order(product).ok_or_else(unknown)?,
            config: store.layers_config(product).ok_or_else(unknown)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Layer panel controller.
pub struct MapLayers<L, D> {
    props: MapLayersProps<L>,
    handles: ProductHandles,
    dispatcher: D,
    overlay: Rc<RefCell<OptimisticOverlay>>,
    gesture: SortGesture,
    sorting: bool,
    catalog: StringCatalog,
    locale: String,
    _order_subscription: Subscription,
}

impl<L: fmt::Debug, D> fmt::Debug for MapLayers<L, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapLayers")
            .field("product", &self.handles.product)
            .field("props", &self.props)
            .field("overlay", &self.overlay.borrow().state())
            .field("sorting", &self.sorting)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

fn subscribe_overlay(
    order: &Observable<LayerOrder>,
    overlay: &Rc<RefCell<OptimisticOverlay>>,
) -> Subscription {
    let overlay = Rc::downgrade(overlay);
    order.subscribe(move |order: &LayerOrder| {
        if let Some(overlay) = overlay.upgrade() {
            overlay.borrow_mut().on_order_changed(order.revision());
        }
    })
}

impl<L, D> MapLayers<L, D>
where
    L: MapLayer + Clone,
    D: LayerDispatch,
{
    /// Create a panel with the default [`PanelConfig`] and English strings.
    #[must_use]
    pub fn new(props: MapLayersProps<L>, handles: ProductHandles, dispatcher: D) -> Self {
        let config = PanelConfig::default();
        let overlay = Rc::new(RefCell::new(OptimisticOverlay::new(config.pending_timeout())));
        let subscription = subscribe_overlay(&handles.order, &overlay);
        Self {
            props,
            handles,
            dispatcher,
            overlay,
            gesture: SortGesture::new(config.to_sort_gesture_config()),
            sorting: false,
            catalog: StringCatalog::with_panel_defaults(),
            locale: config.locale,
            _order_subscription: subscription,
        }
    }

    /// Apply gesture thresholds, pending timeout, and locale from `config`.
    ///
    /// Any pending move and drag in progress are dropped.
    #[must_use]
    pub fn with_config(mut self, config: &PanelConfig) -> Self {
        self.gesture = SortGesture::new(config.to_sort_gesture_config());
        self.sorting = false;
        *self.overlay.borrow_mut() = OptimisticOverlay::new(config.pending_timeout());
        self.locale.clone_from(&config.locale);
        self
    }

    /// Replace the string catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: StringCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Current props.
    #[must_use]
    pub fn props(&self) -> &MapLayersProps<L> {
        &self.props
    }

    /// Product the panel edits.
    #[must_use]
    pub fn product(&self) -> &ProductId {
        &self.handles.product
    }

    /// The move shown ahead of the store, if any.
    #[must_use]
    pub fn pending(&self) -> Option<IndexMove> {
        self.overlay.borrow().pending()
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_sorting(&self) -> bool {
        self.sorting
    }

    /// Replace the props after the host's layers changed.
    ///
    /// A drag in progress is abandoned when the number of sortable layers
    /// changes, since its indices no longer match the rows.
    pub fn set_props(&mut self, props: MapLayersProps<L>) {
        if self.gesture.is_sorting() && props.layers.len() != self.props.layers.len() {
            self.gesture.reset();
            self.sorting = false;
        }
        self.props = props;
    }

    /// What to draw now.
    #[must_use]
    pub fn view(&self) -> PanelView {
        if self.props.base_layer.is_none() && self.props.layers.is_empty() {
            return PanelView::Empty {
                message: self.catalog.text(&self.locale, keys::LAYERS_EMPTY).to_owned(),
            };
        }
        let ctx = RowContext {
            catalog: &self.catalog,
            locale: &self.locale,
            editable: self.props.editable,
        };
        let layers = self.overlay.borrow().apply(&self.sortable_layers());
        let rows = layers
            .iter()
            .enumerate()
            .map(|(index, layer)| LayerRow::new(layer, index, true, ctx))
            .collect();
        let base = self
            .props
            .base_layer
            .as_ref()
            .map(|layer| LayerRow::new(layer, 0, false, ctx));
        PanelView::List {
            rows,
            base,
            sorting: self.sorting,
        }
    }

    /// A drag started: show the sorting style and drop any pending move.
    pub fn on_sort_start(&mut self) {
        self.sorting = true;
        let dropped = self.overlay.borrow_mut().on_gesture_start();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            product = %self.handles.product,
            dropped_pending = dropped,
            "layer sort started"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = dropped;
    }

    /// A drag ended. Moves the layer unless it was dropped where it started.
    ///
    /// Returns whether a new order was dispatched.
    ///
    /// # Errors
    ///
    /// See [`MapLayers::on_order_layer`].
    pub fn on_sort_end(&mut self, old_index: usize, new_index: usize) -> Result<bool, PanelError> {
        self.sort_end_at(old_index, new_index, Instant::now())
    }

    /// Move the sortable layer at `old_index` to `new_index`.
    ///
    /// The rows show the move at once; the reconciled full order is
    /// dispatched to the store as `SetLayerOrder`. Returns whether anything
    /// was dispatched: a no-op move or a read-only panel dispatches nothing.
    ///
    /// # Errors
    ///
    /// [`PanelError::Reorder`] if the indices do not fit the visible layers
    /// or the store order lacks one of them; [`PanelError::Store`] if the
    /// store rejects the order, in which case the rows revert at once.
    pub fn on_order_layer(
        &mut self,
        old_index: usize,
        new_index: usize,
    ) -> Result<bool, PanelError> {
        self.order_layer_at(old_index, new_index, Instant::now())
    }

    /// Flip the visibility of a layer.
    ///
    /// The new visibility is merged into the layer's stored config and
    /// dispatched as `UpdateLayerConfig`; once the store accepts it the
    /// layer handle is shown or hidden. Returns whether anything changed: a
    /// read-only panel or a layer in error does nothing.
    ///
    /// # Errors
    ///
    /// [`PanelError::UnknownLayer`] if the panel does not show `id`;
    /// [`PanelError::Store`] if the store rejects the config.
    pub fn on_toggle_layer(&mut self, id: &LayerId) -> Result<bool, PanelError> {
        let layer = self
            .props
            .find(id)
            .cloned()
            .ok_or_else(|| PanelError::UnknownLayer(id.clone()))?;
        if !self.props.editable || layer.status().is_some_and(|status| status.is_error()) {
            return Ok(false);
        }

        let visible = !layer.visible();
        let stored = self
            .handles
            .config
            .with(|map| map.get(id).copied())
            .unwrap_or_default();
        let config = stored.merge(LayerConfig::visibility(visible));
        self.dispatch(LayerAction::UpdateLayerConfig {
            product: self.handles.product.clone(),
            layer: id.clone(),
            config,
        })?;
        layer.set_visible(visible);

        #[cfg(feature = "tracing")]
        tracing::debug!(product = %self.handles.product, layer = %id, visible, "layer toggled");
        Ok(true)
    }

    /// Feed pointer input over the sortable rows.
    ///
    /// Sort events are acted on and returned. A failed reorder is logged and
    /// otherwise ignored; the rows stay on the store order.
    pub fn handle_pointer(&mut self, input: PointerInput, now: Instant) -> Vec<SortEvent> {
        let events = self
            .gesture
            .process(input, self.props.layers.len(), self.props.editable);
        for event in &events {
            match *event {
                SortEvent::SortStart { .. } => self.on_sort_start(),
                SortEvent::SortOver { .. } => {}
                SortEvent::SortEnd {
                    old_index,
                    new_index,
                } => {
                    if let Err(err) = self.sort_end_at(old_index, new_index, now) {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            product = %self.handles.product,
                            error = %err,
                            "layer reorder failed"
                        );
                        #[cfg(not(feature = "tracing"))]
                        let _ = err;
                    }
                }
                SortEvent::SortCancel => self.sorting = false,
            }
        }
        events
    }

    /// Expire a pending move that the store never confirmed.
    ///
    /// Returns `true` if the rows reverted to the store order.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.overlay.borrow_mut().expire(now)
    }

    fn sort_end_at(
        &mut self,
        old_index: usize,
        new_index: usize,
        now: Instant,
    ) -> Result<bool, PanelError> {
        self.sorting = false;
        if old_index == new_index {
            return Ok(false);
        }
        self.order_layer_at(old_index, new_index, now)
    }

    fn order_layer_at(
        &mut self,
        old_index: usize,
        new_index: usize,
        now: Instant,
    ) -> Result<bool, PanelError> {
        let mv = IndexMove::new(old_index, new_index);
        if !self.props.editable || mv.is_noop() {
            return Ok(false);
        }

        let visible: Vec<LayerId> = self.sortable_layers().iter().map(MapLayer::id).collect();
        let (revision, order) = self
            .handles
            .order
            .with(|order| (order.revision(), reconcile_order(&visible, order.ids(), mv)));
        let order = order?;

        // Released before dispatch: a synchronous store clears it from the
        // order subscription.
        self.overlay.borrow_mut().begin(mv, revision, now);

        let result = self.dispatch(LayerAction::SetLayerOrder {
            product: self.handles.product.clone(),
            order,
        });
        if result.is_err() {
            self.overlay.borrow_mut().cancel();
        }
        result.map(|()| true)
    }

    /// Sortable layers in store order. Layers the store does not list keep
    /// their props order after the listed ones.
    fn sortable_layers(&self) -> Vec<L> {
        let mut layers = self.props.layers.clone();
        self.handles.order.with(|order| {
            layers.sort_by_key(|layer| {
                let id = layer.id();
                order
                    .ids()
                    .iter()
                    .position(|candidate| *candidate == id)
                    .unwrap_or(usize::MAX)
            });
        });
        layers
    }

    fn dispatch(&self, action: LayerAction) -> Result<(), PanelError> {
        self.dispatcher.dispatch(action).map_err(PanelError::from)
    }
}
