#![forbid(unsafe_code)]

//! Layer store: authoritative layer order and layer config per map product.
//!
//! The store is the only owner of a product's layer order. Panels never write
//! to it directly; they dispatch [`LayerAction`]s through [`LayerDispatch`]
//! and observe the result through the per-product observables.
//!
//! # Invariants
//!
//! 1. A product's order contains each of its layer ids exactly once.
//! 2. `SetLayerOrder` only permutes the order; any other set is rejected.
//! 3. Every accepted `SetLayerOrder` bumps [`LayerOrder::revision`], so order
//!    subscribers are notified even when the ids did not move.
//! 4. `UpdateLayerConfig` never changes the order.
//! 5. No internal borrow is held while subscribers run, so a subscriber may
//!    dispatch again.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use maplayers_core::{LayerId, ProductId};
use tracing::{debug, warn};

use crate::observable::Observable;

/// Per-layer config map of one product.
pub type LayerConfigMap = BTreeMap<LayerId, LayerConfig>;

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

/// Authoritative layer order of a product, in display order (top-most first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerOrder {
    revision: u64,
    ids: Vec<LayerId>,
}

impl LayerOrder {
    /// Order at revision 0.
    #[must_use]
    pub fn new(ids: Vec<LayerId>) -> Self {
        Self { revision: 0, ids }
    }

    /// Number of accepted order writes since the product was created.
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Layer ids, top-most first.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[LayerId] {
        &self.ids
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the order is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn next(&self, ids: Vec<LayerId>) -> Self {
        Self {
            revision: self.revision + 1,
            ids,
        }
    }
}

/// Persisted per-layer settings. `None` fields leave the layer's own value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayerConfig {
    /// Visibility override.
    pub visible: Option<bool>,
    /// Opacity override in `[0, 1]`.
    pub opacity: Option<f32>,
}

impl LayerConfig {
    /// Config carrying only a visibility value.
    #[must_use]
    pub fn visibility(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            opacity: None,
        }
    }

    /// Config carrying only an opacity value.
    #[must_use]
    pub fn opacity(opacity: f32) -> Self {
        Self {
            visible: None,
            opacity: Some(opacity.clamp(0.0, 1.0)),
        }
    }

    /// Fields of `update` override fields of `self`.
    #[must_use]
    pub fn merge(self, update: Self) -> Self {
        Self {
            visible: update.visible.or(self.visible),
            opacity: update.opacity.or(self.opacity),
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// State changes accepted by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerAction {
    /// Replace a product's layer order with a permutation of it.
    SetLayerOrder {
        /// Target product.
        product: ProductId,
        /// New order, top-most first.
        order: Vec<LayerId>,
    },
    /// Merge config into one layer's stored config.
    UpdateLayerConfig {
        /// Target product.
        product: ProductId,
        /// Target layer.
        layer: LayerId,
        /// Fields to merge.
        config: LayerConfig,
    },
    /// Put a new layer on top of a product's order.
    AddLayer {
        /// Target product.
        product: ProductId,
        /// New layer.
        layer: LayerId,
    },
    /// Remove a layer and its config from a product.
    RemoveLayer {
        /// Target product.
        product: ProductId,
        /// Removed layer.
        layer: LayerId,
    },
}

impl LayerAction {
    /// Product the action targets.
    #[must_use]
    pub fn product(&self) -> &ProductId {
        match self {
            Self::SetLayerOrder { product, .. }
            | Self::UpdateLayerConfig { product, .. }
            | Self::AddLayer { product, .. }
            | Self::RemoveLayer { product, .. } => product,
        }
    }

    /// Short action name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetLayerOrder { .. } => "set_layer_order",
            Self::UpdateLayerConfig { .. } => "update_layer_config",
            Self::AddLayer { .. } => "add_layer",
            Self::RemoveLayer { .. } => "remove_layer",
        }
    }
}

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No product with this id.
    UnknownProduct(ProductId),
    /// A product with this id already exists.
    DuplicateProduct(ProductId),
    /// The proposed order is not a permutation of the current one.
    OrderMismatch {
        /// Target product.
        product: ProductId,
        /// What is wrong with the order.
        reason: String,
    },
    /// The layer is not part of the product.
    UnknownLayer {
        /// Target product.
        product: ProductId,
        /// Missing layer.
        layer: LayerId,
    },
    /// The layer is already part of the product.
    DuplicateLayer {
        /// Target product.
        product: ProductId,
        /// Existing layer.
        layer: LayerId,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProduct(product) => write!(f, "unknown product {product}"),
            Self::DuplicateProduct(product) => write!(f, "product {product} already exists"),
            Self::OrderMismatch { product, reason } => {
                write!(f, "rejected layer order for product {product}: {reason}")
            }
            Self::UnknownLayer { product, layer } => {
                write!(f, "layer {layer} is not part of product {product}")
            }
            Self::DuplicateLayer { product, layer } => {
                write!(f, "layer {layer} is already part of product {product}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Sink for layer actions.
pub trait LayerDispatch {
    /// Apply one action.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the action is rejected; state is then
    /// unchanged.
    fn dispatch(&self, action: LayerAction) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// LayerStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ProductLayers {
    order: Observable<LayerOrder>,
    config: Observable<LayerConfigMap>,
}

/// In-process layer store.
///
/// Cloning a `LayerStore` creates another handle to the same products.
#[derive(Debug, Clone, Default)]
pub struct LayerStore {
    products: Rc<RefCell<HashMap<ProductId, ProductLayers>>>,
}

fn duplicate_in(ids: &[LayerId]) -> Option<&LayerId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().find(|id| !seen.insert(*id))
}

fn check_permutation(current: &[LayerId], proposed: &[LayerId]) -> Result<(), String> {
    if current.len() != proposed.len() {
        return Err(format!(
            "expected {} layers, got {}",
            current.len(),
            proposed.len()
        ));
    }
    if let Some(id) = duplicate_in(proposed) {
        return Err(format!("layer {id} listed twice"));
    }
    let known: HashSet<&LayerId> = current.iter().collect();
    if let Some(id) = proposed.iter().find(|id| !known.contains(id)) {
        return Err(format!("layer {id} is not part of the product"));
    }
    Ok(())
}

impl LayerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product with its default layer order (top-most first).
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateProduct`] if the product exists,
    /// [`StoreError::DuplicateLayer`] if the order lists a layer twice.
    pub fn create_product(
        &self,
        product: ProductId,
        default_order: Vec<LayerId>,
    ) -> Result<(), StoreError> {
        if let Some(layer) = duplicate_in(&default_order) {
            return Err(StoreError::DuplicateLayer {
                product,
                layer: layer.clone(),
            });
        }
        let mut products = self.products.borrow_mut();
        if products.contains_key(&product) {
            return Err(StoreError::DuplicateProduct(product));
        }
        debug!(product = %product, layers = default_order.len(), "product created");
        products.insert(
            product,
            ProductLayers {
                order: Observable::new(LayerOrder::new(default_order)),
                config: Observable::new(LayerConfigMap::new()),
            },
        );
        Ok(())
    }

    /// Forget a product. Returns whether it existed.
    pub fn remove_product(&self, product: &ProductId) -> bool {
        self.products.borrow_mut().remove(product).is_some()
    }

    /// Observable order of a product.
    #[must_use]
    pub fn layer_order(&self, product: &ProductId) -> Option<Observable<LayerOrder>> {
        self.products
            .borrow()
            .get(product)
            .map(|layers| layers.order.clone())
    }

    /// Observable layer config map of a product.
    #[must_use]
    pub fn layers_config(&self, product: &ProductId) -> Option<Observable<LayerConfigMap>> {
        self.products
            .borrow()
            .get(product)
            .map(|layers| layers.config.clone())
    }

    /// Snapshot of a product's current order ids.
    #[must_use]
    pub fn current_order(&self, product: &ProductId) -> Option<Vec<LayerId>> {
        self.layer_order(product)
            .map(|order| order.with(|order| order.ids.clone()))
    }

    fn product(&self, product: &ProductId) -> Result<ProductLayers, StoreError> {
        self.products
            .borrow()
            .get(product)
            .cloned()
            .ok_or_else(|| StoreError::UnknownProduct(product.clone()))
    }

    fn apply(&self, action: LayerAction) -> Result<(), StoreError> {
        match action {
            LayerAction::SetLayerOrder { product, order } => {
                let layers = self.product(&product)?;
                let current = layers.order.get();
                check_permutation(current.ids(), &order)
                    .map_err(|reason| StoreError::OrderMismatch { product, reason })?;
                layers.order.set(current.next(order));
            }
            LayerAction::UpdateLayerConfig {
                product,
                layer,
                config,
            } => {
                let layers = self.product(&product)?;
                if !layers.order.with(|order| order.ids.contains(&layer)) {
                    return Err(StoreError::UnknownLayer { product, layer });
                }
                layers.config.update(|map| {
                    let merged = map.get(&layer).copied().unwrap_or_default().merge(config);
                    map.insert(layer, merged);
                });
            }
            LayerAction::AddLayer { product, layer } => {
                let layers = self.product(&product)?;
                let current = layers.order.get();
                if current.ids.contains(&layer) {
                    return Err(StoreError::DuplicateLayer { product, layer });
                }
                let mut ids = Vec::with_capacity(current.len() + 1);
                ids.push(layer);
                ids.extend_from_slice(current.ids());
                layers.order.set(current.next(ids));
            }
            LayerAction::RemoveLayer { product, layer } => {
                let layers = self.product(&product)?;
                let current = layers.order.get();
                if !current.ids.contains(&layer) {
                    return Err(StoreError::UnknownLayer { product, layer });
                }
                let ids = current.ids.iter().filter(|id| **id != layer).cloned().collect();
                layers.config.update(|map| {
                    map.remove(&layer);
                });
                layers.order.set(current.next(ids));
            }
        }
        Ok(())
    }
}

impl LayerDispatch for LayerStore {
    fn dispatch(&self, action: LayerAction) -> Result<(), StoreError> {
        let name = action.name();
        let product = action.product().clone();
        debug!(product = %product, action = name, "dispatch");
        self.apply(action).inspect_err(|err| {
            warn!(product = %product, action = name, error = %err, "dispatch rejected");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ids(list: &[&str]) -> Vec<LayerId> {
        list.iter().map(|&s| LayerId::from(s)).collect()
    }

    fn store_with(product: &str, order: &[&str]) -> (LayerStore, ProductId) {
        let store = LayerStore::new();
        let product = ProductId::from(product);
        store.create_product(product.clone(), ids(order)).unwrap();
        (store, product)
    }

    #[test]
    fn create_product_exposes_default_order() {
        let (store, product) = store_with("map-1", &["shapes", "roads", "base"]);
        let order = store.layer_order(&product).unwrap().get();
        assert_eq!(order.ids(), ids(&["shapes", "roads", "base"]).as_slice());
        assert_eq!(order.revision(), 0);
    }

    #[test]
    fn duplicate_product_and_layers_are_rejected() {
        let (store, product) = store_with("map-1", &["a"]);
        assert_eq!(
            store.create_product(product.clone(), ids(&["b"])),
            Err(StoreError::DuplicateProduct(product))
        );
        assert_eq!(
            store.create_product(ProductId::from("map-2"), ids(&["a", "a"])),
            Err(StoreError::DuplicateLayer {
                product: ProductId::from("map-2"),
                layer: LayerId::from("a")
            })
        );
    }

    #[test]
    fn set_layer_order_bumps_revision() {
        let (store, product) = store_with("map-1", &["a", "b", "c"]);
        store
            .dispatch(LayerAction::SetLayerOrder {
                product: product.clone(),
                order: ids(&["c", "a", "b"]),
            })
            .unwrap();
        let order = store.layer_order(&product).unwrap().get();
        assert_eq!(order.ids(), ids(&["c", "a", "b"]).as_slice());
        assert_eq!(order.revision(), 1);
    }

    #[test]
    fn unchanged_order_still_notifies() {
        let (store, product) = store_with("map-1", &["a", "b"]);
        let hits = Rc::new(Cell::new(0u32));
        let hits_clone = Rc::clone(&hits);
        let _sub = store
            .layer_order(&product)
            .unwrap()
            .subscribe(move |_| hits_clone.set(hits_clone.get() + 1));
        store
            .dispatch(LayerAction::SetLayerOrder {
                product,
                order: ids(&["a", "b"]),
            })
            .unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn non_permutation_is_rejected() {
        let (store, product) = store_with("map-1", &["a", "b", "c"]);
        for bad in [&["a", "b"][..], &["a", "b", "b"][..], &["a", "b", "z"][..]] {
            let result = store.dispatch(LayerAction::SetLayerOrder {
                product: product.clone(),
                order: ids(bad),
            });
            assert!(
                matches!(result, Err(StoreError::OrderMismatch { .. })),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(store.layer_order(&product).unwrap().version(), 0);
    }

    #[test]
    fn unknown_product_is_rejected() {
        let store = LayerStore::new();
        let result = store.dispatch(LayerAction::SetLayerOrder {
            product: ProductId::from("ghost"),
            order: vec![],
        });
        assert_eq!(result, Err(StoreError::UnknownProduct(ProductId::from("ghost"))));
    }

    #[test]
    fn config_update_merges_and_keeps_order() {
        let (store, product) = store_with("map-1", &["a", "b"]);
        let order = store.layer_order(&product).unwrap();
        store
            .dispatch(LayerAction::UpdateLayerConfig {
                product: product.clone(),
                layer: LayerId::from("a"),
                config: LayerConfig::opacity(0.5),
            })
            .unwrap();
        store
            .dispatch(LayerAction::UpdateLayerConfig {
                product: product.clone(),
                layer: LayerId::from("a"),
                config: LayerConfig::visibility(false),
            })
            .unwrap();
        let config = store.layers_config(&product).unwrap().get();
        assert_eq!(
            config.get(&LayerId::from("a")),
            Some(&LayerConfig {
                visible: Some(false),
                opacity: Some(0.5)
            })
        );
        assert_eq!(order.version(), 0);
        assert_eq!(order.get().ids(), ids(&["a", "b"]).as_slice());
    }

    #[test]
    fn config_for_unknown_layer_is_rejected() {
        let (store, product) = store_with("map-1", &["a"]);
        let result = store.dispatch(LayerAction::UpdateLayerConfig {
            product: product.clone(),
            layer: LayerId::from("z"),
            config: LayerConfig::visibility(true),
        });
        assert_eq!(
            result,
            Err(StoreError::UnknownLayer {
                product,
                layer: LayerId::from("z")
            })
        );
    }

    #[test]
    fn add_and_remove_layer() {
        let (store, product) = store_with("map-1", &["a", "base"]);
        store
            .dispatch(LayerAction::AddLayer {
                product: product.clone(),
                layer: LayerId::from("new"),
            })
            .unwrap();
        assert_eq!(
            store.current_order(&product).unwrap(),
            ids(&["new", "a", "base"])
        );
        store
            .dispatch(LayerAction::UpdateLayerConfig {
                product: product.clone(),
                layer: LayerId::from("a"),
                config: LayerConfig::visibility(false),
            })
            .unwrap();
        store
            .dispatch(LayerAction::RemoveLayer {
                product: product.clone(),
                layer: LayerId::from("a"),
            })
            .unwrap();
        assert_eq!(store.current_order(&product).unwrap(), ids(&["new", "base"]));
        assert!(store.layers_config(&product).unwrap().get().is_empty());
        assert!(matches!(
            store.dispatch(LayerAction::AddLayer {
                product,
                layer: LayerId::from("base"),
            }),
            Err(StoreError::DuplicateLayer { .. })
        ));
    }

    #[test]
    fn subscriber_can_dispatch_again() {
        let (store, product) = store_with("map-1", &["a", "b"]);
        let inner = store.clone();
        let target = product.clone();
        let _sub = store.layer_order(&product).unwrap().subscribe(move |order| {
            if order.revision() == 1 {
                inner
                    .dispatch(LayerAction::SetLayerOrder {
                        product: target.clone(),
                        order: ids(&["a", "b"]),
                    })
                    .unwrap();
            }
        });
        store
            .dispatch(LayerAction::SetLayerOrder {
                product: product.clone(),
                order: ids(&["b", "a"]),
            })
            .unwrap();
        let order = store.layer_order(&product).unwrap().get();
        assert_eq!(order.revision(), 2);
        assert_eq!(order.ids(), ids(&["a", "b"]).as_slice());
    }

    #[test]
    fn remove_product() {
        let (store, product) = store_with("map-1", &["a"]);
        assert!(store.remove_product(&product));
        assert!(!store.remove_product(&product));
        assert!(store.layer_order(&product).is_none());
    }

    #[test]
    fn config_merge_prefers_update() {
        let base = LayerConfig {
            visible: Some(true),
            opacity: Some(0.3),
        };
        let merged = base.merge(LayerConfig::visibility(false));
        assert_eq!(merged.visible, Some(false));
        assert_eq!(merged.opacity, Some(0.3));
    }
}
