#![forbid(unsafe_code)]

//! Layer identifiers and the map-layer handle contract.
//!
//! The map rendering surface owns its layers. The panel only sees them
//! through [`MapLayer`], a handle with interior mutability: setters take
//! `&self` so that the same handle can be held by the surface and by the
//! panel at once.
//!
//! # Ordering conventions
//!
//! - [`MapSurface::layers`] returns layers in **render order**: the bottom-most
//!   layer (drawn first) comes first.
//! - Layer panels and the layer store use **display order**: the top-most
//!   layer comes first. [`MapSurface::display_order`] converts between the two.
//! - The bottom-most layer is the base layer. It is shown in its own
//!   unsortable section and is never part of the visible subset.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifier of one layer, unique within a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(String);

impl LayerId {
    /// Create a layer identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for LayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::borrow::Borrow<str> for LayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LayerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of one map product. Each product owns one layer order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Layer metadata
// ---------------------------------------------------------------------------

/// Coarse state reported by a layer's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerStatusKind {
    /// Informational message, layer is usable.
    Info,
    /// Source is still loading.
    Loading,
    /// Source failed; the layer cannot be toggled.
    Error,
}

/// Status attached to a layer by its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerStatus {
    /// Kind of status.
    pub kind: LayerStatusKind,
    /// Optional human-readable message, shown as the row subtitle.
    pub message: Option<String>,
}

impl LayerStatus {
    /// Informational status with a message.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: LayerStatusKind::Info,
            message: Some(message.into()),
        }
    }

    /// Loading status without a message.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            kind: LayerStatusKind::Loading,
            message: None,
        }
    }

    /// Error status with a message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: LayerStatusKind::Error,
            message: Some(message.into()),
        }
    }

    /// Whether this status marks the layer as failed.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == LayerStatusKind::Error
    }
}

/// Reference to the graph element a layer was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    /// Element identifier.
    pub id: String,
    /// Element title, if the element has one.
    pub title: Option<String>,
}

impl ElementRef {
    /// Create an element reference.
    #[must_use]
    pub fn new(id: impl Into<String>, title: Option<String>) -> Self {
        Self {
            id: id.into(),
            title,
        }
    }

    /// Title to display for the element: its title, else its id.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// Descriptive properties of a layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerProperties {
    /// Explicit display label.
    pub label: Option<String>,
    /// Source element the layer was built from.
    pub element: Option<ElementRef>,
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Handle to one layer owned by the map rendering surface.
pub trait MapLayer {
    /// Layer identifier.
    fn id(&self) -> LayerId;

    /// Whether the layer is currently drawn.
    fn visible(&self) -> bool;

    /// Show or hide the layer.
    fn set_visible(&self, visible: bool);

    /// Current opacity in `[0, 1]`.
    fn opacity(&self) -> f32;

    /// Set the opacity. Implementations clamp to `[0, 1]`.
    fn set_opacity(&self, opacity: f32);

    /// Descriptive properties (label, source element).
    fn properties(&self) -> LayerProperties;

    /// Status reported by the layer's source, if any.
    fn status(&self) -> Option<LayerStatus>;
}

/// A map rendering surface exposing its layers.
pub trait MapSurface {
    /// Layer handle type.
    type Layer: MapLayer + Clone;

    /// Layers in render order (bottom-most first).
    fn layers(&self) -> Vec<Self::Layer>;

    /// Layer ids in display order (top-most first).
    fn display_order(&self) -> Vec<LayerId> {
        self.layers().iter().rev().map(MapLayer::id).collect()
    }

    /// Split the layers into the base layer and the sortable layers.
    ///
    /// The base layer is the bottom-most layer. Sortable layers are returned
    /// in display order.
    fn panel_layers(&self) -> (Option<Self::Layer>, Vec<Self::Layer>) {
        let mut layers = self.layers();
        if layers.is_empty() {
            return (None, layers);
        }
        let base = layers.remove(0);
        layers.reverse();
        (Some(base), layers)
    }
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct LayerState {
    visible: bool,
    opacity: f32,
    properties: LayerProperties,
    status: Option<LayerStatus>,
}

/// Reference-counted layer handle.
///
/// Clones share state: toggling one clone is observed by all of them.
#[derive(Debug, Clone)]
pub struct SharedLayer {
    id: LayerId,
    state: Rc<RefCell<LayerState>>,
}

impl SharedLayer {
    /// Create a visible, fully opaque layer with no properties.
    #[must_use]
    pub fn new(id: impl Into<LayerId>) -> Self {
        Self {
            id: id.into(),
            state: Rc::new(RefCell::new(LayerState {
                visible: true,
                opacity: 1.0,
                properties: LayerProperties::default(),
                status: None,
            })),
        }
    }

    /// Set the display label.
    #[must_use]
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.state.borrow_mut().properties.label = Some(label.into());
        self
    }

    /// Set the source element.
    #[must_use]
    pub fn with_element(self, element: ElementRef) -> Self {
        self.state.borrow_mut().properties.element = Some(element);
        self
    }

    /// Set the initial visibility.
    #[must_use]
    pub fn with_visible(self, visible: bool) -> Self {
        self.state.borrow_mut().visible = visible;
        self
    }

    /// Set the initial status.
    #[must_use]
    pub fn with_status(self, status: LayerStatus) -> Self {
        self.state.borrow_mut().status = Some(status);
        self
    }

    /// Replace the status reported by the source.
    pub fn set_status(&self, status: Option<LayerStatus>) {
        self.state.borrow_mut().status = status;
    }

    /// Whether two handles refer to the same layer state.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl MapLayer for SharedLayer {
    fn id(&self) -> LayerId {
        self.id.clone()
    }

    fn visible(&self) -> bool {
        self.state.borrow().visible
    }

    fn set_visible(&self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    fn opacity(&self) -> f32 {
        self.state.borrow().opacity
    }

    fn set_opacity(&self, opacity: f32) {
        if opacity.is_nan() {
            return;
        }
        self.state.borrow_mut().opacity = opacity.clamp(0.0, 1.0);
    }

    fn properties(&self) -> LayerProperties {
        self.state.borrow().properties.clone()
    }

    fn status(&self) -> Option<LayerStatus> {
        self.state.borrow().status.clone()
    }
}

/// In-memory layer stack in render order.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<SharedLayer>,
}

impl LayerStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack from layers given bottom-most first.
    #[must_use]
    pub fn from_render_order(layers: impl IntoIterator<Item = SharedLayer>) -> Self {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// Push a layer on top of the stack.
    pub fn push(&mut self, layer: SharedLayer) {
        self.layers.push(layer);
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Find a layer by id.
    #[must_use]
    pub fn get(&self, id: &LayerId) -> Option<&SharedLayer> {
        self.layers.iter().find(|layer| &layer.id == id)
    }

    /// Re-stack layers from a display order (top-most first).
    ///
    /// Ids that are not in the stack are ignored. Layers the order does not
    /// mention keep their relative order beneath the ordered ones.
    pub fn apply_display_order(&mut self, order: &[LayerId]) {
        let mut remaining: Vec<Option<SharedLayer>> = self.layers.drain(..).map(Some).collect();
        let mut top_first = Vec::with_capacity(order.len());
        for id in order {
            if let Some(slot) = remaining
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|layer| &layer.id == id))
            {
                top_first.extend(slot.take());
            }
        }
        let mut stack: Vec<SharedLayer> = remaining.into_iter().flatten().collect();
        stack.extend(top_first.into_iter().rev());
        self.layers = stack;
    }
}

impl MapSurface for LayerStack {
    type Layer = SharedLayer;

    fn layers(&self) -> Vec<SharedLayer> {
        self.layers.clone()
    }
}
