#![forbid(unsafe_code)]
#![cfg(feature = "tracing")]

//! Log events of the layer panel, captured through a registry layer.
//!
//! Run:
//!   cargo test -p maplayers-widgets --features tracing --test tracing_tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use maplayers_core::{LayerId, LayerStack, MapSurface, PointerInput, ProductId, SharedLayer};
use maplayers_runtime::{LayerAction, LayerDispatch, LayerStore, StoreError};
use maplayers_widgets::{MapLayers, MapLayersProps, ProductHandles};
use tracing_subscriber::layer::SubscriberExt;
use web_time::Instant;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
    fields: HashMap<String, String>,
}

struct EventCapture(Arc<Mutex<Vec<CapturedEvent>>>);

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned().unwrap_or_default();
        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            fields,
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(EventCapture(Arc::clone(&events)));
    tracing::subscriber::with_default(subscriber, f);
    events.lock().unwrap().clone()
}

fn panel_over<D: LayerDispatch>(store: &LayerStore, dispatcher: D) -> MapLayers<SharedLayer, D> {
    let stack = LayerStack::from_render_order(
        ["base", "a", "b", "c"].into_iter().map(SharedLayer::new),
    );
    let product = ProductId::from("map-1");
    store
        .create_product(product.clone(), stack.display_order())
        .unwrap();
    let handles = ProductHandles::from_store(store, &product).unwrap();
    MapLayers::new(MapLayersProps::from_surface(&stack, true), handles, dispatcher)
}

fn find<'a>(events: &'a [CapturedEvent], message: &str) -> Option<&'a CapturedEvent> {
    events.iter().find(|e| e.message == message)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn drag_logs_start_and_reconciled_move() {
    let events = with_captured_events(|| {
        let store = LayerStore::new();
        let mut panel = panel_over(&store, store.clone());
        let now = Instant::now();
        panel.handle_pointer(PointerInput::Down { y: 5 }, now);
        panel.handle_pointer(PointerInput::Move { y: 90 }, now);
        panel.handle_pointer(PointerInput::Up { y: 90 }, now);
    });

    let start = find(&events, "layer sort started").expect("sort start event");
    assert_eq!(start.level, tracing::Level::DEBUG);
    assert_eq!(start.fields["product"], "map-1");
    assert_eq!(start.fields["dropped_pending"], "false");

    let reconciled = find(&events, "reconciled layer move").expect("reconcile event");
    assert_eq!(reconciled.target, "maplayers_core::reorder");
    assert_eq!(reconciled.fields["layer"], "c");
    assert_eq!(reconciled.fields["target_index"], "2");

    assert!(find(&events, "layer move confirmed by store").is_some());
}

#[test]
fn toggle_logs_visibility() {
    let events = with_captured_events(|| {
        let store = LayerStore::new();
        let mut panel = panel_over(&store, store.clone());
        panel.on_toggle_layer(&LayerId::from("b")).unwrap();
    });

    let toggled = find(&events, "layer toggled").expect("toggle event");
    assert_eq!(toggled.fields["layer"], "b");
    assert_eq!(toggled.fields["visible"], "false");
}

#[test]
fn failed_drag_logs_warning() {
    struct Rejecting;
    impl LayerDispatch for Rejecting {
        fn dispatch(&self, action: LayerAction) -> Result<(), StoreError> {
            Err(StoreError::UnknownProduct(action.product().clone()))
        }
    }

    let events = with_captured_events(|| {
        let store = LayerStore::new();
        let mut panel = panel_over(&store, Rejecting);
        let now = Instant::now();
        panel.handle_pointer(PointerInput::Down { y: 5 }, now);
        panel.handle_pointer(PointerInput::Move { y: 90 }, now);
        panel.handle_pointer(PointerInput::Up { y: 90 }, now);
        assert_eq!(panel.pending(), None);
    });

    let warning = find(&events, "layer reorder failed").expect("warning event");
    assert_eq!(warning.level, tracing::Level::WARN);
    assert!(warning.fields["error"].contains("unknown product map-1"));
}
