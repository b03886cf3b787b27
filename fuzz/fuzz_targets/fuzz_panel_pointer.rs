#![no_main]

use maplayers_core::{LayerId, LayerStack, MapSurface, PointerInput, ProductId, SharedLayer};
use maplayers_runtime::LayerStore;
use maplayers_widgets::{MapLayers, MapLayersProps, ProductHandles};
use libfuzzer_sys::fuzz_target;
use web_time::Instant;

fuzz_target!(|data: &[u8]| {
    let Some((&count, ops)) = data.split_first() else {
        return;
    };
    let count = usize::from(count % 12) + 1;
    let stack = LayerStack::from_render_order((0..count).map(|i| SharedLayer::new(format!("l{i}"))));
    let store = LayerStore::new();
    let product = ProductId::from("fuzz");
    if store.create_product(product.clone(), stack.display_order()).is_err() {
        return;
    }
    let Ok(handles) = ProductHandles::from_store(&store, &product) else {
        return;
    };
    let mut panel = MapLayers::new(MapLayersProps::from_surface(&stack, true), handles, store.clone());

    let now = Instant::now();
    for pair in ops.chunks_exact(2).take(512) {
        let y = i32::from(pair[1] as i8) * 4;
        let input = match pair[0] % 5 {
            0 => PointerInput::Down { y },
            1 | 2 => PointerInput::Move { y },
            3 => PointerInput::Up { y },
            _ => PointerInput::Cancel,
        };
        panel.handle_pointer(input, now);
        let _ = panel.view();
    }

    let Some(order) = store.current_order(&product) else {
        panic!("product vanished");
    };
    assert_eq!(order.len(), count);
    assert_eq!(order.last(), Some(&LayerId::from("l0")), "base layer moved");
});
