#![no_main]

use maplayers_core::{IndexMove, LayerId, moved, reconcile_order};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Layout: [len, from, to, mask...]. The mask picks the visible subset.
    if data.len() < 3 {
        return;
    }
    let len = usize::from(data[0] % 24) + 1;
    let authoritative: Vec<LayerId> = (0..len).map(|i| LayerId::new(format!("l{i}"))).collect();
    let mask = &data[3..];
    let visible: Vec<LayerId> = authoritative
        .iter()
        .enumerate()
        .filter(|(i, _)| mask.get(*i).is_none_or(|b| b & 1 == 1))
        .map(|(_, id)| id.clone())
        .collect();
    if visible.is_empty() {
        return;
    }
    let from = usize::from(data[1]) % (visible.len() + 1);
    let to = usize::from(data[2]) % (visible.len() + 1);
    let mv = IndexMove::new(from, to);

    let Ok(order) = reconcile_order(&visible, &authoritative, mv) else {
        assert!(from >= visible.len() || to >= visible.len(), "in-range move rejected");
        return;
    };

    // Always a permutation.
    let mut sorted = order.clone();
    sorted.sort();
    let mut expected = authoritative.clone();
    expected.sort();
    assert_eq!(sorted, expected, "not a permutation");

    // Visible layers appear in their moved order.
    let projected: Vec<LayerId> = order.iter().filter(|id| visible.contains(id)).cloned().collect();
    assert_eq!(projected, moved(&visible, from, to), "visible projection mismatch");

    // Hidden layers keep their relative order.
    let hidden = |ids: &[LayerId]| -> Vec<LayerId> {
        ids.iter().filter(|id| !visible.contains(id)).cloned().collect()
    };
    assert_eq!(hidden(&order), hidden(&authoritative), "hidden layers reordered");
});
