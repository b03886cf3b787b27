//! Property-based invariant tests for layer order reconciliation.
//!
//! 1. The result is a permutation of the authoritative order.
//! 2. `from == to` is the identity.
//! 3. Visible ids land in the order of the moved subset.
//! 4. Ids outside the visible subset keep their relative order.
//! 5. A move followed by its inverse restores the original order.
//! 6. Out-of-range indices are always rejected, never panic.

use std::collections::BTreeSet;

use maplayers_core::{IndexMove, LayerId, ReorderError, moved, reconcile_order};
use proptest::prelude::*;
use proptest::sample::Index;

// ── Helpers ─────────────────────────────────────────────────────────────

/// A shuffled authoritative order and an order-consistent visible subset of
/// at least two ids.
fn order_and_subset() -> impl Strategy<Value = (Vec<LayerId>, Vec<LayerId>)> {
    (2usize..=12)
        .prop_flat_map(|n| {
            let ids: Vec<LayerId> = (0..n).map(|i| LayerId::new(format!("layer-{i}"))).collect();
            (
                Just(ids).prop_shuffle(),
                proptest::collection::vec(any::<bool>(), n),
                any::<Index>(),
                any::<Index>(),
            )
        })
        .prop_map(|(full, mask, a, b)| {
            let mut keep = mask;
            // Guarantee at least two visible ids.
            let first = a.index(full.len());
            let mut second = b.index(full.len());
            if second == first {
                second = (first + 1) % full.len();
            }
            keep[first] = true;
            keep[second] = true;
            let visible = full
                .iter()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|(id, _)| id.clone())
                .collect();
            (full, visible)
        })
}

fn subsequence_of(order: &[LayerId], wanted: &BTreeSet<&LayerId>) -> Vec<LayerId> {
    order.iter().filter(|id| wanted.contains(id)).cloned().collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Permutation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn result_is_permutation(
        (full, visible) in order_and_subset(),
        from in any::<Index>(),
        to in any::<Index>(),
    ) {
        let mv = IndexMove::new(from.index(visible.len()), to.index(visible.len()));
        let out = reconcile_order(&visible, &full, mv).unwrap();

        prop_assert_eq!(out.len(), full.len());
        let before: BTreeSet<&LayerId> = full.iter().collect();
        let after: BTreeSet<&LayerId> = out.iter().collect();
        prop_assert_eq!(before, after, "ids lost or duplicated for {:?}", mv);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Identity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn same_index_is_identity(
        (full, visible) in order_and_subset(),
        at in any::<Index>(),
    ) {
        let i = at.index(visible.len());
        let out = reconcile_order(&visible, &full, IndexMove::new(i, i)).unwrap();
        prop_assert_eq!(out, full);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3 + 4. Visible ids follow the moved subset, hidden ids stay put
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn visible_ids_follow_moved_subset(
        (full, visible) in order_and_subset(),
        from in any::<Index>(),
        to in any::<Index>(),
    ) {
        let mv = IndexMove::new(from.index(visible.len()), to.index(visible.len()));
        let out = reconcile_order(&visible, &full, mv).unwrap();

        let visible_set: BTreeSet<&LayerId> = visible.iter().collect();
        prop_assert_eq!(
            subsequence_of(&out, &visible_set),
            moved(&visible, mv.from, mv.to),
            "visible subset out of order after {:?}", mv
        );

        let hidden: BTreeSet<&LayerId> =
            full.iter().filter(|id| !visible_set.contains(id)).collect();
        prop_assert_eq!(
            subsequence_of(&out, &hidden),
            subsequence_of(&full, &hidden),
            "hidden layers reordered by {:?}", mv
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Inverse move restores the visible subset order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn inverse_move_restores_visible_order(
        (full, visible) in order_and_subset(),
        from in any::<Index>(),
        to in any::<Index>(),
    ) {
        let mv = IndexMove::new(from.index(visible.len()), to.index(visible.len()));
        let once = reconcile_order(&visible, &full, mv).unwrap();
        let visible_after = moved(&visible, mv.from, mv.to);
        let back = reconcile_order(&visible_after, &once, IndexMove::new(mv.to, mv.from)).unwrap();

        let visible_set: BTreeSet<&LayerId> = visible.iter().collect();
        prop_assert_eq!(subsequence_of(&back, &visible_set), visible);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Out-of-range rejection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn out_of_range_is_error(
        (full, visible) in order_and_subset(),
        extra in 0usize..5,
        at in any::<Index>(),
    ) {
        let bad = visible.len() + extra;
        let ok = at.index(visible.len());
        let result = reconcile_order(&visible, &full, IndexMove::new(ok, bad));
        prop_assert_eq!(
            result,
            Err(ReorderError::IndexOutOfRange { index: bad, len: visible.len() })
        );
    }
}
