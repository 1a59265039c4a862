//! Property-Based Tests for the Priority Store
//!
//! # Test Properties
//!
//! 1. **Capacity**: total weight never exceeds capacity, whatever the
//!    sequence of operations
//! 2. **Accounting**: reported weight equals the sum of cached entries
//! 3. **Resize Idempotence**: applying the same capacity twice changes nothing

#![cfg(test)]

use proptest::prelude::*;

use super::store::{Classification, PriorityCache, PriorityStore};

/// One store operation
#[derive(Debug, Clone)]
enum Op {
    Put(u8, u64),
    Classify(u8),
    Discard,
    Resize(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..32, 0u64..40).prop_map(|(id, weight)| Op::Put(id, weight)),
        3 => (0u8..32).prop_map(Op::Classify),
        1 => Just(Op::Discard),
        1 => (0u64..120).prop_map(Op::Resize),
    ]
}

fn apply(store: &mut PriorityCache<u8, u64, u64>, op: &Op) {
    match *op {
        Op::Put(id, weight) => {
            store.insert(id, weight, weight);
        }
        Op::Classify(id) => {
            store.classify(&id);
        }
        Op::Discard => store.discard_pending(),
        Op::Resize(capacity) => store.set_capacity(capacity),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_weight_never_exceeds_capacity(
        capacity in 1u64..100,
        ops in prop::collection::vec(op_strategy(), 1..200),
    ) {
        let mut store = PriorityCache::new(capacity);
        for op in &ops {
            apply(&mut store, op);
            prop_assert!(store.current_weight() <= store.capacity());
            prop_assert!(store.hot_weight() <= store.current_weight());
        }
    }

    #[test]
    fn prop_weight_matches_entries(
        capacity in 1u64..100,
        ops in prop::collection::vec(op_strategy(), 1..200),
    ) {
        let mut store = PriorityCache::new(capacity);
        for op in &ops {
            apply(&mut store, op);
        }

        // payload mirrors the weight
        let keys = store.keys();
        let total: u64 = keys.iter().filter_map(|id| store.lookup(id)).sum();
        prop_assert_eq!(total, store.current_weight());
        prop_assert_eq!(keys.len(), store.len());
    }

    #[test]
    fn prop_resize_is_idempotent(
        capacity in 1u64..100,
        resize in 0u64..100,
        ops in prop::collection::vec(op_strategy(), 1..100),
    ) {
        let mut store = PriorityCache::new(capacity);
        for op in &ops {
            apply(&mut store, op);
        }

        store.set_capacity(resize);
        let keys = store.keys();
        let weight = store.current_weight();

        store.set_capacity(resize);
        prop_assert_eq!(store.keys(), keys);
        prop_assert_eq!(store.current_weight(), weight);
    }

    #[test]
    fn prop_cached_units_are_never_ready(
        ids in prop::collection::vec(0u8..16, 1..50),
    ) {
        let mut store = PriorityCache::new(1000u64);
        for id in &ids {
            store.insert(*id, 1, 1);
        }
        for id in &ids {
            prop_assert_eq!(store.classify(id), Classification::Skip);
        }
    }
}
