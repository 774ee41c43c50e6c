use proptest::prelude::*;
use ysqlite_core::{apply_update, apply_update_gc, diff_update, encode_state_vector, map_json};
use ysqlite_test_support::{Client, MAP_ROOT};
use yrs::Any;

fn visible(update: &[u8]) -> serde_json::Value {
    serde_json::from_str(&map_json(update, MAP_ROOT).unwrap()).unwrap()
}

fn edits() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::vec(("[a-d]", 0i64..100), 1..6)
}

proptest! {
    #[test]
    fn merge_order_does_not_change_visible_content(
        base in edits(),
        left in edits(),
        right in edits(),
    ) {
        let origin = Client::new(1);
        for (k, v) in &base {
            origin.set(k, Any::BigInt(*v));
        }
        let stored = origin.update();

        // Two replicas editing concurrently from the same starting point.
        let a = Client::from_update(2, &stored);
        for (k, v) in &left {
            a.set(k, Any::BigInt(*v));
        }
        let b = Client::from_update(3, &stored);
        for (k, v) in &right {
            b.set(k, Any::BigInt(*v));
        }
        let (ua, ub) = (a.update(), b.update());

        let ab = apply_update(&apply_update(&stored, &ua).unwrap(), &ub).unwrap();
        let ba = apply_update(&apply_update(&stored, &ub).unwrap(), &ua).unwrap();
        prop_assert_eq!(visible(&ab), visible(&ba));

        let ab_gc = apply_update_gc(&apply_update_gc(&stored, &ua).unwrap(), &ub).unwrap();
        let ba_gc = apply_update_gc(&apply_update_gc(&stored, &ub).unwrap(), &ua).unwrap();
        prop_assert_eq!(visible(&ab_gc), visible(&ba_gc));
        prop_assert_eq!(visible(&ab_gc), visible(&ab));
    }

    #[test]
    fn diff_from_state_vector_reproduces_later_content(
        first in edits(),
        later in edits(),
    ) {
        let client = Client::new(5);
        for (k, v) in &first {
            client.set(k, Any::BigInt(*v));
        }
        let older = client.update();
        for (k, v) in &later {
            client.set(k, Any::BigInt(*v));
        }
        let newer = client.update();

        let sv = encode_state_vector(&older).unwrap();
        let diff = diff_update(&newer, &sv).unwrap();
        prop_assert_eq!(visible(&apply_update(&older, &diff).unwrap()), visible(&newer));
    }
}
