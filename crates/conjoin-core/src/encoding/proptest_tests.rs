//! Property-based tests for key encoding.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use proptest::prelude::*;

use crate::encoding::{decode_key_with_len, KeyEncoder};
use crate::types::Value;

/// Strategy for values that have a key encoding.
fn arb_key_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<f64>().prop_filter("not NaN", |f| !f.is_nan()).prop_map(Value::Float),
        ".*".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::Bytes),
    ]
}

proptest! {
    #[test]
    fn int_keys_order_like_ints(a in any::<i64>(), b in any::<i64>()) {
        let ka = Value::Int(a).encode_key().unwrap();
        let kb = Value::Int(b).encode_key().unwrap();
        prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
    }

    #[test]
    fn float_keys_order_like_floats(
        a in any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
        b in any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
    ) {
        let ka = Value::Float(a).encode_key().unwrap();
        let kb = Value::Float(b).encode_key().unwrap();
        prop_assert_eq!(a.partial_cmp(&b).unwrap(), ka.cmp(&kb));
    }

    #[test]
    fn string_keys_order_like_strings(a in ".*", b in ".*") {
        let ka = Value::String(a.clone()).encode_key().unwrap();
        let kb = Value::String(b.clone()).encode_key().unwrap();
        prop_assert_eq!(a.as_bytes().cmp(b.as_bytes()), ka.cmp(&kb));
    }

    #[test]
    fn composite_keys_split_back(values in prop::collection::vec(arb_key_value(), 1..6)) {
        let mut key = Vec::new();
        for v in &values {
            v.encode_key_to(&mut key).unwrap();
        }

        let mut offset = 0;
        for expected in &values {
            let (decoded, used) = decode_key_with_len(&key[offset..]).unwrap();
            match (expected, &decoded) {
                // -0.0 comes back as 0.0
                (Value::Float(a), Value::Float(b)) => prop_assert!(a == b),
                _ => prop_assert_eq!(expected, &decoded),
            }
            offset += used;
        }
        prop_assert_eq!(offset, key.len());
    }
}
