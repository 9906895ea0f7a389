//! Join-key encoding.
//!
//! Key-based join strategies (hash join, sort-merge join) need each row's
//! join columns as a byte string that is equal for equal values and, within
//! one type, sorts like the values it encodes.
//!
//! - [`KeyEncoder`] - Append the key encoding of a value to a buffer
//! - [`decode_key`] / [`decode_key_with_len`] - Read values back out of a key
//!
//! # Example
//!
//! ```
//! use conjoin_core::encoding::{decode_key_with_len, KeyEncoder};
//! use conjoin_core::Value;
//!
//! // A composite key for two join columns
//! let mut key = Vec::new();
//! Value::Int(7).encode_key_to(&mut key).unwrap();
//! Value::from("x").encode_key_to(&mut key).unwrap();
//!
//! let (first, used) = decode_key_with_len(&key).unwrap();
//! let (second, _) = decode_key_with_len(&key[used..]).unwrap();
//! assert_eq!(first, Value::Int(7));
//! assert_eq!(second, Value::from("x"));
//! ```

mod key;
mod traits;

#[cfg(test)]
mod proptest_tests;

pub use key::{decode_key, decode_key_with_len, tags};
pub use traits::KeyEncoder;
