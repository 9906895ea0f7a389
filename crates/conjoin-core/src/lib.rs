//! `conjoin` Core
//!
//! This crate provides the primitive types shared by the join predicate
//! subsystem: the datum a row is made of, the column types a planner resolves,
//! and the order-preserving byte encoding used for join keys.
//!
//! # Overview
//!
//! - **Values**: [`Value`] is one datum of a row; [`Value::Null`] is the single null marker
//! - **Types**: [`DataType`] is the resolved type of a column or expression
//! - **Key encoding**: [`KeyEncoder`] appends comparable, hashable bytes for a value
//!
//! # Example
//!
//! ```
//! use conjoin_core::{KeyEncoder, Value};
//!
//! let mut key = Vec::new();
//! Value::Int(1).encode_key_to(&mut key).unwrap();
//! Value::from("a").encode_key_to(&mut key).unwrap();
//!
//! let mut other = Vec::new();
//! Value::Int(2).encode_key_to(&mut other).unwrap();
//! assert!(key < other);
//! ```
//!
//! # Modules
//!
//! - [`types`] - Datum and type definitions ([`Value`], [`DataType`])
//! - [`encoding`] - Join-key encoding ([`KeyEncoder`])
//! - [`error`] - Error types ([`CoreError`])

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod encoding;
pub mod error;
pub mod types;

pub use encoding::{decode_key, decode_key_with_len, KeyEncoder};
pub use error::CoreError;
pub use types::{DataType, Value};
