//! Datums that make up a row.
//!
//! This module provides the [`Value`] enum, one typed cell of a row flowing
//! into a join.
//!
//! # Example
//!
//! ```
//! use conjoin_core::Value;
//!
//! let id: Value = 30i64.into();
//! let name: Value = "Alice".into();
//!
//! assert_eq!(id.as_int(), Some(30));
//! assert_eq!(name.as_str(), Some("Alice"));
//! assert!(Value::Null.is_null());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DataType;

/// One datum of a row.
///
/// | Variant | Rust Type | SQL type |
/// |---------|-----------|----------|
/// | `Null` | - | the null marker, any column |
/// | `Bool` | `bool` | `BOOL` |
/// | `Int` | `i64` | `INT` |
/// | `Float` | `f64` | `FLOAT` |
/// | `String` | `String` | `TEXT` |
/// | `Bytes` | `Vec<u8>` | `BYTES` |
/// | `Array` | `Vec<Value>` | `T[]` |
///
/// `Null` is the one distinguished null marker. Code that needs to know
/// whether a cell is null must use [`Value::is_null`]; two nulls are never
/// "equal" under SQL semantics even though the derived `PartialEq` says so.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// The null marker.
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Array of values
    Array(Vec<Value>),
}

impl Value {
    /// Returns `true` if the value is the null marker.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as a boolean if it is one.
    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is one.
    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float if it is one.
    #[inline]
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is one.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a byte slice if it is one.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the type of this value.
    ///
    /// Arrays report the type of their first non-null element, or
    /// `NULL[]` when there is none.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Bool(_) => DataType::Bool,
            Self::Int(_) => DataType::Int,
            Self::Float(_) => DataType::Float,
            Self::String(_) => DataType::Text,
            Self::Bytes(_) => DataType::Bytes,
            Self::Array(items) => {
                let element = items
                    .iter()
                    .find(|v| !v.is_null())
                    .map_or(DataType::Null, Value::data_type);
                DataType::Array(Box::new(element))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Bytes(b) => {
                write!(f, "b'")?;
                for byte in b {
                    write!(f, "\\x{byte:02x}")?;
                }
                write!(f, "'")
            }
            Self::Array(items) => {
                write!(f, "ARRAY[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    #[inline]
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    #[inline]
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn value_type_checks() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(true).is_null());
        assert!(!Value::Int(0).is_null());
    }

    #[test]
    fn value_conversions() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(42i64).as_int(), Some(42));
        assert_eq!(Value::from(2.5f64).as_float(), Some(2.5));
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some(7i64)), Value::Int(7));
    }

    #[test]
    fn data_type_of_values() {
        assert_eq!(Value::Null.data_type(), DataType::Null);
        assert_eq!(Value::Int(1).data_type(), DataType::Int);
        assert_eq!(Value::from("x").data_type(), DataType::Text);
        assert_eq!(
            Value::Array(vec![Value::Null, Value::Float(1.0)]).data_type(),
            DataType::Array(Box::new(DataType::Float))
        );
    }

    #[test]
    fn display_quotes_strings() {
        assert_eq!(Value::from("it's").to_string(), "'it''s'");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Bytes(vec![0xab]).to_string(), "b'\\xab'");
        assert_eq!(Value::Array(vec![Value::Int(1), Value::Null]).to_string(), "ARRAY[1, NULL]");
    }
}
