//! Resolved column and expression types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The resolved type of a column or expression.
///
/// `Null` types a bare NULL literal and `Any` types a placeholder whose
/// type is only known once a parameter value is supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// Unlimited-length text.
    Text,
    /// Binary data.
    Bytes,
    /// Array of another type.
    Array(Box<DataType>),
    /// Null type (for NULL literals).
    Null,
    /// Any type (unknown until evaluation).
    Any,
}

impl DataType {
    /// Returns true if this type is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// Returns true if values of this type may be used where `other` is expected
    /// without an explicit cast.
    ///
    /// `Null` and `Any` adapt to everything.
    #[must_use]
    pub fn is_comparable_to(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any | Self::Null, _) | (_, Self::Any | Self::Null) => true,
            (Self::Array(a), Self::Array(b)) => a.is_comparable_to(b),
            _ if self.is_numeric() && other.is_numeric() => true,
            _ => self == other,
        }
    }

    /// Determines the common type for a binary operation between two types.
    ///
    /// Returns `None` if the types are incompatible.
    #[must_use]
    pub fn common_type(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            _ if self == other => Some(self.clone()),
            (Self::Any | Self::Null, t) | (t, Self::Any | Self::Null) => Some(t.clone()),
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Some(Self::Float),
            (Self::Array(a), Self::Array(b)) => {
                a.common_type(b).map(|inner| Self::Array(Box::new(inner)))
            }
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "BOOL"),
            Self::Int => write!(f, "INT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Text => write!(f, "TEXT"),
            Self::Bytes => write!(f, "BYTES"),
            Self::Array(inner) => write!(f, "{inner}[]"),
            Self::Null => write!(f, "NULL"),
            Self::Any => write!(f, "ANY"),
        }
    }
}
