//! Value comparison and the equality-function resolver.
//!
//! Comparisons run on non-NULL values; callers handle NULL before reaching
//! here. Floats order with NaN above every other value and equal to itself,
//! and `-0.0` equals `0.0`, matching the key encoding.

use std::cmp::Ordering;

use conjoin_core::{DataType, Value};

use crate::error::{JoinError, JoinResult};
use crate::exec::context::EvalContext;

/// An equality comparison bound at construction time from a pair of column
/// types.
pub type EqualityFn = fn(&EvalContext, &Value, &Value) -> JoinResult<bool>;

/// Resolves the equality function for a left and right column type.
///
/// Returns `None` if values of the two types can never be compared.
#[must_use]
pub fn find_equality_fn(left: &DataType, right: &DataType) -> Option<EqualityFn> {
    let f: EqualityFn = match (left, right) {
        (DataType::Any | DataType::Null, _) | (_, DataType::Any | DataType::Null) => eq_any,
        (DataType::Bool, DataType::Bool) => eq_bool,
        (DataType::Int, DataType::Int) => eq_int,
        (DataType::Float, DataType::Float) => eq_float,
        (DataType::Int, DataType::Float) => eq_int_float,
        (DataType::Float, DataType::Int) => eq_float_int,
        (DataType::Text, DataType::Text) => eq_text,
        (DataType::Bytes, DataType::Bytes) => eq_bytes,
        (DataType::Array(a), DataType::Array(b)) if a.is_comparable_to(b) => eq_any,
        _ => return None,
    };
    Some(f)
}

fn mismatch(expected: &str, actual: &Value) -> JoinError {
    JoinError::TypeMismatch { expected: expected.to_string(), actual: actual.data_type().to_string() }
}

fn eq_any(_ctx: &EvalContext, left: &Value, right: &Value) -> JoinResult<bool> {
    Ok(compare_values(left, right)? == Ordering::Equal)
}

fn eq_bool(_ctx: &EvalContext, left: &Value, right: &Value) -> JoinResult<bool> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Bool(_), other) | (other, _) => Err(mismatch("BOOL", other)),
    }
}

fn eq_int(_ctx: &EvalContext, left: &Value, right: &Value) -> JoinResult<bool> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a == b),
        (Value::Int(_), other) | (other, _) => Err(mismatch("INT", other)),
    }
}

fn eq_float(_ctx: &EvalContext, left: &Value, right: &Value) -> JoinResult<bool> {
    match (left, right) {
        (Value::Float(a), Value::Float(b)) => Ok(float_cmp(*a, *b) == Ordering::Equal),
        (Value::Float(_), other) | (other, _) => Err(mismatch("FLOAT", other)),
    }
}

#[allow(clippy::cast_precision_loss)]
fn eq_int_float(_ctx: &EvalContext, left: &Value, right: &Value) -> JoinResult<bool> {
    match (left, right) {
        (Value::Int(a), Value::Float(b)) => Ok(float_cmp(*a as f64, *b) == Ordering::Equal),
        (Value::Int(_), other) => Err(mismatch("FLOAT", other)),
        (other, _) => Err(mismatch("INT", other)),
    }
}

fn eq_float_int(ctx: &EvalContext, left: &Value, right: &Value) -> JoinResult<bool> {
    eq_int_float(ctx, right, left)
}

fn eq_text(_ctx: &EvalContext, left: &Value, right: &Value) -> JoinResult<bool> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(a == b),
        (Value::String(_), other) | (other, _) => Err(mismatch("TEXT", other)),
    }
}

fn eq_bytes(_ctx: &EvalContext, left: &Value, right: &Value) -> JoinResult<bool> {
    match (left, right) {
        (Value::Bytes(a), Value::Bytes(b)) => Ok(a == b),
        (Value::Bytes(_), other) | (other, _) => Err(mismatch("BYTES", other)),
    }
}

/// Total order on floats used by every comparison.
#[must_use]
pub fn float_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Compares two values of comparable types.
///
/// INT and FLOAT compare numerically. Inside arrays NULL sorts first.
///
/// # Errors
///
/// Returns [`JoinError::TypeMismatch`] if the values have incomparable types.
#[allow(clippy::cast_precision_loss)]
pub fn compare_values(left: &Value, right: &Value) -> JoinResult<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        (Value::Null, _) => Ok(Ordering::Less),
        (_, Value::Null) => Ok(Ordering::Greater),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => Ok(float_cmp(*a, *b)),
        (Value::Int(a), Value::Float(b)) => Ok(float_cmp(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Ok(float_cmp(*a, *b as f64)),
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Bytes(a), Value::Bytes(b)) => Ok(a.cmp(b)),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b) {
                let ord = compare_values(x, y)?;
                if ord != Ordering::Equal {
                    return Ok(ord);
                }
            }
            Ok(a.len().cmp(&b.len()))
        }
        _ => Err(JoinError::TypeMismatch {
            expected: left.data_type().to_string(),
            actual: right.data_type().to_string(),
        }),
    }
}
