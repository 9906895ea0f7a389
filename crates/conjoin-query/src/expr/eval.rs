//! Evaluation of bound scalar expressions.
//!
//! Follows SQL three-valued logic: comparisons and arithmetic on NULL yield
//! NULL, `AND`/`OR` only yield NULL when the known operands do not decide
//! the result.

use std::cmp::Ordering;

use conjoin_core::Value;

use super::compare::compare_values;
use super::scalar::{BinaryOp, ScalarExpr, UnaryOp};
use super::vars::IndexedVarContainer;
use crate::error::{JoinError, JoinResult};
use crate::exec::context::EvalContext;

impl ScalarExpr {
    /// Evaluates the expression with `vars` as the current row.
    ///
    /// # Errors
    ///
    /// Returns an error for missing columns or parameters, operand type
    /// mismatches, division by zero, integer overflow and subquery failures.
    pub fn eval(&self, ctx: &EvalContext, vars: &dyn IndexedVarContainer) -> JoinResult<Value> {
        match self {
            Self::Column(c) => vars.var_value(c.index).cloned().ok_or_else(|| {
                JoinError::Evaluation(format!("no value for column {}", vars.var_name(c.index)))
            }),
            Self::Literal(v) => Ok(v.clone()),
            Self::Parameter(n) => ctx
                .get_parameter(*n)
                .cloned()
                .ok_or_else(|| JoinError::Evaluation(format!("no value given for placeholder ${n}"))),
            Self::Binary { left, op: BinaryOp::And, right } => {
                let l = as_bool(left.eval(ctx, vars)?)?;
                if l == Some(false) {
                    return Ok(Value::Bool(false));
                }
                match (l, as_bool(right.eval(ctx, vars)?)?) {
                    (_, Some(false)) => Ok(Value::Bool(false)),
                    (Some(true), Some(true)) => Ok(Value::Bool(true)),
                    _ => Ok(Value::Null),
                }
            }
            Self::Binary { left, op: BinaryOp::Or, right } => {
                let l = as_bool(left.eval(ctx, vars)?)?;
                if l == Some(true) {
                    return Ok(Value::Bool(true));
                }
                match (l, as_bool(right.eval(ctx, vars)?)?) {
                    (_, Some(true)) => Ok(Value::Bool(true)),
                    (Some(false), Some(false)) => Ok(Value::Bool(false)),
                    _ => Ok(Value::Null),
                }
            }
            Self::Binary { left, op, right } => {
                let l = left.eval(ctx, vars)?;
                let r = right.eval(ctx, vars)?;
                if l.is_null() || r.is_null() {
                    return Ok(Value::Null);
                }
                if op.is_comparison() {
                    compare(*op, &l, &r)
                } else {
                    arithmetic(*op, &l, &r)
                }
            }
            Self::Unary { op: UnaryOp::Not, operand } => {
                Ok(as_bool(operand.eval(ctx, vars)?)?.map_or(Value::Null, |b| Value::Bool(!b)))
            }
            Self::Unary { op: UnaryOp::Neg, operand } => match operand.eval(ctx, vars)? {
                Value::Null => Ok(Value::Null),
                Value::Int(i) => i.checked_neg().map(Value::Int).ok_or_else(overflow),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(type_mismatch("numeric", &other)),
            },
            Self::IsNull { operand, negated } => {
                Ok(Value::Bool(operand.eval(ctx, vars)?.is_null() != *negated))
            }
            Self::Subquery(s) => s.value(),
        }
    }
}

fn type_mismatch(expected: &str, actual: &Value) -> JoinError {
    JoinError::TypeMismatch { expected: expected.to_string(), actual: actual.data_type().to_string() }
}

fn overflow() -> JoinError {
    JoinError::Evaluation("integer out of range".to_string())
}

fn as_bool(value: Value) -> JoinResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        other => Err(type_mismatch("BOOL", &other)),
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> JoinResult<Value> {
    let ord = compare_values(left, right)?;
    let result = match op {
        BinaryOp::Eq => ord == Ordering::Equal,
        BinaryOp::NotEq => ord != Ordering::Equal,
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::LtEq => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        BinaryOp::GtEq => ord != Ordering::Less,
        _ => return Err(JoinError::Evaluation(format!("{op} is not a comparison"))),
    };
    Ok(Value::Bool(result))
}

#[allow(clippy::cast_precision_loss)]
fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> JoinResult<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_arithmetic(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => float_arithmetic(op, *a, *b),
        (Value::Int(a), Value::Float(b)) => float_arithmetic(op, *a as f64, *b),
        (Value::Float(a), Value::Int(b)) => float_arithmetic(op, *a, *b as f64),
        (Value::Int(_) | Value::Float(_), other) | (other, _) => Err(type_mismatch("numeric", other)),
    }
}

fn int_arithmetic(op: BinaryOp, a: i64, b: i64) -> JoinResult<Value> {
    if matches!(op, BinaryOp::Div | BinaryOp::Mod) && b == 0 {
        return Err(JoinError::Evaluation("division by zero".to_string()));
    }
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => a.checked_div(b),
        BinaryOp::Mod => a.checked_rem(b),
        _ => return Err(JoinError::Evaluation(format!("{op} is not arithmetic"))),
    };
    result.map(Value::Int).ok_or_else(overflow)
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64) -> JoinResult<Value> {
    if matches!(op, BinaryOp::Div | BinaryOp::Mod) && b == 0.0 {
        return Err(JoinError::Evaluation("division by zero".to_string()));
    }
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        _ => return Err(JoinError::Evaluation(format!("{op} is not arithmetic"))),
    };
    Ok(Value::Float(result))
}
