//! USING / equi-join predicate.
//!
//! Pairs of columns, one from each side, must compare equal for a row pair
//! to match. NULL never equals anything, not even NULL. The output row holds
//! one coalesced column per pair followed by the remaining left and right
//! columns, and the pair columns of either side can be encoded into a join
//! key for hash and merge strategies.

use std::collections::HashSet;
use std::fmt;

use conjoin_core::{DataType, KeyEncoder, Value};
use tracing::debug;

use super::JoinSide;
use crate::error::{JoinError, JoinResult};
use crate::exec::context::EvalContext;
use crate::expr::{find_equality_fn, EqualityFn};
use crate::plan::{resolve_using_column, DataSourceInfo, Name, NameList, UsingMerge};

/// A predicate comparing USING column pairs for equality.
#[derive(Debug, Clone)]
pub struct EqualityPredicate {
    left_names: Vec<Name>,
    right_names: Vec<Name>,
    equality_fns: Vec<EqualityFn>,
    /// Declared `(left, right)` column types of each pair.
    pair_types: Vec<(DataType, DataType)>,
    /// Pairs whose INT keys are encoded as FLOAT so both sides agree.
    float_keys: Vec<bool>,
    left_using: Vec<usize>,
    right_using: Vec<usize>,
    left_rest: Vec<usize>,
    right_rest: Vec<usize>,
}

impl EqualityPredicate {
    /// Returns the number of USING pairs.
    #[must_use]
    pub fn num_pairs(&self) -> usize {
        self.equality_fns.len()
    }

    /// Returns the row positions feeding each pair on `side`.
    #[must_use]
    pub fn using_positions(&self, side: JoinSide) -> &[usize] {
        match side {
            JoinSide::Left => &self.left_using,
            JoinSide::Right => &self.right_using,
        }
    }

    /// Returns the row positions on `side` not consumed by any pair.
    #[must_use]
    pub fn rest_positions(&self, side: JoinSide) -> &[usize] {
        match side {
            JoinSide::Left => &self.left_rest,
            JoinSide::Right => &self.right_rest,
        }
    }

    /// Returns true if every pair compares equal.
    ///
    /// Stops at the first pair holding a NULL on either side or comparing
    /// unequal.
    ///
    /// # Errors
    ///
    /// Propagates the first comparison error.
    ///
    /// # Panics
    ///
    /// Panics if a row is narrower than its input schema.
    pub fn eval(&self, ctx: &EvalContext, left: &[Value], right: &[Value]) -> JoinResult<bool> {
        for (i, eq) in self.equality_fns.iter().enumerate() {
            let l = &left[self.left_using[i]];
            let r = &right[self.right_using[i]];
            if l.is_null() || r.is_null() {
                return Ok(false);
            }
            if !eq(ctx, l, r)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Writes the merged row: coalesced pair columns, then the left rest,
    /// then the right rest.
    ///
    /// # Panics
    ///
    /// Panics if a row is narrower than its input schema.
    pub fn prepare_row(&self, result: &mut Vec<Value>, left: &[Value], right: &[Value]) {
        result.clear();
        result.reserve(self.num_pairs() + self.left_rest.len() + self.right_rest.len());
        for (&l, &r) in self.left_using.iter().zip(&self.right_using) {
            let value = if left[l].is_null() { &right[r] } else { &left[l] };
            result.push(value.clone());
        }
        result.extend(self.left_rest.iter().map(|&i| left[i].clone()));
        result.extend(self.right_rest.iter().map(|&i| right[i].clone()));
    }

    /// Appends the key encoding of `row`'s pair columns, in pair order, and
    /// reports whether any of them was NULL.
    ///
    /// A non-NULL value whose runtime type cannot be compared with the
    /// declared type of the other side of its pair is rejected with the
    /// same [`JoinError::TypeMismatch`] `eval` would raise.
    ///
    /// On error `buf` is restored to its length on entry.
    ///
    /// # Errors
    ///
    /// Returns an error if a pair column holds a value with no key encoding
    /// or one that is incomparable with the other side's declared type.
    ///
    /// # Panics
    ///
    /// Panics if `row` is narrower than the schema of `side`.
    pub fn encode(&self, buf: &mut Vec<u8>, row: &[Value], side: JoinSide) -> JoinResult<bool> {
        let start = buf.len();
        let mut contains_null = false;
        for (i, &pos) in self.using_positions(side).iter().enumerate() {
            let value = &row[pos];
            contains_null |= value.is_null();
            if let Err(err) = self.encode_pair_value(buf, i, value, side) {
                buf.truncate(start);
                return Err(err);
            }
        }
        Ok(contains_null)
    }

    #[allow(clippy::cast_precision_loss)]
    fn encode_pair_value(
        &self,
        buf: &mut Vec<u8>,
        pair: usize,
        value: &Value,
        side: JoinSide,
    ) -> JoinResult<()> {
        if !value.is_null() {
            let (left_type, right_type) = &self.pair_types[pair];
            let actual = value.data_type();
            let (l, r) = match side {
                JoinSide::Left => (&actual, right_type),
                JoinSide::Right => (left_type, &actual),
            };
            if !l.is_comparable_to(r) {
                return Err(JoinError::TypeMismatch { expected: l.to_string(), actual: r.to_string() });
            }
        }
        match value {
            Value::Int(v) if self.float_keys[pair] => Value::Float(*v as f64).encode_key_to(buf)?,
            other => other.encode_key_to(buf)?,
        }
        Ok(())
    }
}

impl fmt::Display for EqualityPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " ON EQUALS(({}),({}))",
            NameList(&self.left_names),
            NameList(&self.right_names)
        )
    }
}

/// Builds a predicate for `USING (names)`.
///
/// # Errors
///
/// See [`make_equality_predicate`].
pub fn make_using_predicate(
    left: &DataSourceInfo,
    right: &DataSourceInfo,
    names: &[Name],
) -> JoinResult<(EqualityPredicate, DataSourceInfo)> {
    make_equality_predicate(left, right, names, names)
}

/// Builds an equality predicate pairing `left_names[i]` with
/// `right_names[i]`, and the merged output schema.
///
/// # Errors
///
/// Returns an error if the lists differ in length, a left name repeats, a
/// name does not resolve to a visible column, or a pair's types cannot be
/// compared.
pub fn make_equality_predicate(
    left: &DataSourceInfo,
    right: &DataSourceInfo,
    left_names: &[Name],
    right_names: &[Name],
) -> JoinResult<(EqualityPredicate, DataSourceInfo)> {
    if left_names.len() != right_names.len() {
        return Err(JoinError::UsingLengthMismatch {
            left: left_names.len(),
            right: right_names.len(),
        });
    }

    let mut seen = HashSet::with_capacity(left_names.len());
    for name in left_names {
        let normalized = name.normalize();
        if !seen.insert(normalized.clone()) {
            return Err(JoinError::DuplicateUsingColumn(normalized));
        }
    }

    let pairs = left_names.len();
    let mut left_using = Vec::with_capacity(pairs);
    let mut right_using = Vec::with_capacity(pairs);
    let mut equality_fns = Vec::with_capacity(pairs);
    let mut float_keys = Vec::with_capacity(pairs);
    let mut pair_types = Vec::with_capacity(pairs);

    for (left_name, right_name) in left_names.iter().zip(right_names) {
        let l = resolve_using_column(left, &left_name.normalize(), "left")?;
        let r = resolve_using_column(right, &right_name.normalize(), "right")?;
        let left_type = column_type(left, l);
        let right_type = column_type(right, r);

        let eq = find_equality_fn(&left_type, &right_type).ok_or_else(|| {
            JoinError::IncomparableUsingTypes {
                left_type: left_type.to_string(),
                left_column: left_name.normalize(),
                right_type: right_type.to_string(),
                right_column: right_name.normalize(),
            }
        })?;

        left_using.push(l);
        right_using.push(r);
        equality_fns.push(eq);
        float_keys.push(needs_float_key(&left_type, &right_type));
        pair_types.push((left_type, right_type));
    }

    let merge = UsingMerge::compute(left, right, left_using, right_using);
    debug!(
        pairs,
        width = merge.info.len(),
        using = %NameList(left_names),
        "built equality join predicate"
    );

    let pred = EqualityPredicate {
        left_names: left_names.to_vec(),
        right_names: right_names.to_vec(),
        equality_fns,
        pair_types,
        float_keys,
        left_using: merge.left_using,
        right_using: merge.right_using,
        left_rest: merge.left_rest,
        right_rest: merge.right_rest,
    };
    Ok((pred, merge.info))
}

fn column_type(info: &DataSourceInfo, index: usize) -> DataType {
    info.column(index).map_or(DataType::Any, |c| c.data_type.clone())
}

/// INT and FLOAT values that compare equal must also share a key.
fn needs_float_key(left: &DataType, right: &DataType) -> bool {
    matches!(
        (left, right),
        (DataType::Int, DataType::Float)
            | (DataType::Float, DataType::Int)
            | (DataType::Any, _)
            | (_, DataType::Any)
    )
}
