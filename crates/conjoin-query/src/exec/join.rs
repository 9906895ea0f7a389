//! Reference join drivers over materialized inputs.
//!
//! Each driver consumes a [`JoinPredicate`] the way a join operator does:
//! `eval` first, `prepare_row` only for accepted pairs, and for key-based
//! strategies `encode` on both sides. Rows whose key contains NULL can never
//! match an equality predicate and are skipped before any comparison.
//!
//! Hash and merge only compare rows whose keys collide. A key value whose
//! runtime type conflicts with the other side's declared column type fails
//! in `encode` just as `eval` fails in the nested loop, but when both sides
//! of a pair are declared `ANY` differently typed keys never meet and produce
//! no match instead of an error.
//!
//! The predicate must already be started.

use std::collections::HashMap;

use conjoin_core::Value;

use super::context::EvalContext;
use super::predicate::{JoinPredicate, JoinSide};
use crate::error::{JoinError, JoinResult};

/// A fully materialized row.
pub type Row = Vec<Value>;

/// Joins every left row against every right row.
///
/// Output is in left-major order.
///
/// # Errors
///
/// Returns [`JoinError::Cancelled`] if the context is cancelled, or the
/// first error from the predicate.
pub fn nested_loop_join(
    ctx: &EvalContext,
    predicate: &JoinPredicate,
    left: &[Row],
    right: &[Row],
) -> JoinResult<Vec<Row>> {
    let mut scratch = Vec::new();
    let mut output = Vec::new();
    for l in left {
        if ctx.is_cancelled() {
            return Err(JoinError::Cancelled);
        }
        for r in right {
            if predicate.eval(ctx, &mut scratch, l, r)? {
                let mut row = Vec::new();
                predicate.prepare_row(&mut row, l, r);
                output.push(row);
            }
        }
    }
    Ok(output)
}

/// Builds a hash table on the right input's keys and probes it with the
/// left input.
///
/// Output is in left-major order, with matches for one left row in right
/// input order.
///
/// # Errors
///
/// Returns [`JoinError::QueryTooLarge`] if the build side exceeds
/// `max_rows_in_memory`, [`JoinError::Cancelled`] if the context is
/// cancelled, or the first error from the predicate.
pub fn hash_join(
    ctx: &EvalContext,
    predicate: &JoinPredicate,
    left: &[Row],
    right: &[Row],
) -> JoinResult<Vec<Row>> {
    let limit = ctx.config().max_rows_in_memory;
    let mut table: HashMap<Vec<u8>, Vec<usize>> = HashMap::new();
    let mut key = Vec::with_capacity(ctx.config().key_buffer_capacity);

    for (i, r) in right.iter().enumerate() {
        if limit > 0 && i + 1 > limit {
            return Err(JoinError::QueryTooLarge { actual: i + 1, limit });
        }
        key.clear();
        if !predicate.encode(ctx, &mut key, r, JoinSide::Right)? {
            table.entry(key.clone()).or_default().push(i);
        }
    }

    let mut scratch = Vec::new();
    let mut output = Vec::new();
    for l in left {
        if ctx.is_cancelled() {
            return Err(JoinError::Cancelled);
        }
        key.clear();
        if predicate.encode(ctx, &mut key, l, JoinSide::Left)? {
            continue;
        }
        let Some(matches) = table.get(&key) else { continue };
        for &i in matches {
            let r = &right[i];
            if predicate.eval(ctx, &mut scratch, l, r)? {
                let mut row = Vec::new();
                predicate.prepare_row(&mut row, l, r);
                output.push(row);
            }
        }
    }
    Ok(output)
}

/// Sorts both inputs by key and joins runs of equal keys.
///
/// Output is in key order.
///
/// # Errors
///
/// Returns [`JoinError::QueryTooLarge`] if the two inputs together exceed
/// `max_rows_in_memory`, [`JoinError::Cancelled`] if the context is
/// cancelled, or the first error from the predicate.
pub fn merge_join(
    ctx: &EvalContext,
    predicate: &JoinPredicate,
    left: &[Row],
    right: &[Row],
) -> JoinResult<Vec<Row>> {
    let limit = ctx.config().max_rows_in_memory;
    let total = left.len() + right.len();
    if limit > 0 && total > limit {
        return Err(JoinError::QueryTooLarge { actual: total, limit });
    }

    let left_keys = sorted_keys(ctx, predicate, left, JoinSide::Left)?;
    let right_keys = sorted_keys(ctx, predicate, right, JoinSide::Right)?;

    let mut scratch = Vec::new();
    let mut output = Vec::new();
    let (mut li, mut ri) = (0, 0);
    while li < left_keys.len() && ri < right_keys.len() {
        if ctx.is_cancelled() {
            return Err(JoinError::Cancelled);
        }
        let (lk, rk) = (&left_keys[li].0, &right_keys[ri].0);
        match lk.cmp(rk) {
            std::cmp::Ordering::Less => li += 1,
            std::cmp::Ordering::Greater => ri += 1,
            std::cmp::Ordering::Equal => {
                let l_end = run_end(&left_keys, li);
                let r_end = run_end(&right_keys, ri);
                for (_, l) in &left_keys[li..l_end] {
                    for (_, r) in &right_keys[ri..r_end] {
                        let (l, r) = (&left[*l], &right[*r]);
                        if predicate.eval(ctx, &mut scratch, l, r)? {
                            let mut row = Vec::new();
                            predicate.prepare_row(&mut row, l, r);
                            output.push(row);
                        }
                    }
                }
                li = l_end;
                ri = r_end;
            }
        }
    }
    Ok(output)
}

/// Encodes the key of every row on one side, dropping keys containing NULL,
/// and sorts by key. Ties keep input order.
fn sorted_keys(
    ctx: &EvalContext,
    predicate: &JoinPredicate,
    rows: &[Row],
    side: JoinSide,
) -> JoinResult<Vec<(Vec<u8>, usize)>> {
    let mut keys = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let mut key = Vec::with_capacity(ctx.config().key_buffer_capacity);
        if !predicate.encode(ctx, &mut key, row, side)? {
            keys.push((key, i));
        }
    }
    keys.sort();
    Ok(keys)
}

fn run_end(keys: &[(Vec<u8>, usize)], start: usize) -> usize {
    let key = &keys[start].0;
    start + keys[start..].iter().take_while(|(k, _)| k == key).count()
}
