//! CROSS JOIN predicate.

use conjoin_core::Value;
use tracing::debug;

use crate::error::JoinResult;
use crate::plan::DataSourceInfo;

/// Accepts every row pair and emits their concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrossPredicate;

impl CrossPredicate {
    /// Always true.
    #[inline]
    #[must_use]
    pub const fn eval(&self, _left: &[Value], _right: &[Value]) -> bool {
        true
    }

    /// Writes `left ++ right` into `result`.
    #[inline]
    pub fn prepare_row(&self, result: &mut Vec<Value>, left: &[Value], right: &[Value]) {
        concat_into(result, left, right);
    }
}

/// Replaces the contents of `result` with `left ++ right`.
#[inline]
pub(crate) fn concat_into(result: &mut Vec<Value>, left: &[Value], right: &[Value]) {
    result.clear();
    result.reserve(left.len() + right.len());
    result.extend_from_slice(left);
    result.extend_from_slice(right);
}

/// Builds a CROSS JOIN predicate and its output schema.
///
/// # Errors
///
/// Returns [`JoinError::DuplicateSourceName`](crate::JoinError::DuplicateSourceName)
/// if both inputs use the same alias.
pub fn make_cross_predicate(
    left: &DataSourceInfo,
    right: &DataSourceInfo,
) -> JoinResult<(CrossPredicate, DataSourceInfo)> {
    let info = DataSourceInfo::concat(left, right)?;
    debug!(width = info.len(), "built CROSS join predicate");
    Ok((CrossPredicate, info))
}
