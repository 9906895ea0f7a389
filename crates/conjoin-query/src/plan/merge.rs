//! Schema merging for USING joins.
//!
//! A USING join collapses each pair of join columns into one output column.
//! The merged row is laid out as the USING columns (in pair order, described
//! by the left side), then the remaining left columns, then the remaining
//! right columns. [`UsingMerge`] computes that layout together with the
//! position maps the Equality predicate evaluates against.
//!
//! Source aliases of both sides are remapped onto the merged layout. When
//! both sides carry the same alias the right side's mapping replaces the
//! left's and no error is raised; concatenating joins reject the same input
//! (see [`DataSourceInfo::concat`]).

use tracing::debug;

use super::schema::{ColumnDescriptor, DataSourceInfo, SourceAliases};
use crate::error::{JoinError, JoinResult};

/// Finds the position of a USING column on one side of the join.
///
/// Hidden columns are skipped. When several visible columns answer to the
/// name, the last one wins.
///
/// # Errors
///
/// Returns [`JoinError::UsingColumnNotFound`] if no visible column matches.
pub fn resolve_using_column(
    info: &DataSourceInfo,
    normalized: &str,
    side: &'static str,
) -> JoinResult<usize> {
    info.visible_matches(normalized).last().ok_or_else(|| JoinError::UsingColumnNotFound {
        column: normalized.to_string(),
        side,
    })
}

/// The merged layout of a USING join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingMerge {
    /// The merged output schema.
    pub info: DataSourceInfo,
    /// Left positions of the USING columns, in pair order.
    pub left_using: Vec<usize>,
    /// Right positions of the USING columns, in pair order.
    pub right_using: Vec<usize>,
    /// Left positions not consumed by a USING pair, in original order.
    pub left_rest: Vec<usize>,
    /// Right positions not consumed by a USING pair, in original order.
    pub right_rest: Vec<usize>,
}

impl UsingMerge {
    /// Lays out the merged schema for already-resolved USING positions.
    ///
    /// `left_using` and `right_using` must have equal length, hold valid
    /// positions of their side, and contain no repeats.
    #[must_use]
    pub fn compute(
        left: &DataSourceInfo,
        right: &DataSourceInfo,
        left_using: Vec<usize>,
        right_using: Vec<usize>,
    ) -> Self {
        let pairs = left_using.len();
        let mut left_slots: Vec<Option<usize>> = vec![None; left.len()];
        let mut right_slots: Vec<Option<usize>> = vec![None; right.len()];

        let mut columns: Vec<ColumnDescriptor> =
            Vec::with_capacity((left.len() + right.len()).saturating_sub(pairs));
        for (slot, (&l, &r)) in left_using.iter().zip(&right_using).enumerate() {
            left_slots[l] = Some(slot);
            right_slots[r] = Some(slot);
            columns.extend(left.column(l).cloned());
        }

        let left_rest = append_rest(left, &mut left_slots, &mut columns);
        let right_rest = append_rest(right, &mut right_slots, &mut columns);

        let mut aliases = remap_aliases(left.aliases(), &left_slots);
        for (alias, range) in remap_aliases(right.aliases(), &right_slots) {
            if let Some(previous) = aliases.insert(alias.clone(), range) {
                debug!(alias = %alias, ?previous, "right-hand alias replaces left-hand alias in USING join");
            }
        }

        Self {
            info: DataSourceInfo::with_aliases(columns, aliases),
            left_using,
            right_using,
            left_rest,
            right_rest,
        }
    }
}

/// Appends the columns of `side` that have no slot yet and records where
/// they landed. Returns their original positions.
fn append_rest(
    side: &DataSourceInfo,
    slots: &mut [Option<usize>],
    columns: &mut Vec<ColumnDescriptor>,
) -> Vec<usize> {
    let mut rest = Vec::new();
    for (i, column) in side.columns().iter().enumerate() {
        if slots[i].is_none() {
            slots[i] = Some(columns.len());
            columns.push(column.clone());
            rest.push(i);
        }
    }
    rest
}

fn remap_aliases(aliases: &SourceAliases, slots: &[Option<usize>]) -> SourceAliases {
    aliases
        .iter()
        .map(|(alias, range)| {
            let remapped =
                range.iter().filter_map(|&i| slots.get(i).copied().flatten()).collect();
            (alias.clone(), remapped)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use conjoin_core::DataType;

    use super::*;

    fn info(names: &[&str], alias: &str) -> DataSourceInfo {
        DataSourceInfo::new(names.iter().map(|n| ColumnDescriptor::new(*n, DataType::Int)).collect())
            .with_alias(alias)
    }

    fn names(info: &DataSourceInfo) -> Vec<&str> {
        info.columns().iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn using_columns_come_first() {
        let left = info(&["a", "b"], "l");
        let right = info(&["c", "a"], "r");
        let merge = UsingMerge::compute(&left, &right, vec![0], vec![1]);

        assert_eq!(names(&merge.info), vec!["a", "b", "c"]);
        assert_eq!(merge.left_rest, vec![1]);
        assert_eq!(merge.right_rest, vec![0]);
        assert_eq!(merge.info.aliases()["l"], vec![0, 1]);
        assert_eq!(merge.info.aliases()["r"], vec![2, 0]);
    }

    #[test]
    fn multi_column_layout() {
        let left = info(&["x", "a", "y", "b"], "l");
        let right = info(&["b", "z", "a"], "r");
        let merge = UsingMerge::compute(&left, &right, vec![1, 3], vec![2, 0]);

        assert_eq!(names(&merge.info), vec!["a", "b", "x", "y", "z"]);
        assert_eq!(merge.left_rest, vec![0, 2]);
        assert_eq!(merge.right_rest, vec![1]);
        assert_eq!(merge.info.aliases()["l"], vec![2, 0, 3, 1]);
        assert_eq!(merge.info.aliases()["r"], vec![1, 4, 0]);
    }

    #[test]
    fn right_alias_overwrites_left() {
        let left = info(&["a", "b"], "t");
        let right = info(&["a", "c"], "t");
        let merge = UsingMerge::compute(&left, &right, vec![0], vec![0]);

        assert_eq!(merge.info.aliases().len(), 1);
        assert_eq!(merge.info.aliases()["t"], vec![0, 2]);
    }

    #[test]
    fn resolve_picks_last_visible() {
        let side = DataSourceInfo::new(vec![
            ColumnDescriptor::new("a", DataType::Int),
            ColumnDescriptor::new("A", DataType::Text),
            ColumnDescriptor::hidden("a", DataType::Bool),
        ]);
        assert_eq!(resolve_using_column(&side, "a", "left").unwrap(), 1);

        let err = resolve_using_column(&side, "missing", "right").unwrap_err();
        assert_eq!(
            err.to_string(),
            "column \"missing\" specified in USING clause does not exist in right table"
        );
    }
}
