//! Position-based column lookup for bound expressions.
//!
//! A bound expression refers to columns only by their position in the
//! merged schema. Whatever backs those positions is lent to the expression
//! for the duration of one call through [`IndexedVarContainer`]: the schema
//! alone while binding and rendering, a [`RowScope`] while evaluating. The
//! expression never stores a reference to its container, so nothing can
//! outlive or move out from under it.

use conjoin_core::{DataType, Value};

use crate::plan::DataSourceInfo;

/// Resolves column positions to values, types and display names.
pub trait IndexedVarContainer {
    /// Returns the value at `index` in the current row, if there is one.
    fn var_value(&self, index: usize) -> Option<&Value>;

    /// Returns the resolved type of the column at `index`.
    fn var_type(&self, index: usize) -> Option<&DataType>;

    /// Returns the qualified display name of the column at `index`.
    fn var_name(&self, index: usize) -> String;
}

impl IndexedVarContainer for DataSourceInfo {
    fn var_value(&self, _index: usize) -> Option<&Value> {
        None
    }

    fn var_type(&self, index: usize) -> Option<&DataType> {
        self.column(index).map(|c| &c.data_type)
    }

    fn var_name(&self, index: usize) -> String {
        self.format_var(index)
    }
}

/// A row made current for one evaluation, described by its schema.
#[derive(Debug, Clone, Copy)]
pub struct RowScope<'a> {
    info: &'a DataSourceInfo,
    row: &'a [Value],
}

impl<'a> RowScope<'a> {
    /// Creates a scope over `row`, which must be laid out as `info`.
    #[inline]
    #[must_use]
    pub const fn new(info: &'a DataSourceInfo, row: &'a [Value]) -> Self {
        Self { info, row }
    }
}

impl IndexedVarContainer for RowScope<'_> {
    #[inline]
    fn var_value(&self, index: usize) -> Option<&Value> {
        self.row.get(index)
    }

    fn var_type(&self, index: usize) -> Option<&DataType> {
        self.info.var_type(index)
    }

    fn var_name(&self, index: usize) -> String {
        self.info.format_var(index)
    }
}
