//! Column schemas of join inputs and outputs.
//!
//! A [`DataSourceInfo`] describes one relation feeding a join (or the row a
//! join produces): its ordered [`ColumnDescriptor`]s and the table aliases
//! that qualify them.
//!
//! # Example
//!
//! ```
//! use conjoin_core::DataType;
//! use conjoin_query::plan::{ColumnDescriptor, DataSourceInfo};
//!
//! let users = DataSourceInfo::new(vec![
//!     ColumnDescriptor::new("id", DataType::Int),
//!     ColumnDescriptor::new("name", DataType::Text),
//! ])
//! .with_alias("u");
//!
//! assert_eq!(users.format_var(1), "u.name");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use conjoin_core::DataType;
use serde::{Deserialize, Serialize};

use super::name::normalize_name;
use crate::error::{JoinError, JoinResult};

/// Map from table alias to the column positions it qualifies.
pub type SourceAliases = BTreeMap<String, Vec<usize>>;

/// A column of a join input or output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Resolved column type.
    pub data_type: DataType,
    /// Hidden columns occupy a row position but are invisible to name lookup.
    pub hidden: bool,
}

impl ColumnDescriptor {
    /// Creates a visible column.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self { name: name.into(), data_type, hidden: false }
    }

    /// Creates a hidden column.
    #[must_use]
    pub fn hidden(name: impl Into<String>, data_type: DataType) -> Self {
        Self { name: name.into(), data_type, hidden: true }
    }

    /// Returns true if this column answers to the normalized name.
    #[must_use]
    pub fn matches(&self, normalized: &str) -> bool {
        self.name == normalized || normalize_name(&self.name) == normalized
    }
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)?;
        if self.hidden {
            write!(f, " (hidden)")?;
        }
        Ok(())
    }
}

/// The schema of a relation: ordered columns plus alias mappings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataSourceInfo {
    columns: Vec<ColumnDescriptor>,
    aliases: SourceAliases,
}

impl DataSourceInfo {
    /// Creates a schema with no aliases.
    #[must_use]
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns, aliases: SourceAliases::new() }
    }

    /// Creates a schema with explicit aliases.
    #[must_use]
    pub fn with_aliases(columns: Vec<ColumnDescriptor>, aliases: SourceAliases) -> Self {
        Self { columns, aliases }
    }

    /// Adds an alias covering every column, in order.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let range = (0..self.columns.len()).collect();
        self.aliases.insert(alias.into(), range);
        self
    }

    /// Returns the columns.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Returns the alias map.
    #[must_use]
    pub fn aliases(&self) -> &SourceAliases {
        &self.aliases
    }

    /// Returns the number of columns (the row width).
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the column at a position.
    #[must_use]
    pub fn column(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    /// Positions of the visible columns answering to a normalized name.
    pub fn visible_matches<'a>(&'a self, normalized: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.columns
            .iter()
            .enumerate()
            .filter(move |(_, c)| !c.hidden && c.matches(normalized))
            .map(|(i, _)| i)
    }

    /// Positions of the visible columns of `alias` answering to a normalized name.
    ///
    /// Returns `None` if the alias is unknown.
    #[must_use]
    pub fn qualified_matches(&self, alias: &str, normalized: &str) -> Option<Vec<usize>> {
        let range = self
            .aliases
            .iter()
            .find(|(name, _)| name.as_str() == alias || normalize_name(name) == alias)
            .map(|(_, range)| range)?;
        Some(
            range
                .iter()
                .copied()
                .filter(|&i| self.columns.get(i).is_some_and(|c| !c.hidden && c.matches(normalized)))
                .collect(),
        )
    }

    /// Renders the column at `index` for diagnostics, qualified by the first
    /// alias that covers it.
    #[must_use]
    pub fn format_var(&self, index: usize) -> String {
        let Some(column) = self.columns.get(index) else {
            return format!("@{}", index + 1);
        };
        match self.aliases.iter().find(|(_, range)| range.contains(&index)) {
            Some((alias, _)) => format!("{alias}.{}", column.name),
            None => column.name.clone(),
        }
    }

    /// Concatenates two schemas, as for CROSS JOIN and ON joins.
    ///
    /// Right-hand alias positions are shifted past the left columns.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::DuplicateSourceName`] if both sides use the
    /// same alias.
    pub fn concat(left: &Self, right: &Self) -> JoinResult<Self> {
        let mut columns = Vec::with_capacity(left.len() + right.len());
        columns.extend(left.columns.iter().cloned());
        columns.extend(right.columns.iter().cloned());

        let mut aliases = left.aliases.clone();
        for (alias, range) in &right.aliases {
            if aliases.contains_key(alias) {
                return Err(JoinError::DuplicateSourceName(alias.clone()));
            }
            aliases.insert(alias.clone(), range.iter().map(|i| i + left.len()).collect());
        }

        Ok(Self { columns, aliases })
    }
}

/// Lists the visible column names present on both sides, in left order.
///
/// This is the implicit USING list of a NATURAL JOIN.
#[must_use]
pub fn natural_using_names(left: &DataSourceInfo, right: &DataSourceInfo) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for column in left.columns.iter().filter(|c| !c.hidden) {
        let normalized = normalize_name(&column.name);
        if names.contains(&normalized) {
            continue;
        }
        if right.visible_matches(&normalized).next().is_some() {
            names.push(normalized);
        }
    }
    names
}
