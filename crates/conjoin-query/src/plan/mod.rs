//! Schema model for join inputs and outputs.
//!
//! - [`name`] - Identifiers and normalization
//! - [`schema`] - Column descriptors, source schemas and concatenation
//! - [`merge`] - The merged layout of USING joins

pub mod merge;
pub mod name;
pub mod schema;

pub use merge::{resolve_using_column, UsingMerge};
pub use name::{normalize_name, Name, NameList};
pub use schema::{natural_using_names, ColumnDescriptor, DataSourceInfo, SourceAliases};
