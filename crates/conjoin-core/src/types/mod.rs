//! Datum and type definitions.
//!
//! A row handed to a join predicate is a fixed-width slice of [`Value`]s,
//! and every column of a schema carries a resolved [`DataType`].

mod data_type;
mod value;

pub use data_type::DataType;
pub use value::Value;
