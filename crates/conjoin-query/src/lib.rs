//! `conjoin` Query
//!
//! This crate provides the join predicate subsystem: the match condition of a
//! two-way join, the schema of the joined output, and the keys hash and merge
//! strategies join on.
//!
//! # Overview
//!
//! - **Plan**: Column descriptors, source aliases and USING schema merging
//! - **Expr**: Binding ON expressions against a joined schema and evaluating them
//! - **Exec**: The predicate variants (CROSS, ON, USING) and reference join drivers
//!
//! # Modules
//!
//! - [`plan`] - Join output schemas ([`DataSourceInfo`](plan::DataSourceInfo))
//! - [`expr`] - Bound scalar expressions and subqueries
//! - [`exec`] - Join predicates and drivers
//! - [`parser`] - Parsing ON expressions from SQL text
//! - [`error`] - Error types for building and evaluating predicates
//!
//! # Quick Start
//!
//! Join two inputs on a shared column:
//!
//! ```
//! use conjoin_core::{DataType, Value};
//! use conjoin_query::plan::{ColumnDescriptor, DataSourceInfo, Name};
//! use conjoin_query::{hash_join, EvalContext, PredicateBuilder};
//!
//! let left = DataSourceInfo::new(vec![
//!     ColumnDescriptor::new("a", DataType::Int),
//!     ColumnDescriptor::new("b", DataType::Int),
//! ]);
//! let right = DataSourceInfo::new(vec![
//!     ColumnDescriptor::new("a", DataType::Int),
//!     ColumnDescriptor::new("c", DataType::Int),
//! ]);
//! let (pred, _info) = PredicateBuilder::new().using(&left, &right, &[Name::new("a")]).unwrap();
//!
//! let rows = hash_join(
//!     &EvalContext::new(),
//!     &pred,
//!     &[vec![Value::Int(1), Value::Int(10)]],
//!     &[vec![Value::Int(1), Value::Int(100)], vec![Value::Int(2), Value::Int(200)]],
//! )
//! .unwrap();
//! assert_eq!(rows, vec![vec![Value::Int(1), Value::Int(10), Value::Int(100)]]);
//! ```
//!
//! Bind an ON expression:
//!
//! ```
//! use conjoin_core::DataType;
//! use conjoin_query::plan::{ColumnDescriptor, DataSourceInfo};
//! use conjoin_query::PredicateBuilder;
//!
//! let left = DataSourceInfo::new(vec![ColumnDescriptor::new("x", DataType::Int)]).with_alias("l");
//! let right = DataSourceInfo::new(vec![ColumnDescriptor::new("y", DataType::Int)]).with_alias("r");
//! let (mut pred, _info) = PredicateBuilder::new().on_sql(&left, &right, "l.x < r.y").unwrap();
//! pred.expand().unwrap();
//! pred.start().unwrap();
//! assert_eq!(pred.to_string(), " ON l.x < r.y");
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod exec;
pub mod expr;
pub mod parser;
pub mod plan;

// Re-export commonly used items at the crate root
pub use error::{ContractViolation, JoinError, JoinResult};
pub use exec::{
    hash_join, make_cross_predicate, make_equality_predicate, make_on_predicate,
    make_using_predicate, merge_join, nested_loop_join, EvalContext, JoinConfig, JoinPredicate,
    JoinSide, PredicateBuilder,
};
pub use parser::parse_expr;
