//! Join-time execution.
//!
//! # Modules
//!
//! - [`predicate`] - The join predicate variants and their builders
//! - [`join`] - Nested-loop, hash and merge drivers over materialized rows
//! - `context` - Per-query evaluation state ([`EvalContext`], [`JoinConfig`])

pub(crate) mod context;

pub mod join;
pub mod predicate;

// Re-exports
pub use context::{EvalContext, JoinConfig, JoinStats, DEFAULT_MAX_ROWS_IN_MEMORY};
pub use join::{hash_join, merge_join, nested_loop_join, Row};
pub use predicate::{
    make_cross_predicate, make_equality_predicate, make_on_predicate, make_using_predicate,
    CrossPredicate, EqualityPredicate, JoinPredicate, JoinSide, OnPredicate, PredicateBuilder,
};
