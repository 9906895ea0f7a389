//! Scalar expressions used by ON predicates.
//!
//! - [`bind`] - Resolving parsed expressions against a schema
//! - [`scalar`] - The bound expression tree and its rendering
//! - [`eval`] - Three-valued evaluation
//! - [`compare`] - Value comparison and the equality-function resolver
//! - [`vars`] - Position-based column lookup
//! - [`subquery`] - Subquery lifecycle hooks

pub mod bind;
pub mod compare;
mod eval;
pub mod scalar;
pub mod subquery;
pub mod vars;

pub use bind::Binder;
pub use compare::{compare_values, find_equality_fn, EqualityFn};
pub use scalar::{BinaryOp, ColumnRef, ExprDisplay, ScalarExpr, UnaryOp};
pub use subquery::{SubqueryExpr, SubqueryKind, SubqueryPlan, SubqueryPlanner};
pub use vars::{IndexedVarContainer, RowScope};
