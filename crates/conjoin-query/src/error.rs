//! Error types for predicate construction and evaluation.
//!
//! [`JoinError`] covers everything a user's SQL can trigger: bad USING
//! lists, unresolvable ON expressions, runtime evaluation failures.
//! [`ContractViolation`] is kept apart from it: those errors can only come
//! from a defect in the calling join operator, so they must never be
//! retried or surfaced as a SQL error.

use conjoin_core::CoreError;
use thiserror::Error;

/// Misuse of a predicate by its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// `encode` was called on a predicate that has no join key.
    #[error("{predicate} predicate does not support key encoding")]
    EncodeUnsupported {
        /// The predicate variant.
        predicate: &'static str,
    },

    /// A raw side tag was neither left nor right.
    #[error("invalid side {0} provided, only left (0) or right (1) applicable")]
    InvalidSide(u8),

    /// A lifecycle hook or evaluation was called out of order.
    #[error("{operation} called on a predicate that is {state}")]
    Lifecycle {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the predicate was in.
        state: &'static str,
    },
}

/// Errors raised while building or evaluating a join predicate.
#[derive(Debug, Error)]
pub enum JoinError {
    /// The two USING column lists have different lengths.
    #[error("left columns' length {left} doesn't match right columns' length {right} in equality predicate")]
    UsingLengthMismatch {
        /// Number of left column names.
        left: usize,
        /// Number of right column names.
        right: usize,
    },

    /// A USING column was named twice.
    #[error("column \"{0}\" appears more than once in USING clause")]
    DuplicateUsingColumn(String),

    /// A USING column does not exist on one side.
    #[error("column \"{column}\" specified in USING clause does not exist in {side} table")]
    UsingColumnNotFound {
        /// The normalized column name.
        column: String,
        /// `left` or `right`.
        side: &'static str,
    },

    /// No equality function exists between the two USING column types.
    #[error("JOIN/USING types {left_type} for left column {left_column} and {right_type} for right column {right_column} cannot be matched")]
    IncomparableUsingTypes {
        /// Left column type.
        left_type: String,
        /// Left column name.
        left_column: String,
        /// Right column type.
        right_type: String,
        /// Right column name.
        right_column: String,
    },

    /// The same source alias appears on both sides of a concatenating join.
    #[error("source name \"{0}\" specified more than once (missing AS clause?)")]
    DuplicateSourceName(String),

    /// An ON expression names a column that does not exist.
    #[error("column \"{0}\" does not exist")]
    UnknownColumn(String),

    /// An unqualified ON column name matches more than one column.
    #[error("column reference \"{0}\" is ambiguous")]
    AmbiguousColumn(String),

    /// An ON expression failed type checking.
    #[error("{context}: {message}")]
    TypeCheck {
        /// Where the expression appears (e.g. `ON`).
        context: &'static str,
        /// What went wrong.
        message: String,
    },

    /// The ON expression uses syntax this engine cannot bind.
    #[error("unsupported feature: {0}")]
    Unsupported(String),

    /// The ON expression text could not be parsed.
    #[error("SQL syntax error: {0}")]
    SqlSyntax(String),

    /// A runtime failure inside a scalar expression.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// A value did not have the type its comparator was resolved for.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: String,
        /// The actual type.
        actual: String,
    },

    /// An error from the core crate (key encoding).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An embedded subquery failed.
    #[error("subquery error: {0}")]
    Subquery(String),

    /// The caller cancelled the join.
    #[error("join cancelled")]
    Cancelled,

    /// A join driver would materialize more rows than allowed.
    #[error("query too large: {actual} rows exceeds limit of {limit}")]
    QueryTooLarge {
        /// Rows materialized so far.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The predicate was misused by its caller.
    #[error("internal error: {0}")]
    Contract(#[from] ContractViolation),
}

impl JoinError {
    /// Returns true if this error signals a defect in the caller rather than
    /// a problem with the query or its data.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Contract(_))
    }

    /// Creates a type-check error for an expression appearing in `context`.
    #[must_use]
    pub fn type_check(context: &'static str, message: impl Into<String>) -> Self {
        Self::TypeCheck { context, message: message.into() }
    }
}

impl From<sqlparser::parser::ParserError> for JoinError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        Self::SqlSyntax(err.to_string())
    }
}

/// Result type for predicate operations.
pub type JoinResult<T> = Result<T, JoinError>;
