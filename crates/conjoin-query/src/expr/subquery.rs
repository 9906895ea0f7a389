//! Subqueries embedded in ON expressions.
//!
//! Planning and running a subquery belong to the host engine. A predicate
//! only drives the two lifecycle hooks of each embedded plan and reads the
//! rows it produced.

use std::fmt;

use conjoin_core::{DataType, Value};
use sqlparser::ast as sp;

use crate::error::{JoinError, JoinResult};

/// A planned, non-correlated subquery.
pub trait SubqueryPlan: Send + fmt::Debug {
    /// Allocates the plan's resources.
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails.
    fn expand(&mut self) -> JoinResult<()>;

    /// Runs the subquery; its rows are available once this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails.
    fn start(&mut self) -> JoinResult<()>;

    /// Returns the rows produced by [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns an error if the subquery has not run.
    fn rows(&self) -> JoinResult<&[Vec<Value>]>;

    /// Renders the subquery for diagnostics.
    fn describe(&self) -> String;

    /// The type of the single column a scalar subquery yields.
    fn result_type(&self) -> DataType {
        DataType::Any
    }
}

/// Turns subquery syntax into an executable plan.
pub trait SubqueryPlanner {
    /// Plans a subquery found while binding an ON expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be planned.
    fn plan_subquery(&self, query: &sp::Query) -> JoinResult<Box<dyn SubqueryPlan>>;
}

/// How a subquery's rows become a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubqueryKind {
    /// `(SELECT ...)`: NULL for no rows, the value for one row.
    Scalar,
    /// `[NOT] EXISTS (SELECT ...)`.
    Exists {
        /// Whether the test is negated.
        negated: bool,
    },
}

/// A subquery node of a bound expression.
#[derive(Debug)]
pub struct SubqueryExpr {
    kind: SubqueryKind,
    plan: Box<dyn SubqueryPlan>,
}

impl SubqueryExpr {
    /// Wraps a planned subquery.
    #[must_use]
    pub fn new(kind: SubqueryKind, plan: Box<dyn SubqueryPlan>) -> Self {
        Self { kind, plan }
    }

    /// Returns how the subquery is consumed.
    #[must_use]
    pub const fn kind(&self) -> SubqueryKind {
        self.kind
    }

    /// Returns the type this node evaluates to.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self.kind {
            SubqueryKind::Scalar => self.plan.result_type(),
            SubqueryKind::Exists { .. } => DataType::Bool,
        }
    }

    /// Runs the plan's expand hook.
    ///
    /// # Errors
    ///
    /// Propagates the plan's error.
    pub fn expand(&mut self) -> JoinResult<()> {
        self.plan.expand()
    }

    /// Runs the plan's start hook.
    ///
    /// # Errors
    ///
    /// Propagates the plan's error.
    pub fn start(&mut self) -> JoinResult<()> {
        self.plan.start()
    }

    /// Produces this node's value from the subquery's rows.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::Subquery`] if a scalar subquery yields more than
    /// one row or more than one column.
    pub fn value(&self) -> JoinResult<Value> {
        let rows = self.plan.rows()?;
        match self.kind {
            SubqueryKind::Exists { negated } => Ok(Value::Bool(rows.is_empty() == negated)),
            SubqueryKind::Scalar => match rows {
                [] => Ok(Value::Null),
                [row] => match row.as_slice() {
                    [value] => Ok(value.clone()),
                    _ => Err(JoinError::Subquery(format!(
                        "subquery must return only one column, found {}",
                        row.len()
                    ))),
                },
                _ => Err(JoinError::Subquery(
                    "more than one row returned by a subquery used as an expression".to_string(),
                )),
            },
        }
    }
}

impl fmt::Display for SubqueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SubqueryKind::Scalar => write!(f, "({})", self.plan.describe()),
            SubqueryKind::Exists { negated: false } => write!(f, "EXISTS ({})", self.plan.describe()),
            SubqueryKind::Exists { negated: true } => {
                write!(f, "NOT EXISTS ({})", self.plan.describe())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// A subquery with fixed rows that logs its lifecycle calls.
    #[derive(Debug)]
    pub(crate) struct FixedRows {
        pub(crate) rows: Vec<Vec<Value>>,
        pub(crate) started: bool,
        pub(crate) log: Arc<Mutex<Vec<String>>>,
        pub(crate) name: &'static str,
    }

    impl FixedRows {
        pub(crate) fn new(name: &'static str, rows: Vec<Vec<Value>>) -> Self {
            Self { rows, started: false, log: Arc::default(), name }
        }
    }

    impl SubqueryPlan for FixedRows {
        fn expand(&mut self) -> JoinResult<()> {
            self.log.lock().unwrap().push(format!("expand {}", self.name));
            Ok(())
        }

        fn start(&mut self) -> JoinResult<()> {
            self.log.lock().unwrap().push(format!("start {}", self.name));
            self.started = true;
            Ok(())
        }

        fn rows(&self) -> JoinResult<&[Vec<Value>]> {
            if self.started {
                Ok(&self.rows)
            } else {
                Err(JoinError::Subquery(format!("{} has not started", self.name)))
            }
        }

        fn describe(&self) -> String {
            format!("SELECT * FROM {}", self.name)
        }
    }

    fn started(kind: SubqueryKind, rows: Vec<Vec<Value>>) -> SubqueryExpr {
        let mut expr = SubqueryExpr::new(kind, Box::new(FixedRows::new("s", rows)));
        expr.expand().unwrap();
        expr.start().unwrap();
        expr
    }

    #[test]
    fn scalar_subquery_values() {
        assert_eq!(started(SubqueryKind::Scalar, vec![]).value().unwrap(), Value::Null);
        assert_eq!(
            started(SubqueryKind::Scalar, vec![vec![Value::Int(3)]]).value().unwrap(),
            Value::Int(3)
        );

        let err = started(SubqueryKind::Scalar, vec![vec![Value::Int(1)], vec![Value::Int(2)]])
            .value()
            .unwrap_err();
        assert!(err.to_string().contains("more than one row"));

        let err = started(SubqueryKind::Scalar, vec![vec![Value::Int(1), Value::Int(2)]])
            .value()
            .unwrap_err();
        assert!(err.to_string().contains("only one column"));
    }

    #[test]
    fn exists_subquery_values() {
        let some = vec![vec![Value::Int(1)]];
        assert_eq!(
            started(SubqueryKind::Exists { negated: false }, some.clone()).value().unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            started(SubqueryKind::Exists { negated: true }, some).value().unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            started(SubqueryKind::Exists { negated: true }, vec![]).value().unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn rows_before_start_fail() {
        let expr = SubqueryExpr::new(SubqueryKind::Scalar, Box::new(FixedRows::new("s", vec![])));
        assert!(matches!(expr.value(), Err(JoinError::Subquery(_))));
        assert_eq!(expr.to_string(), "(SELECT * FROM s)");
    }
}
