//! ON-clause predicate.
//!
//! The filter is bound once against the concatenated schema. Its column
//! references are plain positions; at evaluation time the concatenated row
//! is lent to the filter through a [`RowScope`] for exactly one call. The
//! predicate therefore never holds a pointer into itself and can be moved
//! freely, but it is deliberately not `Clone`: embedded subquery plans are
//! owned by exactly one predicate.

use std::fmt;

use conjoin_core::Value;
use sqlparser::ast as sp;
use tracing::{debug, trace};

use super::cross::concat_into;
use crate::error::{ContractViolation, JoinResult};
use crate::exec::context::EvalContext;
use crate::expr::{Binder, RowScope, ScalarExpr, SubqueryPlanner};
use crate::plan::DataSourceInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Constructed,
    Expanded,
    Ready,
}

impl Stage {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Constructed => "not yet expanded",
            Self::Expanded => "expanded but not started",
            Self::Ready => "already started",
        }
    }
}

/// A predicate evaluating an arbitrary boolean expression over the
/// concatenated row.
///
/// [`expand`](Self::expand) and then [`start`](Self::start) must each run
/// once before the first [`eval`](Self::eval).
#[derive(Debug)]
pub struct OnPredicate {
    filter: ScalarExpr,
    info: DataSourceInfo,
    stage: Stage,
}

impl OnPredicate {
    /// Returns the bound filter.
    #[must_use]
    pub fn filter(&self) -> &ScalarExpr {
        &self.filter
    }

    /// Returns the schema the filter is bound against.
    #[must_use]
    pub fn info(&self) -> &DataSourceInfo {
        &self.info
    }

    /// Returns true once `start` has run.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.stage == Stage::Ready
    }

    fn require(&self, stage: Stage, operation: &'static str) -> JoinResult<()> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(ContractViolation::Lifecycle { operation, state: self.stage.as_str() }.into())
        }
    }

    /// Runs the expand hook of every embedded subquery, in tree order.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if called twice, or the first subquery
    /// error.
    pub fn expand(&mut self) -> JoinResult<()> {
        self.require(Stage::Constructed, "expand")?;
        self.filter.walk_subqueries_mut(&mut |s| {
            trace!(subquery = %s, "expanding subquery");
            s.expand()
        })?;
        self.stage = Stage::Expanded;
        Ok(())
    }

    /// Runs the start hook of every embedded subquery, in tree order.
    ///
    /// # Errors
    ///
    /// Returns a contract violation unless called once after `expand`, or
    /// the first subquery error.
    pub fn start(&mut self) -> JoinResult<()> {
        self.require(Stage::Expanded, "start")?;
        self.filter.walk_subqueries_mut(&mut |s| {
            trace!(subquery = %s, "starting subquery");
            s.start()
        })?;
        self.stage = Stage::Ready;
        Ok(())
    }

    /// Writes `left ++ right` into `result` and evaluates the filter on it.
    ///
    /// Only a `TRUE` result accepts the pair; `FALSE` and `NULL` reject it.
    ///
    /// # Errors
    ///
    /// Returns a contract violation before `start`, or the filter's
    /// evaluation error.
    pub fn eval(
        &self,
        ctx: &EvalContext,
        result: &mut Vec<Value>,
        left: &[Value],
        right: &[Value],
    ) -> JoinResult<bool> {
        self.require(Stage::Ready, "eval")?;
        concat_into(result, left, right);
        let value = self.filter.eval(ctx, &RowScope::new(&self.info, result))?;
        Ok(value.as_bool() == Some(true))
    }

    /// Writes `left ++ right` into `result`.
    #[inline]
    pub fn prepare_row(&self, result: &mut Vec<Value>, left: &[Value], right: &[Value]) {
        concat_into(result, left, right);
    }

    /// Registers the filter rendered with its types.
    pub fn explain_types(&self, register: &mut dyn FnMut(&str, &str)) {
        register("filter", &self.filter.display_with_types(&self.info).to_string());
    }
}

impl fmt::Display for OnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ON {}", self.filter.display(&self.info))
    }
}

/// Builds an ON predicate and its output schema.
///
/// `planner` is required if the expression contains subqueries.
///
/// # Errors
///
/// Returns an error if the inputs share an alias or the expression cannot
/// be bound as a boolean over the concatenated schema.
pub fn make_on_predicate(
    left: &DataSourceInfo,
    right: &DataSourceInfo,
    expr: &sp::Expr,
    planner: Option<&dyn SubqueryPlanner>,
) -> JoinResult<(OnPredicate, DataSourceInfo)> {
    let info = DataSourceInfo::concat(left, right)?;
    let mut binder = Binder::new(&info, "ON");
    if let Some(planner) = planner {
        binder = binder.with_planner(planner);
    }
    let filter = binder.bind_predicate(expr)?;
    debug!(width = info.len(), filter = %filter.display(&info), "built ON join predicate");

    let pred = OnPredicate { filter, info: info.clone(), stage: Stage::Constructed };
    Ok((pred, info))
}
