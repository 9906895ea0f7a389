//! One entry point per join syntax.

use sqlparser::ast as sp;

use super::{
    make_cross_predicate, make_equality_predicate, make_on_predicate, make_using_predicate,
    JoinPredicate,
};
use crate::error::JoinResult;
use crate::expr::SubqueryPlanner;
use crate::parser::parse_expr;
use crate::plan::{natural_using_names, DataSourceInfo, Name};

/// Builds join predicates together with their output schemas.
///
/// # Example
///
/// ```
/// use conjoin_core::DataType;
/// use conjoin_query::plan::{ColumnDescriptor, DataSourceInfo, Name};
/// use conjoin_query::PredicateBuilder;
///
/// let orders = DataSourceInfo::new(vec![
///     ColumnDescriptor::new("id", DataType::Int),
///     ColumnDescriptor::new("customer_id", DataType::Int),
/// ])
/// .with_alias("o");
/// let customers = DataSourceInfo::new(vec![
///     ColumnDescriptor::new("customer_id", DataType::Int),
///     ColumnDescriptor::new("name", DataType::Text),
/// ])
/// .with_alias("c");
///
/// let (pred, info) = PredicateBuilder::new()
///     .using(&orders, &customers, &[Name::new("customer_id")])
///     .unwrap();
/// assert_eq!(info.len(), 3);
/// assert_eq!(pred.to_string(), " ON EQUALS((customer_id),(customer_id))");
/// ```
#[derive(Default)]
pub struct PredicateBuilder<'a> {
    planner: Option<&'a dyn SubqueryPlanner>,
}

impl<'a> PredicateBuilder<'a> {
    /// Creates a builder that rejects subqueries in ON expressions.
    #[must_use]
    pub fn new() -> Self {
        Self { planner: None }
    }

    /// Plans ON-expression subqueries with `planner`.
    #[must_use]
    pub fn with_planner(mut self, planner: &'a dyn SubqueryPlanner) -> Self {
        self.planner = Some(planner);
        self
    }

    /// `CROSS JOIN`.
    ///
    /// # Errors
    ///
    /// See [`make_cross_predicate`].
    pub fn cross(
        &self,
        left: &DataSourceInfo,
        right: &DataSourceInfo,
    ) -> JoinResult<(JoinPredicate, DataSourceInfo)> {
        make_cross_predicate(left, right).map(|(p, info)| (p.into(), info))
    }

    /// `JOIN ... ON <expr>`.
    ///
    /// # Errors
    ///
    /// See [`make_on_predicate`].
    pub fn on(
        &self,
        left: &DataSourceInfo,
        right: &DataSourceInfo,
        expr: &sp::Expr,
    ) -> JoinResult<(JoinPredicate, DataSourceInfo)> {
        make_on_predicate(left, right, expr, self.planner).map(|(p, info)| (p.into(), info))
    }

    /// `JOIN ... ON <sql>`, parsing the expression first.
    ///
    /// # Errors
    ///
    /// Returns a syntax error, or see [`make_on_predicate`].
    pub fn on_sql(
        &self,
        left: &DataSourceInfo,
        right: &DataSourceInfo,
        sql: &str,
    ) -> JoinResult<(JoinPredicate, DataSourceInfo)> {
        self.on(left, right, &parse_expr(sql)?)
    }

    /// `JOIN ... USING (names)`.
    ///
    /// # Errors
    ///
    /// See [`make_using_predicate`].
    pub fn using(
        &self,
        left: &DataSourceInfo,
        right: &DataSourceInfo,
        names: &[Name],
    ) -> JoinResult<(JoinPredicate, DataSourceInfo)> {
        make_using_predicate(left, right, names).map(|(p, info)| (p.into(), info))
    }

    /// An equi-join pairing differently named columns.
    ///
    /// # Errors
    ///
    /// See [`make_equality_predicate`].
    pub fn equality(
        &self,
        left: &DataSourceInfo,
        right: &DataSourceInfo,
        left_names: &[Name],
        right_names: &[Name],
    ) -> JoinResult<(JoinPredicate, DataSourceInfo)> {
        make_equality_predicate(left, right, left_names, right_names)
            .map(|(p, info)| (p.into(), info))
    }

    /// `NATURAL JOIN`: USING every visible column name both sides share.
    ///
    /// With no shared names this is a cross join.
    ///
    /// # Errors
    ///
    /// See [`make_using_predicate`] and [`make_cross_predicate`].
    pub fn natural(
        &self,
        left: &DataSourceInfo,
        right: &DataSourceInfo,
    ) -> JoinResult<(JoinPredicate, DataSourceInfo)> {
        let names = natural_using_names(left, right);
        if names.is_empty() {
            return self.cross(left, right);
        }
        let names: Vec<Name> = names.into_iter().map(Name::new).collect();
        self.using(left, right, &names)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use conjoin_core::DataType;

    use super::*;
    use crate::error::JoinError;
    use crate::plan::ColumnDescriptor;

    fn info(names: &[&str], alias: &str) -> DataSourceInfo {
        DataSourceInfo::new(names.iter().map(|n| ColumnDescriptor::new(*n, DataType::Int)).collect())
            .with_alias(alias)
    }

    #[test]
    fn natural_uses_shared_names() {
        let (pred, info) =
            PredicateBuilder::new().natural(&info(&["a", "b", "c"], "l"), &info(&["c", "a", "d"], "r")).unwrap();
        assert_eq!(pred.to_string(), " ON EQUALS((a, c),(a, c))");
        let cols: Vec<_> = info.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(cols, vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn natural_without_shared_names_is_cross() {
        let (pred, info) = PredicateBuilder::new().natural(&info(&["a"], "l"), &info(&["b"], "r")).unwrap();
        assert_eq!(pred.kind(), "CROSS");
        assert_eq!(info.len(), 2);
    }

    #[test]
    fn on_sql_reports_syntax_errors() {
        let err = PredicateBuilder::new().on_sql(&info(&["a"], "l"), &info(&["b"], "r"), "a =").unwrap_err();
        assert!(matches!(err, JoinError::SqlSyntax(_)));
    }

    #[test]
    fn on_rejects_shared_alias() {
        let err = PredicateBuilder::new().on_sql(&info(&["a"], "t"), &info(&["b"], "t"), "a = b").unwrap_err();
        assert!(matches!(err, JoinError::DuplicateSourceName(_)));
    }
}
