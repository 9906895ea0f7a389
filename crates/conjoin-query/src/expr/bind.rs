//! Binding of parsed expressions against a schema.
//!
//! The binder turns a `sqlparser` expression into a [`ScalarExpr`]:
//! column names become positions, literals become [`Value`]s, and every
//! node is type checked against the schema's column types.

use conjoin_core::{DataType, Value};
use sqlparser::ast as sp;

use super::scalar::{BinaryOp, ScalarExpr, UnaryOp};
use super::subquery::{SubqueryExpr, SubqueryKind, SubqueryPlanner};
use crate::error::{JoinError, JoinResult};
use crate::plan::{DataSourceInfo, Name};

/// Resolves expressions against one schema.
pub struct Binder<'a> {
    info: &'a DataSourceInfo,
    planner: Option<&'a dyn SubqueryPlanner>,
    context: &'static str,
    next_anonymous: u32,
}

impl<'a> Binder<'a> {
    /// Creates a binder for expressions appearing in `context` (e.g. `ON`).
    #[must_use]
    pub fn new(info: &'a DataSourceInfo, context: &'static str) -> Self {
        Self { info, planner: None, context, next_anonymous: 0 }
    }

    /// Allows subqueries, planned by `planner`.
    #[must_use]
    pub fn with_planner(mut self, planner: &'a dyn SubqueryPlanner) -> Self {
        self.planner = Some(planner);
        self
    }

    /// Binds an expression that must produce a boolean.
    ///
    /// # Errors
    ///
    /// Returns a binding error, or [`JoinError::TypeCheck`] if the
    /// expression is not boolean.
    pub fn bind_predicate(&mut self, expr: &sp::Expr) -> JoinResult<ScalarExpr> {
        let bound = self.bind(expr)?;
        match bound.data_type(self.info) {
            DataType::Bool | DataType::Null | DataType::Any => Ok(bound),
            other => Err(JoinError::type_check(
                self.context,
                format!("argument of {} must be type BOOL, not type {other}", self.context),
            )),
        }
    }

    /// Binds an expression.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or ambiguous columns, invalid literals,
    /// operand type errors and unsupported syntax.
    pub fn bind(&mut self, expr: &sp::Expr) -> JoinResult<ScalarExpr> {
        match expr {
            sp::Expr::Identifier(ident) => self.bind_column(None, ident),
            sp::Expr::CompoundIdentifier(idents) => match idents.as_slice() {
                [ident] => self.bind_column(None, ident),
                [alias, ident] => self.bind_column(Some(alias), ident),
                _ => Err(JoinError::Unsupported(format!("column reference {expr}"))),
            },
            sp::Expr::Value(value) => self.bind_value(&value.value),
            sp::Expr::Nested(inner) => self.bind(inner),
            sp::Expr::BinaryOp { left, op, right } => {
                let op = convert_binary_op(op)?;
                let left = self.bind(left)?;
                let right = self.bind(right)?;
                self.check_binary(&left, op, &right)?;
                Ok(ScalarExpr::binary(left, op, right))
            }
            sp::Expr::UnaryOp { op, expr: inner } => {
                let operand = self.bind(inner)?;
                let t = operand.data_type(self.info);
                match op {
                    sp::UnaryOperator::Not => {
                        self.expect_bool("NOT", &t)?;
                        Ok(ScalarExpr::Unary { op: UnaryOp::Not, operand: Box::new(operand) })
                    }
                    sp::UnaryOperator::Minus => {
                        self.expect_numeric("-", &t)?;
                        Ok(ScalarExpr::Unary { op: UnaryOp::Neg, operand: Box::new(operand) })
                    }
                    sp::UnaryOperator::Plus => {
                        self.expect_numeric("+", &t)?;
                        Ok(operand)
                    }
                    _ => Err(JoinError::Unsupported(format!("unary operator {op}"))),
                }
            }
            sp::Expr::IsNull(inner) => {
                Ok(ScalarExpr::IsNull { operand: Box::new(self.bind(inner)?), negated: false })
            }
            sp::Expr::IsNotNull(inner) => {
                Ok(ScalarExpr::IsNull { operand: Box::new(self.bind(inner)?), negated: true })
            }
            sp::Expr::Subquery(query) => self.bind_subquery(SubqueryKind::Scalar, query),
            sp::Expr::Exists { subquery, negated } => {
                self.bind_subquery(SubqueryKind::Exists { negated: *negated }, subquery)
            }
            _ => Err(JoinError::Unsupported(format!("expression {expr}"))),
        }
    }

    fn bind_column(&self, alias: Option<&sp::Ident>, ident: &sp::Ident) -> JoinResult<ScalarExpr> {
        let column = Name::from(ident.clone());
        let normalized = column.normalize();
        let (display, matches) = match alias {
            None => (column.to_string(), self.info.visible_matches(&normalized).collect::<Vec<_>>()),
            Some(alias) => {
                let alias = Name::from(alias.clone());
                let display = format!("{alias}.{column}");
                let matches = self
                    .info
                    .qualified_matches(&alias.normalize(), &normalized)
                    .ok_or_else(|| JoinError::UnknownColumn(display.clone()))?;
                (display, matches)
            }
        };
        match matches.as_slice() {
            [index] => Ok(ScalarExpr::column(*index)),
            [] => Err(JoinError::UnknownColumn(display)),
            _ => Err(JoinError::AmbiguousColumn(display)),
        }
    }

    fn bind_value(&mut self, value: &sp::Value) -> JoinResult<ScalarExpr> {
        let literal = match value {
            sp::Value::Null => Value::Null,
            sp::Value::Boolean(b) => Value::Bool(*b),
            sp::Value::Number(n, _) => {
                if let Ok(i) = n.parse::<i64>() {
                    Value::Int(i)
                } else if let Ok(f) = n.parse::<f64>() {
                    Value::Float(f)
                } else {
                    return Err(JoinError::type_check(self.context, format!("invalid number: {n}")));
                }
            }
            sp::Value::SingleQuotedString(s) => Value::String(s.clone()),
            sp::Value::Placeholder(p) => return self.bind_placeholder(p),
            _ => return Err(JoinError::Unsupported(format!("literal {value}"))),
        };
        Ok(ScalarExpr::Literal(literal))
    }

    fn bind_placeholder(&mut self, placeholder: &str) -> JoinResult<ScalarExpr> {
        if placeholder == "?" {
            self.next_anonymous += 1;
            return Ok(ScalarExpr::Parameter(self.next_anonymous));
        }
        placeholder
            .strip_prefix('$')
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|&n| n > 0)
            .map(ScalarExpr::Parameter)
            .ok_or_else(|| JoinError::Unsupported(format!("placeholder {placeholder}")))
    }

    fn bind_subquery(&self, kind: SubqueryKind, query: &sp::Query) -> JoinResult<ScalarExpr> {
        let planner = self
            .planner
            .ok_or_else(|| JoinError::Unsupported("subqueries in this context".to_string()))?;
        let plan = planner.plan_subquery(query)?;
        Ok(ScalarExpr::Subquery(SubqueryExpr::new(kind, plan)))
    }

    fn check_binary(&self, left: &ScalarExpr, op: BinaryOp, right: &ScalarExpr) -> JoinResult<()> {
        let l = left.data_type(self.info);
        let r = right.data_type(self.info);
        if op.is_comparison() {
            if !l.is_comparable_to(&r) {
                return Err(JoinError::type_check(
                    self.context,
                    format!("unsupported comparison operator: <{l}> {op} <{r}>"),
                ));
            }
        } else if op.is_logical() {
            self.expect_bool(&op.to_string(), &l)?;
            self.expect_bool(&op.to_string(), &r)?;
        } else {
            self.expect_numeric(&op.to_string(), &l)?;
            self.expect_numeric(&op.to_string(), &r)?;
        }
        Ok(())
    }

    fn expect_bool(&self, op: &str, t: &DataType) -> JoinResult<()> {
        match t {
            DataType::Bool | DataType::Null | DataType::Any => Ok(()),
            _ => Err(JoinError::type_check(
                self.context,
                format!("incompatible {op} argument type: {t}"),
            )),
        }
    }

    fn expect_numeric(&self, op: &str, t: &DataType) -> JoinResult<()> {
        if t.is_numeric() || matches!(t, DataType::Null | DataType::Any) {
            Ok(())
        } else {
            Err(JoinError::type_check(
                self.context,
                format!("unsupported operand type for {op}: {t}"),
            ))
        }
    }
}

fn convert_binary_op(op: &sp::BinaryOperator) -> JoinResult<BinaryOp> {
    match op {
        sp::BinaryOperator::Plus => Ok(BinaryOp::Add),
        sp::BinaryOperator::Minus => Ok(BinaryOp::Sub),
        sp::BinaryOperator::Multiply => Ok(BinaryOp::Mul),
        sp::BinaryOperator::Divide => Ok(BinaryOp::Div),
        sp::BinaryOperator::Modulo => Ok(BinaryOp::Mod),
        sp::BinaryOperator::Eq => Ok(BinaryOp::Eq),
        sp::BinaryOperator::NotEq => Ok(BinaryOp::NotEq),
        sp::BinaryOperator::Lt => Ok(BinaryOp::Lt),
        sp::BinaryOperator::LtEq => Ok(BinaryOp::LtEq),
        sp::BinaryOperator::Gt => Ok(BinaryOp::Gt),
        sp::BinaryOperator::GtEq => Ok(BinaryOp::GtEq),
        sp::BinaryOperator::And => Ok(BinaryOp::And),
        sp::BinaryOperator::Or => Ok(BinaryOp::Or),
        _ => Err(JoinError::Unsupported(format!("binary operator {op}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::expr::subquery::tests::FixedRows;
    use crate::expr::subquery::SubqueryPlan;
    use crate::parser::parse_expr;
    use crate::plan::ColumnDescriptor;

    fn merged() -> DataSourceInfo {
        let left = DataSourceInfo::new(vec![
            ColumnDescriptor::new("a", DataType::Int),
            ColumnDescriptor::new("b", DataType::Text),
            ColumnDescriptor::hidden("rowid", DataType::Int),
        ])
        .with_alias("l");
        let right = DataSourceInfo::new(vec![
            ColumnDescriptor::new("a", DataType::Float),
            ColumnDescriptor::new("c", DataType::Bool),
        ])
        .with_alias("r");
        DataSourceInfo::concat(&left, &right).unwrap()
    }

    fn bind(sql: &str) -> JoinResult<ScalarExpr> {
        let info = merged();
        Binder::new(&info, "ON").bind_predicate(&parse_expr(sql).unwrap())
    }

    #[test]
    fn binds_qualified_columns() {
        let info = merged();
        let expr = Binder::new(&info, "ON").bind_predicate(&parse_expr("l.a = r.a AND c").unwrap());
        assert_eq!(expr.unwrap().display(&info).to_string(), "(l.a = r.a) AND r.c");
    }

    #[test]
    fn unqualified_ambiguity() {
        assert!(matches!(bind("a = 1"), Err(JoinError::AmbiguousColumn(ref c)) if c == "a"));
        assert!(matches!(bind("zz = 1"), Err(JoinError::UnknownColumn(_))));
        assert!(matches!(bind("rowid = 1"), Err(JoinError::UnknownColumn(_))));
        assert!(matches!(bind("x.a = 1"), Err(JoinError::UnknownColumn(ref c)) if c == "x.a"));
    }

    #[test]
    fn identifiers_fold_case() {
        assert!(bind("L.A = R.A").is_ok());
        assert!(matches!(bind("l.\"A\" = 1"), Err(JoinError::UnknownColumn(_))));
    }

    #[test]
    fn type_checks() {
        assert!(matches!(bind("l.a = b"), Err(JoinError::TypeCheck { .. })));
        assert!(matches!(bind("l.a + 1"), Err(JoinError::TypeCheck { .. })));
        assert!(matches!(bind("c AND l.a"), Err(JoinError::TypeCheck { .. })));
        assert!(matches!(bind("b + 1 = 2"), Err(JoinError::TypeCheck { .. })));
        assert!(bind("l.a + 1 > r.a * 2.5").is_ok());
        assert!(bind("NULL").is_ok());
        assert!(bind("b IS NOT NULL OR NOT c").is_ok());
    }

    #[test]
    fn parameters() {
        let info = merged();
        let expr = Binder::new(&info, "ON").bind_predicate(&parse_expr("l.a = $2").unwrap()).unwrap();
        assert_eq!(expr.display(&info).to_string(), "l.a = $2");
        assert!(matches!(bind("l.a = $0"), Err(JoinError::Unsupported(_))));
    }

    #[test]
    fn unsupported_syntax() {
        assert!(matches!(bind("l.a BETWEEN 1 AND 2"), Err(JoinError::Unsupported(_))));
        assert!(matches!(bind("EXISTS (SELECT 1)"), Err(JoinError::Unsupported(_))));
    }

    struct Planner;

    impl SubqueryPlanner for Planner {
        fn plan_subquery(&self, _query: &sp::Query) -> JoinResult<Box<dyn SubqueryPlan>> {
            Ok(Box::new(FixedRows::new("s", vec![])))
        }
    }

    #[test]
    fn subqueries_need_a_planner() {
        let info = merged();
        let expr = Binder::new(&info, "ON")
            .with_planner(&Planner)
            .bind_predicate(&parse_expr("NOT EXISTS (SELECT 1) AND l.a = (SELECT 2)").unwrap())
            .unwrap();
        assert!(expr.has_subqueries());
        assert_eq!(
            expr.display(&info).to_string(),
            "NOT EXISTS (SELECT * FROM s) AND (l.a = (SELECT * FROM s))"
        );
    }
}
