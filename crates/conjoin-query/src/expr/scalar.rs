//! Bound scalar expressions.
//!
//! A [`ScalarExpr`] is the result of binding an ON expression against a
//! merged schema. Column references hold positions only; names and types are
//! looked up through an [`IndexedVarContainer`] when needed.

use std::fmt;

use conjoin_core::{DataType, Value};

use super::subquery::SubqueryExpr;
use super::vars::IndexedVarContainer;
use crate::error::JoinResult;

/// A reference to a column of the merged row, by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Position in the merged schema.
    pub index: usize,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    /// Returns true for `=`, `<>`, `<`, `<=`, `>` and `>=`.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(self, Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq)
    }

    /// Returns true for `AND` and `OR`.
    #[must_use]
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        };
        f.write_str(s)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `NOT`
    Not,
    /// `-`
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Not => f.write_str("NOT "),
            Self::Neg => f.write_str("-"),
        }
    }
}

/// A type-checked scalar expression over a merged row.
#[derive(Debug)]
pub enum ScalarExpr {
    /// A column of the current row.
    Column(ColumnRef),
    /// A constant.
    Literal(Value),
    /// A positional parameter (`$1`, `$2`, ...).
    Parameter(u32),
    /// A binary operation.
    Binary {
        /// Left operand.
        left: Box<ScalarExpr>,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<ScalarExpr>,
    },
    /// A unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<ScalarExpr>,
    },
    /// `operand IS [NOT] NULL`.
    IsNull {
        /// The tested expression.
        operand: Box<ScalarExpr>,
        /// True for `IS NOT NULL`.
        negated: bool,
    },
    /// An embedded subquery.
    Subquery(SubqueryExpr),
}

impl ScalarExpr {
    /// Creates a column reference.
    #[must_use]
    pub const fn column(index: usize) -> Self {
        Self::Column(ColumnRef { index })
    }

    /// Creates a binary operation.
    #[must_use]
    pub fn binary(left: Self, op: BinaryOp, right: Self) -> Self {
        Self::Binary { left: Box::new(left), op, right: Box::new(right) }
    }

    /// Returns the type this expression evaluates to.
    #[must_use]
    pub fn data_type(&self, vars: &dyn IndexedVarContainer) -> DataType {
        match self {
            Self::Column(c) => vars.var_type(c.index).cloned().unwrap_or(DataType::Any),
            Self::Literal(v) => v.data_type(),
            Self::Parameter(_) => DataType::Any,
            Self::Binary { op, .. } if op.is_comparison() || op.is_logical() => DataType::Bool,
            Self::Binary { left, right, .. } => {
                let l = left.data_type(vars);
                let r = right.data_type(vars);
                match l.common_type(&r) {
                    Some(DataType::Null) => DataType::Any,
                    Some(t) => t,
                    None => DataType::Any,
                }
            }
            Self::Unary { op: UnaryOp::Not, .. } | Self::IsNull { .. } => DataType::Bool,
            Self::Unary { operand, .. } => operand.data_type(vars),
            Self::Subquery(s) => s.data_type(),
        }
    }

    /// Visits every embedded subquery in tree order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from `f`.
    pub fn walk_subqueries_mut(
        &mut self,
        f: &mut dyn FnMut(&mut SubqueryExpr) -> JoinResult<()>,
    ) -> JoinResult<()> {
        match self {
            Self::Column(_) | Self::Literal(_) | Self::Parameter(_) => Ok(()),
            Self::Binary { left, right, .. } => {
                left.walk_subqueries_mut(f)?;
                right.walk_subqueries_mut(f)
            }
            Self::Unary { operand, .. } | Self::IsNull { operand, .. } => {
                operand.walk_subqueries_mut(f)
            }
            Self::Subquery(s) => f(s),
        }
    }

    /// Returns true if the expression embeds any subquery.
    #[must_use]
    pub fn has_subqueries(&self) -> bool {
        match self {
            Self::Column(_) | Self::Literal(_) | Self::Parameter(_) => false,
            Self::Binary { left, right, .. } => left.has_subqueries() || right.has_subqueries(),
            Self::Unary { operand, .. } | Self::IsNull { operand, .. } => operand.has_subqueries(),
            Self::Subquery(_) => true,
        }
    }

    /// Renders the expression with qualified column names.
    #[must_use]
    pub fn display<'a>(&'a self, vars: &'a dyn IndexedVarContainer) -> ExprDisplay<'a> {
        ExprDisplay { expr: self, vars, show_types: false }
    }

    /// Renders the expression with every node annotated by its type, as
    /// `(node)[TYPE]`.
    #[must_use]
    pub fn display_with_types<'a>(&'a self, vars: &'a dyn IndexedVarContainer) -> ExprDisplay<'a> {
        ExprDisplay { expr: self, vars, show_types: true }
    }
}

/// Renders a [`ScalarExpr`] against its schema.
pub struct ExprDisplay<'a> {
    expr: &'a ScalarExpr,
    vars: &'a dyn IndexedVarContainer,
    show_types: bool,
}

impl ExprDisplay<'_> {
    fn child<'b>(&'b self, expr: &'b ScalarExpr) -> ExprDisplay<'b> {
        ExprDisplay { expr, vars: self.vars, show_types: self.show_types }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, expr: &ScalarExpr) -> fmt::Result {
        if !self.show_types && matches!(expr, ScalarExpr::Binary { .. }) {
            write!(f, "({})", self.child(expr))
        } else {
            write!(f, "{}", self.child(expr))
        }
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr {
            ScalarExpr::Column(c) => f.write_str(&self.vars.var_name(c.index)),
            ScalarExpr::Literal(v) => write!(f, "{v}"),
            ScalarExpr::Parameter(n) => write!(f, "${n}"),
            ScalarExpr::Binary { left, op, right } => {
                self.write_operand(f, left)?;
                write!(f, " {op} ")?;
                self.write_operand(f, right)
            }
            ScalarExpr::Unary { op, operand } => {
                write!(f, "{op}")?;
                self.write_operand(f, operand)
            }
            ScalarExpr::IsNull { operand, negated } => {
                self.write_operand(f, operand)?;
                f.write_str(if *negated { " IS NOT NULL" } else { " IS NULL" })
            }
            ScalarExpr::Subquery(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.show_types {
            f.write_str("(")?;
            self.write_node(f)?;
            write!(f, ")[{}]", self.expr.data_type(self.vars))
        } else {
            self.write_node(f)
        }
    }
}
