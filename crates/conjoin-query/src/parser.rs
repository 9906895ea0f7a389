//! Parsing of standalone ON expressions.

use sqlparser::ast as sp;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

use crate::error::{JoinError, JoinResult};

/// Parses a boolean expression such as `l.a = r.a AND r.b > 1`.
///
/// # Errors
///
/// Returns [`JoinError::SqlSyntax`] if the text is empty, is not a single
/// well-formed expression, or has trailing input.
pub fn parse_expr(sql: &str) -> JoinResult<sp::Expr> {
    if sql.trim().is_empty() {
        return Err(JoinError::SqlSyntax("empty expression".to_string()));
    }
    let dialect = GenericDialect {};
    let mut parser = Parser::new(&dialect).try_with_sql(sql)?;
    let expr = parser.parse_expr()?;
    let next = parser.peek_token();
    if next.token != Token::EOF {
        return Err(JoinError::SqlSyntax(format!("unexpected {} after expression", next.token)));
    }
    Ok(expr)
}
