//! Join predicates.
//!
//! A [`JoinPredicate`] is built once per join node together with the join's
//! output schema, then consulted for every candidate row pair:
//!
//! 1. [`eval`](JoinPredicate::eval) decides whether the pair matches
//! 2. [`prepare_row`](JoinPredicate::prepare_row) assembles the output row,
//!    and must only be called after `eval` returned true
//! 3. [`encode`](JoinPredicate::encode) derives a hashable, sortable key from
//!    one side's row, for hash and merge strategies
//!
//! # Variants
//!
//! | Variant | SQL | Output row | Key |
//! |---------|-----|------------|-----|
//! | [`Cross`](JoinPredicate::Cross) | `CROSS JOIN` | `left ++ right` | empty |
//! | [`On`](JoinPredicate::On) | `ON <expr>` | `left ++ right` | contract violation |
//! | [`Equality`](JoinPredicate::Equality) | `USING (...)`, `NATURAL` | coalesced pairs, left rest, right rest | pair columns |
//!
//! An ON predicate must additionally be [`expand`](JoinPredicate::expand)ed
//! and then [`start`](JoinPredicate::start)ed before its first evaluation.

mod builder;
mod cross;
mod equality;
mod on;

#[cfg(test)]
mod proptest_tests;

use std::fmt;

use conjoin_core::Value;

use crate::error::{ContractViolation, JoinError, JoinResult};
use crate::exec::context::EvalContext;

pub use builder::PredicateBuilder;
pub use cross::{make_cross_predicate, CrossPredicate};
pub use equality::{make_equality_predicate, make_using_predicate, EqualityPredicate};
pub use on::{make_on_predicate, OnPredicate};

/// Which input of the join a row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum JoinSide {
    /// The left input.
    Left = 0,
    /// The right input.
    Right = 1,
}

impl TryFrom<u8> for JoinSide {
    type Error = JoinError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Left),
            1 => Ok(Self::Right),
            other => Err(ContractViolation::InvalidSide(other).into()),
        }
    }
}

/// The match condition of a two-way join.
#[derive(Debug)]
pub enum JoinPredicate {
    /// Every pair matches.
    Cross(CrossPredicate),
    /// An arbitrary boolean expression.
    On(OnPredicate),
    /// Equality over USING column pairs.
    Equality(EqualityPredicate),
}

impl JoinPredicate {
    /// Returns the variant name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Cross(_) => "CROSS",
            Self::On(_) => "ON",
            Self::Equality(_) => "EQUALITY",
        }
    }

    /// Returns true if this predicate can produce join keys.
    #[must_use]
    pub const fn is_equi_join(&self) -> bool {
        matches!(self, Self::Equality(_))
    }

    /// Runs the expand hook. Only ON predicates have work to do.
    ///
    /// # Errors
    ///
    /// See [`OnPredicate::expand`].
    pub fn expand(&mut self) -> JoinResult<()> {
        match self {
            Self::On(on) => on.expand(),
            Self::Cross(_) | Self::Equality(_) => Ok(()),
        }
    }

    /// Runs the start hook. Only ON predicates have work to do.
    ///
    /// # Errors
    ///
    /// See [`OnPredicate::start`].
    pub fn start(&mut self) -> JoinResult<()> {
        match self {
            Self::On(on) => on.start(),
            Self::Cross(_) | Self::Equality(_) => Ok(()),
        }
    }

    /// Decides whether `left` and `right` combine.
    ///
    /// `result` is scratch space: an ON predicate leaves the concatenated
    /// row in it, other variants leave it untouched.
    ///
    /// # Errors
    ///
    /// Propagates evaluation and comparison errors; an ON predicate that has
    /// not been started returns a contract violation.
    pub fn eval(
        &self,
        ctx: &EvalContext,
        result: &mut Vec<Value>,
        left: &[Value],
        right: &[Value],
    ) -> JoinResult<bool> {
        let matched = match self {
            Self::Cross(cross) => cross.eval(left, right),
            Self::On(on) => on.eval(ctx, result, left, right)?,
            Self::Equality(eq) => eq.eval(ctx, left, right)?,
        };
        ctx.record_pair(matched);
        Ok(matched)
    }

    /// Writes the output row for a pair `eval` accepted.
    pub fn prepare_row(&self, result: &mut Vec<Value>, left: &[Value], right: &[Value]) {
        match self {
            Self::Cross(cross) => cross.prepare_row(result, left, right),
            Self::On(on) => on.prepare_row(result, left, right),
            Self::Equality(eq) => eq.prepare_row(result, left, right),
        }
    }

    /// Appends the join key of `row`, which comes from `side`, to `buf` and
    /// reports whether any key column was NULL.
    ///
    /// A CROSS predicate appends nothing.
    ///
    /// # Errors
    ///
    /// Returns a contract violation for ON predicates, or a key encoding
    /// error.
    pub fn encode(
        &self,
        ctx: &EvalContext,
        buf: &mut Vec<u8>,
        row: &[Value],
        side: JoinSide,
    ) -> JoinResult<bool> {
        let contains_null = match self {
            Self::Cross(_) => return Ok(false),
            Self::On(_) => {
                return Err(ContractViolation::EncodeUnsupported { predicate: "ON" }.into())
            }
            Self::Equality(eq) => eq.encode(buf, row, side)?,
        };
        ctx.record_key_encoded();
        Ok(contains_null)
    }

    /// Registers the types of the predicate's expressions under their role.
    pub fn explain_types(&self, register: &mut dyn FnMut(&str, &str)) {
        if let Self::On(on) = self {
            on.explain_types(register);
        }
    }
}

impl fmt::Display for JoinPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cross(_) => Ok(()),
            Self::On(on) => write!(f, "{on}"),
            Self::Equality(eq) => write!(f, "{eq}"),
        }
    }
}

impl From<CrossPredicate> for JoinPredicate {
    fn from(p: CrossPredicate) -> Self {
        Self::Cross(p)
    }
}

impl From<OnPredicate> for JoinPredicate {
    fn from(p: OnPredicate) -> Self {
        Self::On(p)
    }
}

impl From<EqualityPredicate> for JoinPredicate {
    fn from(p: EqualityPredicate) -> Self {
        Self::Equality(p)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use conjoin_core::DataType;

    use super::*;
    use crate::exec::context::JoinConfig;
    use crate::plan::{ColumnDescriptor, DataSourceInfo, Name};

    fn info(names: &[&str], alias: &str) -> DataSourceInfo {
        DataSourceInfo::new(names.iter().map(|n| ColumnDescriptor::new(*n, DataType::Int)).collect())
            .with_alias(alias)
    }

    #[test]
    fn side_tags() {
        assert_eq!(JoinSide::try_from(0).unwrap(), JoinSide::Left);
        assert_eq!(JoinSide::try_from(1).unwrap(), JoinSide::Right);
        let err = JoinSide::try_from(2).unwrap_err();
        assert!(err.is_contract_violation());
        assert!(matches!(err, JoinError::Contract(ContractViolation::InvalidSide(2))));
    }

    #[test]
    fn cross_has_empty_key_and_clause() {
        let (cross, _) = make_cross_predicate(&info(&["a"], "l"), &info(&["b"], "r")).unwrap();
        let pred = JoinPredicate::from(cross);
        let mut buf = vec![7];

        assert!(!pred.encode(&EvalContext::new(), &mut buf, &[Value::Null], JoinSide::Left).unwrap());
        assert_eq!(buf, vec![7]);
        assert_eq!(pred.to_string(), "");

        let mut called = false;
        pred.explain_types(&mut |_, _| called = true);
        assert!(!called);
    }

    #[test]
    fn on_cannot_encode() {
        let expr = crate::parser::parse_expr("l.a = r.b").unwrap();
        let (on, _) = make_on_predicate(&info(&["a"], "l"), &info(&["b"], "r"), &expr, None).unwrap();
        let pred = JoinPredicate::from(on);

        let err = pred.encode(&EvalContext::new(), &mut Vec::new(), &[Value::Int(1)], JoinSide::Left);
        assert!(matches!(
            err,
            Err(JoinError::Contract(ContractViolation::EncodeUnsupported { predicate: "ON" }))
        ));
    }

    #[test]
    fn hooks_are_noops_outside_on() {
        let (eq, _) =
            make_using_predicate(&info(&["a"], "l"), &info(&["a"], "r"), &[Name::new("a")]).unwrap();
        let mut pred = JoinPredicate::from(eq);
        pred.expand().unwrap();
        pred.start().unwrap();
        pred.expand().unwrap();
        assert!(pred.is_equi_join());
        assert_eq!(pred.kind(), "EQUALITY");
    }

    #[test]
    fn dispatch_records_stats() {
        let (eq, _) =
            make_using_predicate(&info(&["a"], "l"), &info(&["a"], "r"), &[Name::new("a")]).unwrap();
        let pred = JoinPredicate::from(eq);
        let ctx = EvalContext::new().with_config(JoinConfig::new().with_stats());
        let mut scratch = Vec::new();

        pred.eval(&ctx, &mut scratch, &[Value::Int(1)], &[Value::Int(1)]).unwrap();
        pred.eval(&ctx, &mut scratch, &[Value::Int(1)], &[Value::Int(2)]).unwrap();
        pred.encode(&ctx, &mut Vec::new(), &[Value::Int(1)], JoinSide::Right).unwrap();

        assert_eq!(ctx.stats().pairs_evaluated(), 2);
        assert_eq!(ctx.stats().pairs_matched(), 1);
        assert_eq!(ctx.stats().keys_encoded(), 1);
    }
}
