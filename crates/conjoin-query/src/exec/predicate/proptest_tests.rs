//! Property-based tests for join predicates.

#![allow(clippy::unwrap_used)]

use conjoin_core::{DataType, Value};
use proptest::prelude::*;

use super::{make_cross_predicate, make_using_predicate, JoinPredicate};
use crate::exec::context::EvalContext;
use crate::plan::{ColumnDescriptor, DataSourceInfo, Name};

fn int_or_null() -> impl Strategy<Value = Value> {
    prop_oneof![1 => Just(Value::Null), 4 => (-3i64..3).prop_map(Value::Int)]
}

fn ints(width: usize, alias: &str) -> DataSourceInfo {
    DataSourceInfo::new((0..width).map(|i| ColumnDescriptor::new(format!("c{i}"), DataType::Int)).collect())
        .with_alias(alias)
}

fn using_k() -> JoinPredicate {
    let left = DataSourceInfo::new(vec![
        ColumnDescriptor::new("k", DataType::Int),
        ColumnDescriptor::new("x", DataType::Int),
    ]);
    let right = DataSourceInfo::new(vec![
        ColumnDescriptor::new("y", DataType::Int),
        ColumnDescriptor::new("k", DataType::Int),
    ]);
    make_using_predicate(&left, &right, &[Name::new("k")]).unwrap().0.into()
}

proptest! {
    #[test]
    fn cross_emits_exact_concatenation(
        left in prop::collection::vec(int_or_null(), 0..5),
        right in prop::collection::vec(int_or_null(), 0..5),
    ) {
        let (cross, info) = make_cross_predicate(&ints(left.len(), "l"), &ints(right.len(), "r")).unwrap();
        let pred = JoinPredicate::from(cross);
        let mut out = Vec::new();

        prop_assert!(pred.eval(&EvalContext::new(), &mut out, &left, &right).unwrap());
        pred.prepare_row(&mut out, &left, &right);
        prop_assert_eq!(out.len(), info.len());
        prop_assert_eq!(&out[..left.len()], left.as_slice());
        prop_assert_eq!(&out[left.len()..], right.as_slice());
    }

    #[test]
    fn using_eval_is_non_null_equality(
        lk in int_or_null(), x in int_or_null(), y in int_or_null(), rk in int_or_null(),
    ) {
        let pred = using_k();
        let matched = pred.eval(&EvalContext::new(), &mut Vec::new(), &[lk.clone(), x], &[y, rk.clone()]).unwrap();
        prop_assert_eq!(matched, !lk.is_null() && lk == rk);
    }

    #[test]
    fn using_output_coalesces(
        lk in int_or_null(), x in int_or_null(), y in int_or_null(), rk in int_or_null(),
    ) {
        let pred = using_k();
        let mut out = Vec::new();
        pred.prepare_row(&mut out, &[lk.clone(), x.clone()], &[y.clone(), rk.clone()]);

        let coalesced = if lk.is_null() { rk } else { lk };
        prop_assert_eq!(out, vec![coalesced, x, y]);
    }
}
