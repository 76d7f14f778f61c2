//! Numeric comparison predicates, including the three-input range checks.
//!
//! All of these are fail-open: a non-numeric operand yields `false`.

use super::{predicate_operator, register_operators, Operator};
use ahash::AHashMap;
use serde_json::Value;

fn both(args: &[Value]) -> Option<(f64, f64)> {
    Some((args[0].as_f64()?, args[1].as_f64()?))
}

fn three(args: &[Value]) -> Option<(f64, f64, f64)> {
    Some((args[0].as_f64()?, args[1].as_f64()?, args[2].as_f64()?))
}

predicate_operator!(GreaterThan, "GREATER_THAN", 2, |args| {
    matches!(both(args), Some((a, b)) if a > b)
});

predicate_operator!(GreaterOrEqual, "GREATER_OR_EQUAL", 2, |args| {
    matches!(both(args), Some((a, b)) if a >= b)
});

predicate_operator!(LessThan, "LESS_THAN", 2, |args| {
    matches!(both(args), Some((a, b)) if a < b)
});

predicate_operator!(LessOrEqual, "LESS_OR_EQUAL", 2, |args| {
    matches!(both(args), Some((a, b)) if a <= b)
});

// Input order is value, lower bound, upper bound.
predicate_operator!(Between, "BETWEEN", 3, |args| {
    matches!(three(args), Some((v, lo, hi)) if lo <= v && v <= hi)
});

predicate_operator!(NotBetween, "NOT_BETWEEN", 3, |args| {
    matches!(three(args), Some((v, lo, hi)) if v < lo || v > hi)
});

pub(super) fn register(registry: &mut AHashMap<&'static str, Box<dyn Operator>>) {
    register_operators!(
        registry,
        GreaterThan,
        GreaterOrEqual,
        LessThan,
        LessOrEqual,
        Between,
        NotBetween,
    );
}
