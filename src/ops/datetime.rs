//! Timestamp predicates over RFC 3339 strings.
//!
//! Comparison predicates are fail-open: an operand that is not a parseable
//! RFC 3339 string yields `false`. DAYS_BETWEEN produces a number and is
//! fail-closed like the arithmetic operators.

use super::support::{finite_number, type_mismatch};
use super::{predicate_operator, register_operators, Operator, ValueType};
use crate::error::EvalError;
use crate::graph::Node;
use ahash::AHashMap;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;

fn parse_timestamp(value: &Value) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.as_str()?).ok()
}

fn both(args: &[Value]) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    Some((parse_timestamp(&args[0])?, parse_timestamp(&args[1])?))
}

predicate_operator!(DateBefore, "DATE_BEFORE", 2, |args| {
    matches!(both(args), Some((a, b)) if a < b)
});

predicate_operator!(DateAfter, "DATE_AFTER", 2, |args| {
    matches!(both(args), Some((a, b)) if a > b)
});

predicate_operator!(DateEquals, "DATE_EQUALS", 2, |args| {
    matches!(both(args), Some((a, b)) if a == b)
});

// Input order is value, lower bound, upper bound.
predicate_operator!(DateBetween, "DATE_BETWEEN", 3, |args| {
    match (
        parse_timestamp(&args[0]),
        parse_timestamp(&args[1]),
        parse_timestamp(&args[2]),
    ) {
        (Some(v), Some(lo), Some(hi)) => lo <= v && v <= hi,
        _ => false,
    }
});

/// Signed whole days from the first timestamp to the second.
pub(super) struct DaysBetween;

impl Operator for DaysBetween {
    fn name(&self) -> &'static str {
        "DAYS_BETWEEN"
    }

    fn return_type(&self) -> ValueType {
        ValueType::Number
    }

    fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
        super::support::require_arity(inputs, 2, "DAYS_BETWEEN")
    }

    fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError> {
        let from = parse_timestamp(&args[0])
            .ok_or_else(|| type_mismatch(node, "DAYS_BETWEEN", "RFC 3339 timestamp", &args[0]))?;
        let to = parse_timestamp(&args[1])
            .ok_or_else(|| type_mismatch(node, "DAYS_BETWEEN", "RFC 3339 timestamp", &args[1]))?;
        finite_number(node, "DAYS_BETWEEN", (to - from).num_days() as f64)
    }
}

pub(super) fn register(registry: &mut AHashMap<&'static str, Box<dyn Operator>>) {
    register_operators!(
        registry,
        DateBefore,
        DateAfter,
        DateEquals,
        DateBetween,
        DaysBetween,
    );
}
