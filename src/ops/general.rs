//! Existence and equality predicates.
//!
//! Equality is deep JSON equality with the fail-open null rule: a null (or
//! missing) operand makes both `EQUAL` and `NOT_EQUAL` answer `false`, so
//! neither side of a comparison against absent data can fire a gate.

use super::{predicate_operator, register_operators, Operator};
use ahash::AHashMap;
use serde_json::Value;

/// Deep equality, except numbers compare by value so `8` equals `8.0`.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

predicate_operator!(Exists, "EXISTS", 1, |args| !args[0].is_null());

predicate_operator!(NotExists, "NOT_EXISTS", 1, |args| args[0].is_null());

predicate_operator!(Equal, "EQUAL", 2, |args| {
    !args[0].is_null() && !args[1].is_null() && loose_eq(&args[0], &args[1])
});

predicate_operator!(NotEqual, "NOT_EQUAL", 2, |args| {
    !args[0].is_null() && !args[1].is_null() && !loose_eq(&args[0], &args[1])
});

predicate_operator!(IsTrue, "IS_TRUE", 1, |args| args[0] == Value::Bool(true));

predicate_operator!(IsFalse, "IS_FALSE", 1, |args| args[0] == Value::Bool(false));

pub(super) fn register(registry: &mut AHashMap<&'static str, Box<dyn Operator>>) {
    register_operators!(registry, Exists, NotExists, Equal, NotEqual, IsTrue, IsFalse);
}
