//! Boolean combinators.
//!
//! These follow the fail-open predicate rule: any non-boolean operand makes
//! the combinator answer `false` instead of raising.

use super::support::{reject_all_constant, require_min_arity};
use super::{predicate_operator, register_operators, Operator, ValueType};
use crate::error::EvalError;
use crate::graph::Node;
use ahash::AHashMap;
use serde_json::Value;

/// Defines a variadic boolean combinator (AND, OR).
macro_rules! variadic_boolean {
    ($struct_name:ident, $name:expr, $test:expr) => {
        pub(super) struct $struct_name;

        impl Operator for $struct_name {
            fn name(&self) -> &'static str {
                $name
            }

            fn return_type(&self) -> ValueType {
                ValueType::Bool
            }

            fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
                require_min_arity(inputs, 2, $name)?;
                reject_all_constant(inputs, $name)
            }

            fn execute(&self, _node: &Node, args: &[Value]) -> Result<Value, EvalError> {
                let test: fn(&[Value]) -> bool = $test;
                let all_bools = args.iter().all(|arg| arg.as_bool().is_some());
                Ok(Value::Bool(all_bools && test(args)))
            }
        }
    };
}

variadic_boolean!(And, "AND", |args| {
    args.iter().all(|arg| arg.as_bool() == Some(true))
});

variadic_boolean!(Or, "OR", |args| {
    args.iter().any(|arg| arg.as_bool() == Some(true))
});

predicate_operator!(Not, "NOT", 1, |args| args[0] == Value::Bool(false));

predicate_operator!(Xor, "XOR", 2, |args| {
    matches!(
        (args[0].as_bool(), args[1].as_bool()),
        (Some(a), Some(b)) if a != b
    )
});

pub(super) fn register(registry: &mut AHashMap<&'static str, Box<dyn Operator>>) {
    register_operators!(registry, And, Or, Not, Xor);
}
