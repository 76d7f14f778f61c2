//! Array predicates, the length measure, and element extraction.
//!
//! FIRST and LAST require an array operand (fail-closed), but an empty array
//! is a recoverable "no value": they yield `null`, which downstream
//! predicates treat as missing.

use super::support::{require_arity, type_mismatch};
use super::{predicate_operator, register_operators, Operator, ValueType};
use crate::error::EvalError;
use crate::graph::Node;
use ahash::AHashMap;
use serde_json::Value;

predicate_operator!(ArrayContains, "ARRAY_CONTAINS", 2, |args| {
    match (args[0].as_array(), &args[1]) {
        (Some(items), needle) if !needle.is_null() => items.contains(needle),
        _ => false,
    }
});

predicate_operator!(ArrayIsEmpty, "ARRAY_IS_EMPTY", 1, |args| {
    matches!(args[0].as_array(), Some(items) if items.is_empty())
});

predicate_operator!(ArrayNotEmpty, "ARRAY_NOT_EMPTY", 1, |args| {
    matches!(args[0].as_array(), Some(items) if !items.is_empty())
});

pub(super) struct ArrayLength;

impl Operator for ArrayLength {
    fn name(&self) -> &'static str {
        "ARRAY_LENGTH"
    }

    fn return_type(&self) -> ValueType {
        ValueType::Number
    }

    fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
        require_arity(inputs, 1, "ARRAY_LENGTH")
    }

    fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError> {
        let items = args[0]
            .as_array()
            .ok_or_else(|| type_mismatch(node, "ARRAY_LENGTH", "Array", &args[0]))?;
        Ok(Value::from(items.len() as u64))
    }
}

/// Defines an end-element extraction (FIRST, LAST).
macro_rules! element_extraction {
    ($struct_name:ident, $name:expr, $pick:expr) => {
        pub(super) struct $struct_name;

        impl Operator for $struct_name {
            fn name(&self) -> &'static str {
                $name
            }

            fn return_type(&self) -> ValueType {
                ValueType::Any
            }

            fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
                require_arity(inputs, 1, $name)
            }

            fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError> {
                let pick: fn(&[Value]) -> Option<&Value> = $pick;
                let items = args[0]
                    .as_array()
                    .ok_or_else(|| type_mismatch(node, $name, "Array", &args[0]))?;
                Ok(pick(items).cloned().unwrap_or(Value::Null))
            }
        }
    };
}

element_extraction!(First, "FIRST", <[Value]>::first);
element_extraction!(Last, "LAST", <[Value]>::last);

pub(super) fn register(registry: &mut AHashMap<&'static str, Box<dyn Operator>>) {
    register_operators!(
        registry,
        ArrayContains,
        ArrayIsEmpty,
        ArrayNotEmpty,
        ArrayLength,
        First,
        Last,
    );
}
