//! Object-key predicates and extraction.

use super::support::{require_arity, type_mismatch};
use super::{predicate_operator, register_operators, Operator, ValueType};
use crate::error::EvalError;
use crate::graph::Node;
use ahash::AHashMap;
use serde_json::Value;

predicate_operator!(HasKey, "HAS_KEY", 2, |args| {
    matches!(
        (args[0].as_object(), args[1].as_str()),
        (Some(object), Some(key)) if object.contains_key(key)
    )
});

predicate_operator!(ObjectIsEmpty, "OBJECT_IS_EMPTY", 1, |args| {
    matches!(args[0].as_object(), Some(object) if object.is_empty())
});

/// Key lookup; a missing key is a recoverable "no value" (`null`), while a
/// non-object operand or non-string key is a hard fault.
pub(super) struct GetKey;

impl Operator for GetKey {
    fn name(&self) -> &'static str {
        "GET_KEY"
    }

    fn return_type(&self) -> ValueType {
        ValueType::Any
    }

    fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
        require_arity(inputs, 2, "GET_KEY")
    }

    fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError> {
        let object = args[0]
            .as_object()
            .ok_or_else(|| type_mismatch(node, "GET_KEY", "Object", &args[0]))?;
        let key = args[1]
            .as_str()
            .ok_or_else(|| type_mismatch(node, "GET_KEY", "String", &args[1]))?;
        Ok(object.get(key).cloned().unwrap_or(Value::Null))
    }
}

pub(super) struct KeyCount;

impl Operator for KeyCount {
    fn name(&self) -> &'static str {
        "KEY_COUNT"
    }

    fn return_type(&self) -> ValueType {
        ValueType::Number
    }

    fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
        require_arity(inputs, 1, "KEY_COUNT")
    }

    fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError> {
        let object = args[0]
            .as_object()
            .ok_or_else(|| type_mismatch(node, "KEY_COUNT", "Object", &args[0]))?;
        Ok(Value::from(object.len() as u64))
    }
}

pub(super) fn register(registry: &mut AHashMap<&'static str, Box<dyn Operator>>) {
    register_operators!(registry, HasKey, GetKey, KeyCount, ObjectIsEmpty);
}
