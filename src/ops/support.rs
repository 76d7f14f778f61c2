//! Shared arity and type-contract helpers composed by the operator groups.

use crate::error::EvalError;
use crate::graph::Node;
use serde_json::Value;

pub(super) fn require_arity(inputs: &[&Node], expected: usize, operator: &str) -> Result<(), String> {
    if inputs.len() == expected {
        Ok(())
    } else {
        Err(format!(
            "{operator} requires exactly {expected} input(s), but received {}",
            inputs.len()
        ))
    }
}

pub(super) fn require_min_arity(inputs: &[&Node], min: usize, operator: &str) -> Result<(), String> {
    if inputs.len() >= min {
        Ok(())
    } else {
        Err(format!(
            "{operator} requires at least {min} inputs, but received {}",
            inputs.len()
        ))
    }
}

/// Rejects predicate configurations whose result is statically fixed.
/// A check over nothing but constants belongs in a CONSTANT node.
pub(super) fn reject_all_constant(inputs: &[&Node], operator: &str) -> Result<(), String> {
    if !inputs.is_empty() && inputs.iter().all(|node| node.is_constant()) {
        Err(format!(
            "every input of {operator} is a constant, so its result never varies"
        ))
    } else {
        Ok(())
    }
}

/// Fail-closed numeric coercion for arithmetic and aggregate operators.
pub(super) fn require_number(node: &Node, operator: &str, value: &Value) -> Result<f64, EvalError> {
    value.as_f64().ok_or_else(|| EvalError::TypeMismatch {
        node_id: node.id,
        operation: operator.to_string(),
        expected: "Number".to_string(),
        found: value.clone(),
    })
}

pub(super) fn type_mismatch(node: &Node, operator: &str, expected: &str, found: &Value) -> EvalError {
    EvalError::TypeMismatch {
        node_id: node.id,
        operation: operator.to_string(),
        expected: expected.to_string(),
        found: found.clone(),
    }
}

pub(super) fn operator_error(node: &Node, operator: &str, message: impl Into<String>) -> EvalError {
    EvalError::Operator {
        node_id: node.id,
        operation: operator.to_string(),
        message: message.into(),
    }
}

/// Wraps a finite float back into a JSON number. Non-finite results (division
/// overflow and the like) surface as an operator error rather than `null`.
pub(super) fn finite_number(node: &Node, operator: &str, value: f64) -> Result<Value, EvalError> {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| operator_error(node, operator, format!("non-finite result {value}")))
}
