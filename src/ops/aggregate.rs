//! Aggregates over numeric arrays.
//!
//! Aggregates are fail-closed like arithmetic: the operand must be an array
//! and every element a number. SUM of an empty array is `0`; AVG, MIN, and
//! MAX have no identity and raise on empty input instead of inventing one.

use super::support::{finite_number, operator_error, require_arity, require_number, type_mismatch};
use super::{register_operators, Operator, ValueType};
use crate::error::EvalError;
use crate::graph::Node;
use ahash::AHashMap;
use serde_json::Value;

fn numeric_operand(node: &Node, operator: &str, args: &[Value]) -> Result<Vec<f64>, EvalError> {
    let items = args[0]
        .as_array()
        .ok_or_else(|| type_mismatch(node, operator, "Array", &args[0]))?;
    items
        .iter()
        .map(|item| require_number(node, operator, item))
        .collect()
}

/// Defines an aggregate over a numeric array.
macro_rules! aggregate_operator {
    ($struct_name:ident, $name:expr, $fold:expr) => {
        pub(super) struct $struct_name;

        impl Operator for $struct_name {
            fn name(&self) -> &'static str {
                $name
            }

            fn return_type(&self) -> ValueType {
                ValueType::Number
            }

            fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
                require_arity(inputs, 1, $name)
            }

            fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError> {
                let fold: fn(Vec<f64>) -> Option<f64> = $fold;
                let numbers = numeric_operand(node, $name, args)?;
                let aggregated = fold(numbers)
                    .ok_or_else(|| operator_error(node, $name, "empty array has no aggregate"))?;
                finite_number(node, $name, aggregated)
            }
        }
    };
}

aggregate_operator!(Sum, "SUM", |numbers| Some(numbers.iter().sum()));

aggregate_operator!(Avg, "AVG", |numbers| {
    if numbers.is_empty() {
        None
    } else {
        Some(numbers.iter().sum::<f64>() / numbers.len() as f64)
    }
});

aggregate_operator!(Min, "MIN", |numbers| numbers.into_iter().reduce(f64::min));

aggregate_operator!(Max, "MAX", |numbers| numbers.into_iter().reduce(f64::max));

pub(super) fn register(registry: &mut AHashMap<&'static str, Box<dyn Operator>>) {
    register_operators!(registry, Sum, Avg, Min, Max);
}
