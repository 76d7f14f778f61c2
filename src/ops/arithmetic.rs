//! Arithmetic operators.
//!
//! Unlike the predicates, arithmetic is fail-closed: a non-numeric operand
//! at execution aborts the evaluation round with a typed error. A silent
//! `false` here would turn a real data fault into a missed transformation.

use super::support::{finite_number, operator_error, require_arity, require_min_arity, require_number};
use super::{register_operators, Operator, ValueType};
use crate::error::EvalError;
use crate::graph::Node;
use ahash::AHashMap;
use serde_json::Value;

/// Defines a variadic reduction over numeric operands (ADD, MULTIPLY).
macro_rules! variadic_arithmetic {
    ($struct_name:ident, $name:expr, $reduce:expr) => {
        pub(super) struct $struct_name;

        impl Operator for $struct_name {
            fn name(&self) -> &'static str {
                $name
            }

            fn return_type(&self) -> ValueType {
                ValueType::Number
            }

            fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
                require_min_arity(inputs, 2, $name)
            }

            fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError> {
                let reduce: fn(f64, f64) -> f64 = $reduce;
                let mut operands = args.iter();
                let first = require_number(node, $name, operands.next().unwrap_or(&Value::Null))?;
                let mut accumulator = first;
                for operand in operands {
                    accumulator = reduce(accumulator, require_number(node, $name, operand)?);
                }
                finite_number(node, $name, accumulator)
            }
        }
    };
}

/// Defines a unary numeric transform (ABS, ROUND).
macro_rules! unary_arithmetic {
    ($struct_name:ident, $name:expr, $transform:expr) => {
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
                let transform: fn(f64) -> f64 = $transform;
                let operand = require_number(node, $name, &args[0])?;
                finite_number(node, $name, transform(operand))
            }
        }
    };
}

variadic_arithmetic!(Add, "ADD", |a, b| a + b);
variadic_arithmetic!(Multiply, "MULTIPLY", |a, b| a * b);

unary_arithmetic!(Abs, "ABS", f64::abs);
unary_arithmetic!(Round, "ROUND", f64::round);

pub(super) struct Subtract;

impl Operator for Subtract {
    fn name(&self) -> &'static str {
        "SUBTRACT"
    }

    fn return_type(&self) -> ValueType {
        ValueType::Number
    }

    fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
        require_arity(inputs, 2, "SUBTRACT")
    }

    fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError> {
        let minuend = require_number(node, "SUBTRACT", &args[0])?;
        let subtrahend = require_number(node, "SUBTRACT", &args[1])?;
        finite_number(node, "SUBTRACT", minuend - subtrahend)
    }
}

pub(super) struct Divide;

impl Operator for Divide {
    fn name(&self) -> &'static str {
        "DIVIDE"
    }

    fn return_type(&self) -> ValueType {
        ValueType::Number
    }

    fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
        require_arity(inputs, 2, "DIVIDE")
    }

    fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError> {
        let dividend = require_number(node, "DIVIDE", &args[0])?;
        let divisor = require_number(node, "DIVIDE", &args[1])?;
        if divisor == 0.0 {
            return Err(operator_error(node, "DIVIDE", "division by zero"));
        }
        finite_number(node, "DIVIDE", dividend / divisor)
    }
}

pub(super) struct Modulo;

impl Operator for Modulo {
    fn name(&self) -> &'static str {
        "MODULO"
    }

    fn return_type(&self) -> ValueType {
        ValueType::Number
    }

    fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
        require_arity(inputs, 2, "MODULO")
    }

    fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError> {
        let dividend = require_number(node, "MODULO", &args[0])?;
        let divisor = require_number(node, "MODULO", &args[1])?;
        if divisor == 0.0 {
            return Err(operator_error(node, "MODULO", "modulo by zero"));
        }
        finite_number(node, "MODULO", dividend % divisor)
    }
}

pub(super) fn register(registry: &mut AHashMap<&'static str, Box<dyn Operator>>) {
    register_operators!(registry, Add, Subtract, Multiply, Divide, Modulo, Abs, Round);
}
