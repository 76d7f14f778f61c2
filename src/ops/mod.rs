//! The operator catalog: stateless predicate/arithmetic strategies keyed by
//! name.
//!
//! Every operator declares its arity/type contract through `validate` and a
//! static `return_type`, and computes through `execute` against the already
//! evaluated input results. Two execution disciplines coexist:
//!
//! - **Predicates** (return type `Bool`) are fail-open: missing, null, or
//!   mistyped operands yield `false`, never an error. Once validated, a
//!   predicate is total over its inputs.
//! - **Arithmetic, aggregates, and measures** are fail-closed: an invalid
//!   runtime operand aborts the evaluation round with a typed error carrying
//!   the offending node id.

use crate::error::EvalError;
use crate::graph::Node;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;

mod aggregate;
mod arithmetic;
mod array;
mod boolean;
mod datetime;
mod general;
mod numeric;
mod object;
mod strings;
mod support;

/// Coarse value classification used for operator return types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Number,
    String,
    Array,
    Object,
    /// Value-shape depends on runtime data (extractions).
    Any,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "Bool",
            ValueType::Number => "Number",
            ValueType::String => "String",
            ValueType::Array => "Array",
            ValueType::Object => "Object",
            ValueType::Any => "Any",
        };
        write!(f, "{name}")
    }
}

/// An immutable operator strategy.
///
/// Implementations are stateless; one instance serves every graph.
pub trait Operator: Send + Sync {
    fn name(&self) -> &'static str;

    fn return_type(&self) -> ValueType;

    /// Checks the node's structural contract: arity, operand kinds, and
    /// degenerate all-constant configurations. Raised at deploy time and
    /// collected into the validation report, never thrown mid-evaluation.
    fn validate(&self, node: &Node, inputs: &[&Node]) -> Result<(), String>;

    /// Computes the operator over the already evaluated input results,
    /// in declared argument order.
    fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError>;
}

/// Defines a fixed-arity, fail-open predicate operator.
macro_rules! predicate_operator {
    ($struct_name:ident, $name:expr, $arity:expr, $test:expr) => {
        pub(super) struct $struct_name;

        impl crate::ops::Operator for $struct_name {
            fn name(&self) -> &'static str {
                $name
            }

            fn return_type(&self) -> crate::ops::ValueType {
                crate::ops::ValueType::Bool
            }

            fn validate(
                &self,
                _node: &crate::graph::Node,
                inputs: &[&crate::graph::Node],
            ) -> Result<(), String> {
                crate::ops::support::require_arity(inputs, $arity, $name)?;
                crate::ops::support::reject_all_constant(inputs, $name)
            }

            fn execute(
                &self,
                _node: &crate::graph::Node,
                args: &[serde_json::Value],
            ) -> Result<serde_json::Value, crate::error::EvalError> {
                let test: fn(&[serde_json::Value]) -> bool = $test;
                Ok(serde_json::Value::Bool(test(args)))
            }
        }
    };
}

/// Registers operator instances into the catalog map.
macro_rules! register_operators {
    ($registry:expr, $( $op:expr ),* $(,)?) => {
        $(
            {
                let op = $op;
                $registry.insert(crate::ops::Operator::name(&op), Box::new(op) as Box<dyn crate::ops::Operator>);
            }
        )*
    };
}

pub(crate) use predicate_operator;
pub(crate) use register_operators;

static REGISTRY: Lazy<AHashMap<&'static str, Box<dyn Operator>>> = Lazy::new(|| {
    let mut registry: AHashMap<&'static str, Box<dyn Operator>> = AHashMap::new();
    general::register(&mut registry);
    numeric::register(&mut registry);
    arithmetic::register(&mut registry);
    boolean::register(&mut registry);
    strings::register(&mut registry);
    array::register(&mut registry);
    aggregate::register(&mut registry);
    object::register(&mut registry);
    datetime::register(&mut registry);
    registry
});

/// Looks up an operator by its wire name.
pub fn lookup(name: &str) -> Option<&'static dyn Operator> {
    REGISTRY.get(name).map(|op| op.as_ref())
}

/// All registered operator names, unordered.
pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.keys().copied()
}
