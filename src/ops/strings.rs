//! String predicates and the string-length measure.

use super::support::{reject_all_constant, require_arity, type_mismatch};
use super::{predicate_operator, register_operators, Operator, ValueType};
use crate::error::EvalError;
use crate::graph::{Node, NodeKind};
use ahash::AHashMap;
use regex::Regex;
use serde_json::Value;

fn both<'a>(args: &'a [Value]) -> Option<(&'a str, &'a str)> {
    Some((args[0].as_str()?, args[1].as_str()?))
}

predicate_operator!(StringEquals, "STRING_EQUALS", 2, |args| {
    matches!(both(args), Some((a, b)) if a == b)
});

predicate_operator!(StringEqualsIgnoreCase, "STRING_EQUALS_IGNORE_CASE", 2, |args| {
    matches!(both(args), Some((a, b)) if a.eq_ignore_ascii_case(b))
});

predicate_operator!(Contains, "CONTAINS", 2, |args| {
    matches!(both(args), Some((text, needle)) if text.contains(needle))
});

predicate_operator!(StartsWith, "STARTS_WITH", 2, |args| {
    matches!(both(args), Some((text, prefix)) if text.starts_with(prefix))
});

predicate_operator!(EndsWith, "ENDS_WITH", 2, |args| {
    matches!(both(args), Some((text, suffix)) if text.ends_with(suffix))
});

predicate_operator!(StringIsEmpty, "STRING_IS_EMPTY", 1, |args| {
    matches!(args[0].as_str(), Some(text) if text.is_empty())
});

predicate_operator!(StringNotEmpty, "STRING_NOT_EMPTY", 1, |args| {
    matches!(args[0].as_str(), Some(text) if !text.is_empty())
});

/// Regex match with the pattern pinned to a constant, so an unparseable
/// pattern is caught at validation instead of during a round.
pub(super) struct MatchesRegex;

impl Operator for MatchesRegex {
    fn name(&self) -> &'static str {
        "MATCHES_REGEX"
    }

    fn return_type(&self) -> ValueType {
        ValueType::Bool
    }

    fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
        require_arity(inputs, 2, "MATCHES_REGEX")?;
        reject_all_constant(inputs, "MATCHES_REGEX")?;
        match &inputs[1].kind {
            NodeKind::Constant {
                value: Value::String(pattern),
            } => Regex::new(pattern)
                .map(|_| ())
                .map_err(|e| format!("invalid pattern: {e}")),
            _ => Err("the pattern input must be a constant string".to_string()),
        }
    }

    fn execute(&self, _node: &Node, args: &[Value]) -> Result<Value, EvalError> {
        let matched = match both(args) {
            Some((text, pattern)) => Regex::new(pattern)
                .map(|re| re.is_match(text))
                .unwrap_or(false),
            None => false,
        };
        Ok(Value::Bool(matched))
    }
}

pub(super) struct StringLength;

impl Operator for StringLength {
    fn name(&self) -> &'static str {
        "STRING_LENGTH"
    }

    fn return_type(&self) -> ValueType {
        ValueType::Number
    }

    fn validate(&self, _node: &Node, inputs: &[&Node]) -> Result<(), String> {
        require_arity(inputs, 1, "STRING_LENGTH")
    }

    fn execute(&self, node: &Node, args: &[Value]) -> Result<Value, EvalError> {
        let text = args[0]
            .as_str()
            .ok_or_else(|| type_mismatch(node, "STRING_LENGTH", "String", &args[0]))?;
        Ok(Value::from(text.chars().count() as u64))
    }
}

pub(super) fn register(registry: &mut AHashMap<&'static str, Box<dyn Operator>>) {
    register_operators!(
        registry,
        StringEquals,
        StringEqualsIgnoreCase,
        Contains,
        StartsWith,
        EndsWith,
        MatchesRegex,
        StringIsEmpty,
        StringNotEmpty,
        StringLength,
    );
}
