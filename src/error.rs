use crate::graph::NodeId;
use serde_json::Value;
use thiserror::Error;

/// A single defect found while validating a graph definition.
///
/// Validation never stops at the first problem; callers always receive the
/// complete list so an editor can surface every issue at once.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("node {node_id} is misconfigured: {message}")]
    NodeConfiguration { node_id: NodeId, message: String },

    #[error("operator '{operator}' on node {node_id} is misconfigured: {message}")]
    OperatorConfiguration {
        node_id: NodeId,
        operator: String,
        message: String,
    },

    #[error("graph is not acyclic; nodes blocked from ordering: {node_ids:?}")]
    Cycle { node_ids: Vec<NodeId> },

    #[error("graph must have exactly one final node, found {count} ({node_ids:?})")]
    FinalNode { count: usize, node_ids: Vec<NodeId> },
}

/// Errors raised while reading or writing the wire representation of a graph.
#[derive(Error, Debug, Clone)]
pub enum DefinitionError {
    #[error("failed to parse graph definition JSON: {0}")]
    JsonParse(String),

    #[error("failed to serialize graph definition: {0}")]
    JsonSerialize(String),
}

/// Errors that abort an in-progress evaluation round.
///
/// These are fail-fast: an evaluation error is surfaced to the caller with the
/// offending node id and is never converted into a silent `false` gate.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    SourceMissing { node_id: NodeId, source: String },

    TypeMismatch {
        node_id: NodeId,
        operation: String,
        expected: String,
        found: Value,
    },

    Operator {
        node_id: NodeId,
        operation: String,
        message: String,
    },

    NonBooleanResult { node_id: NodeId, found: Value },

    UnknownOperator { node_id: NodeId, operator: String },
}

// `EvalError` carries a data field literally named `source` (the name of a
// missing data source). `thiserror`'s derive unconditionally treats any field
// named `source` as the std::error::Error source, which requires that field to
// implement `Error` — a `String` does not. The display formatting and the
// `Error` impl below reproduce exactly what the derive would otherwise
// generate, with `source()` returning `None` as intended for these variants.
impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::SourceMissing { node_id, source } => write!(
                f,
                "source '{source}' required by node {node_id} is absent from the data context"
            ),
            EvalError::TypeMismatch {
                node_id,
                operation,
                expected,
                found,
            } => write!(
                f,
                "operator '{operation}' on node {node_id} expected {expected}, but found '{found}'"
            ),
            EvalError::Operator {
                node_id,
                operation,
                message,
            } => write!(
                f,
                "operator '{operation}' on node {node_id} failed: {message}"
            ),
            EvalError::NonBooleanResult { node_id, found } => write!(
                f,
                "final node {node_id} produced the non-boolean result '{found}'"
            ),
            EvalError::UnknownOperator { node_id, operator } => write!(
                f,
                "node {node_id} references the unknown operator '{operator}'"
            ),
        }
    }
}

impl std::error::Error for EvalError {}

/// Failure to compute the canonical digest of a graph definition.
///
/// Digest failures are fatal for drift detection; they are never downgraded
/// to a weaker identity-based hash.
#[derive(Error, Debug)]
pub enum HashError {
    #[error("failed to serialize graph definition for hashing: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors reported by a [`GraphStore`](crate::store::GraphStore) backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("a graph named '{0}' already exists")]
    DuplicateName(String),
}

/// Errors raised when registering a transformation with the gate engine.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("graph definition is invalid ({} issue(s))", .0.len())]
    Invalid(Vec<ValidationIssue>),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Errors surfaced by [`GateEngine::submit`](crate::runtime::GateEngine::submit).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no transformation deployed for entity '{0}'")]
    UnknownEntity(String),

    #[error(
        "cached graph {cached} is stale relative to the authoritative hash {expected}; redeploy required"
    )]
    GraphOutdated { expected: String, cached: String },

    #[error(transparent)]
    Eval(#[from] EvalError),
}
