//! Topological execution of a validated graph against a data context.
//!
//! Each node's result is computed exactly once per pass, in dependency
//! order, consulting only already-computed inputs. Operator faults abort
//! the round immediately; they are never degraded into a `false` gate.

pub mod context;

pub use context::{resolve_path, DataContext, Snapshot, SNAPSHOT_SOURCE};

use crate::error::EvalError;
use crate::graph::{Graph, NodeKind};
use crate::ops;
use ahash::AHashMap;
use serde_json::Value;

/// The result of one evaluation round.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOutcome {
    /// The terminal node's boolean result: whether the downstream
    /// transformation should run.
    pub final_result: bool,
    /// The round's new snapshot; `None` when the graph declares no config
    /// node.
    pub new_snapshot: Option<Snapshot>,
}

/// Executes a validated graph against data contexts.
pub struct GraphEvaluator<'a> {
    graph: &'a Graph,
}

impl<'a> GraphEvaluator<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Runs one evaluation pass.
    ///
    /// Provider semantics: an unresolvable path inside a present source is a
    /// recoverable "no value" (`null`); a source name absent from the context
    /// entirely is a structural fault and aborts the round.
    pub fn evaluate(&self, context: &DataContext) -> Result<EvaluationOutcome, EvalError> {
        let mut results: AHashMap<crate::graph::NodeId, Value> =
            AHashMap::with_capacity(self.graph.len());

        for id in self.graph.evaluation_order() {
            let Some(node) = self.graph.node(*id) else {
                continue;
            };
            let value = match &node.kind {
                NodeKind::Provider { source, path } => {
                    let document =
                        context
                            .source(source)
                            .ok_or_else(|| EvalError::SourceMissing {
                                node_id: node.id,
                                source: source.clone(),
                            })?;
                    resolve_path(document, path)
                        .cloned()
                        .unwrap_or(Value::Null)
                }
                NodeKind::Constant { value } => value.clone(),
                NodeKind::Logic { operator } => {
                    let op = ops::lookup(operator).ok_or_else(|| EvalError::UnknownOperator {
                        node_id: node.id,
                        operator: operator.clone(),
                    })?;
                    let args: Vec<Value> = node
                        .inputs
                        .iter()
                        .map(|input| results.get(input).cloned().unwrap_or(Value::Null))
                        .collect();
                    op.execute(node, &args)?
                }
                NodeKind::Config => {
                    let mut snapshot = Snapshot::new();
                    for input in &node.inputs {
                        let key = self
                            .graph
                            .node(*input)
                            .and_then(|parent| parent.name.clone())
                            .unwrap_or_else(|| input.to_string());
                        let value = results.get(input).cloned().unwrap_or(Value::Null);
                        snapshot.insert(key, value);
                    }
                    Value::Object(snapshot)
                }
            };
            results.insert(node.id, value);
        }

        let final_id = self.graph.final_node();
        let final_value = results.get(&final_id).cloned().unwrap_or(Value::Null);
        let final_result = match final_value {
            Value::Bool(b) => b,
            other => {
                return Err(EvalError::NonBooleanResult {
                    node_id: final_id,
                    found: other,
                });
            }
        };

        let new_snapshot = self.graph.config_node().and_then(|id| {
            results.get(&id).and_then(|value| match value {
                Value::Object(map) => Some(map.clone()),
                _ => None,
            })
        });

        Ok(EvaluationOutcome {
            final_result,
            new_snapshot,
        })
    }
}
