//! Two-pass graph construction plus error-collecting validation.
//!
//! Pass 1 instantiates every node from its wire definition; pass 2 resolves
//! input references by id in ascending `order_index`. Validation then runs
//! structural checks, operator contracts, cycle detection, and the final-node
//! check, merging every defect into a single list. A graph is deployable only
//! when that list is empty.

use super::node::{Node, NodeId, NodeKind};
use super::topo;
use super::wire::GraphDefinition;
use super::Graph;
use crate::error::ValidationIssue;
use crate::ops;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde_json::Value;

/// Builds and validates a deployable [`Graph`] from its wire definition.
///
/// Returns the complete list of defects when the definition is not
/// deployable; validation never stops at the first problem.
pub fn compile(definition: &GraphDefinition) -> Result<Graph, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    // Pass 1: instantiate nodes, rejecting duplicate ids.
    let mut nodes: Vec<Node> = Vec::with_capacity(definition.nodes.len());
    let mut seen: AHashSet<NodeId> = AHashSet::with_capacity(definition.nodes.len());
    for node_def in &definition.nodes {
        let id = NodeId(node_def.id);
        if !seen.insert(id) {
            issues.push(ValidationIssue::NodeConfiguration {
                node_id: id,
                message: "duplicate node id".to_string(),
            });
            continue;
        }
        nodes.push(node_def.instantiate());
    }

    // Pass 2: resolve input references in declared argument order.
    let known: AHashSet<NodeId> = nodes.iter().map(|n| n.id).collect();
    for node_def in &definition.nodes {
        let id = NodeId(node_def.id);
        let refs = node_def
            .input_nodes
            .iter()
            .sorted_by_key(|r| r.order_index)
            .collect::<Vec<_>>();

        let mut indices_seen = AHashSet::new();
        let mut inputs = Vec::with_capacity(refs.len());
        for input_ref in refs {
            if !indices_seen.insert(input_ref.order_index) {
                issues.push(ValidationIssue::NodeConfiguration {
                    node_id: id,
                    message: format!("duplicate input order index {}", input_ref.order_index),
                });
                continue;
            }
            let parent = NodeId(input_ref.parent_id);
            if known.contains(&parent) {
                inputs.push(parent);
            } else {
                issues.push(ValidationIssue::NodeConfiguration {
                    node_id: id,
                    message: format!("input references the unknown node {parent}"),
                });
            }
        }

        if let Some(node) = nodes.iter_mut().find(|n| n.id == id) {
            node.inputs = inputs;
        }
    }

    let index: AHashMap<NodeId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(position, node)| (node.id, position))
        .collect();

    validate_structure(&nodes, &index, &mut issues);
    validate_operators(&nodes, &index, &mut issues);

    let sorted = topo::sort(&nodes);
    if sorted.has_cycle() {
        issues.push(ValidationIssue::Cycle {
            node_ids: sorted.cycle_nodes.clone(),
        });
    }

    let final_node = validate_final_node(&nodes, &index, &mut issues);

    if !issues.is_empty() {
        return Err(issues);
    }

    let config_node = nodes.iter().find(|n| n.is_config()).map(|n| n.id);
    // An empty issue list implies the terminal check resolved a node.
    let final_node = final_node.unwrap_or_else(|| nodes[0].id);

    Ok(Graph {
        nodes,
        index,
        order: sorted.order,
        final_node,
        config_node,
    })
}

/// Structural checks that are independent of any operator contract.
fn validate_structure(
    nodes: &[Node],
    index: &AHashMap<NodeId, usize>,
    issues: &mut Vec<ValidationIssue>,
) {
    let config_nodes: Vec<&Node> = nodes.iter().filter(|n| n.is_config()).collect();
    if config_nodes.len() > 1 {
        for extra in &config_nodes[1..] {
            issues.push(ValidationIssue::NodeConfiguration {
                node_id: extra.id,
                message: "a graph may hold at most one config node".to_string(),
            });
        }
    }

    for config in &config_nodes {
        let mut keys: AHashSet<&str> = AHashSet::new();
        for input in &config.inputs {
            let Some(parent) = index.get(input).map(|i| &nodes[*i]) else {
                continue;
            };
            match parent.name.as_deref() {
                None | Some("") => issues.push(ValidationIssue::NodeConfiguration {
                    node_id: config.id,
                    message: format!("config input {input} has no name to use as snapshot key"),
                }),
                Some(name) => {
                    if !keys.insert(name) {
                        issues.push(ValidationIssue::NodeConfiguration {
                            node_id: config.id,
                            message: format!("config inputs share the snapshot key '{name}'"),
                        });
                    }
                }
            }
        }
    }

    for node in nodes {
        match &node.kind {
            NodeKind::Provider { source, .. } => {
                if !node.inputs.is_empty() {
                    issues.push(ValidationIssue::NodeConfiguration {
                        node_id: node.id,
                        message: "provider nodes take no inputs".to_string(),
                    });
                }
                if source.is_empty() {
                    issues.push(ValidationIssue::NodeConfiguration {
                        node_id: node.id,
                        message: "provider source name must not be empty".to_string(),
                    });
                }
            }
            NodeKind::Constant { .. } => {
                if !node.inputs.is_empty() {
                    issues.push(ValidationIssue::NodeConfiguration {
                        node_id: node.id,
                        message: "constant nodes take no inputs".to_string(),
                    });
                }
            }
            NodeKind::Logic { .. } | NodeKind::Config => {}
        }
    }
}

/// Per-operator arity/type contracts.
fn validate_operators(
    nodes: &[Node],
    index: &AHashMap<NodeId, usize>,
    issues: &mut Vec<ValidationIssue>,
) {
    for node in nodes {
        let NodeKind::Logic { operator } = &node.kind else {
            continue;
        };
        let Some(op) = ops::lookup(operator) else {
            issues.push(ValidationIssue::OperatorConfiguration {
                node_id: node.id,
                operator: operator.clone(),
                message: "unknown operator".to_string(),
            });
            continue;
        };
        let inputs: Vec<&Node> = node
            .inputs
            .iter()
            .filter_map(|input| index.get(input).map(|i| &nodes[*i]))
            .collect();
        if let Err(message) = op.validate(node, &inputs) {
            issues.push(ValidationIssue::OperatorConfiguration {
                node_id: node.id,
                operator: operator.clone(),
                message,
            });
        }
    }
}

/// The graph's boolean output: exactly one terminal node, excluding the
/// config node (which is a sink for snapshot state, not the gate result).
fn validate_final_node(
    nodes: &[Node],
    index: &AHashMap<NodeId, usize>,
    issues: &mut Vec<ValidationIssue>,
) -> Option<NodeId> {
    let mut consumed: AHashSet<NodeId> = AHashSet::new();
    for node in nodes {
        for input in &node.inputs {
            consumed.insert(*input);
        }
    }

    let terminals: Vec<NodeId> = nodes
        .iter()
        .filter(|n| !n.is_config() && !consumed.contains(&n.id))
        .map(|n| n.id)
        .collect();

    if terminals.len() != 1 {
        issues.push(ValidationIssue::FinalNode {
            count: terminals.len(),
            node_ids: terminals.clone(),
        });
        return None;
    }

    let final_id = terminals[0];
    if let Some(node) = index.get(&final_id).map(|i| &nodes[*i]) {
        if let NodeKind::Constant { value } = &node.kind {
            if !matches!(value, Value::Bool(_)) {
                issues.push(ValidationIssue::NodeConfiguration {
                    node_id: final_id,
                    message: "final node must produce a boolean result".to_string(),
                });
            }
        }
    }
    Some(final_id)
}
