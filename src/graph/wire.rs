//! Wire representation of a graph: a flat node array with explicit,
//! index-ordered input references.
//!
//! This is the format graph editors produce and the graph store persists.
//! Argument order is defined by each reference's `order_index`, not by its
//! position in the `input_nodes` array.

use super::node::{Node, NodeId, NodeKind};
use super::Graph;
use crate::error::DefinitionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The complete wire-format definition of a graph, ready to validate and
/// deploy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub nodes: Vec<NodeDefinition>,
}

/// One node of the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: NodeKindDefinition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_nodes: Vec<InputRef>,
}

/// Type-specific fields, discriminated by `node_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type")]
pub enum NodeKindDefinition {
    #[serde(rename = "PROVIDER")]
    Provider { source_name: String, json_path: String },
    #[serde(rename = "CONSTANT")]
    Constant { value: Value },
    #[serde(rename = "LOGIC")]
    Logic { operator_name: String },
    #[serde(rename = "CONFIG")]
    Config,
}

/// A reference to a parent node together with its argument position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRef {
    pub parent_id: u64,
    pub order_index: u32,
}

impl GraphDefinition {
    /// Parses a definition from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        serde_json::from_str(json).map_err(|e| DefinitionError::JsonParse(e.to_string()))
    }

    /// Serializes the definition back to JSON.
    pub fn to_json(&self) -> Result<String, DefinitionError> {
        serde_json::to_string_pretty(self).map_err(|e| DefinitionError::JsonSerialize(e.to_string()))
    }

    /// Returns a copy with nodes sorted by id and input references sorted by
    /// `order_index`. Two definitions describing the same graph canonicalize
    /// to the same byte sequence, which is what the drift-detection digest
    /// is computed over.
    pub fn canonical(&self) -> GraphDefinition {
        let mut nodes = self.nodes.clone();
        for node in &mut nodes {
            node.input_nodes.sort_by_key(|r| r.order_index);
        }
        nodes.sort_by_key(|n| n.id);
        GraphDefinition { nodes }
    }

    /// Reconstructs the wire form of a deployed graph.
    ///
    /// Ids, type-specific fields, and input order are preserved exactly;
    /// `order_index` is re-emitted as the dense argument position.
    pub fn from_graph(graph: &Graph) -> GraphDefinition {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeDefinition {
                id: node.id.0,
                name: node.name.clone(),
                kind: match &node.kind {
                    NodeKind::Provider { source, path } => NodeKindDefinition::Provider {
                        source_name: source.clone(),
                        json_path: path.clone(),
                    },
                    NodeKind::Constant { value } => NodeKindDefinition::Constant {
                        value: value.clone(),
                    },
                    NodeKind::Logic { operator } => NodeKindDefinition::Logic {
                        operator_name: operator.clone(),
                    },
                    NodeKind::Config => NodeKindDefinition::Config,
                },
                input_nodes: node
                    .inputs
                    .iter()
                    .enumerate()
                    .map(|(position, parent)| InputRef {
                        parent_id: parent.0,
                        order_index: position as u32,
                    })
                    .collect(),
            })
            .collect();
        GraphDefinition { nodes }
    }
}

impl NodeDefinition {
    /// Instantiates the owned node for this definition, without resolving
    /// inputs (pass 1 of graph construction).
    pub(super) fn instantiate(&self) -> Node {
        Node {
            id: NodeId(self.id),
            name: self.name.clone(),
            inputs: Vec::new(),
            kind: match &self.kind {
                NodeKindDefinition::Provider {
                    source_name,
                    json_path,
                } => NodeKind::Provider {
                    source: source_name.clone(),
                    path: json_path.clone(),
                },
                NodeKindDefinition::Constant { value } => NodeKind::Constant {
                    value: value.clone(),
                },
                NodeKindDefinition::Logic { operator_name } => NodeKind::Logic {
                    operator: operator_name.clone(),
                },
                NodeKindDefinition::Config => NodeKind::Config,
            },
        }
    }
}
