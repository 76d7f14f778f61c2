use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a node, unique within a single graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The type-specific payload of a node.
///
/// Modelled as a closed sum type so the evaluator and validator can match
/// exhaustively instead of downcasting.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Reads a value out of a named external source document.
    Provider {
        /// Key into the data context's source map.
        source: String,
        /// Path expression into the source document (e.g. `order.total`).
        path: String,
    },
    /// An immutable literal (boolean, number, string, or null).
    Constant { value: Value },
    /// Applies a registered operator to the ordered input results.
    Logic { operator: String },
    /// Collects its named inputs into the round's new snapshot.
    /// At most one per graph.
    Config,
}

impl NodeKind {
    /// Human-readable discriminator, used in diagnostics.
    pub fn discriminator(&self) -> &'static str {
        match self {
            NodeKind::Provider { .. } => "PROVIDER",
            NodeKind::Constant { .. } => "CONSTANT",
            NodeKind::Logic { .. } => "LOGIC",
            NodeKind::Config => "CONFIG",
        }
    }
}

/// A single node of a deployable graph.
///
/// Inputs are ordered; order is semantically significant (subtraction,
/// range bounds). Per-pass results live in the evaluator's result table,
/// not on the node itself, so a validated graph is immutable and shareable.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Optional label. Required (and unique) for inputs of a Config node,
    /// where it becomes the snapshot key.
    pub name: Option<String>,
    /// Ordered references into the owning graph's node set.
    pub inputs: Vec<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, NodeKind::Constant { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self.kind, NodeKind::Config)
    }
}
