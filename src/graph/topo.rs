//! Dependency ordering via Kahn's algorithm.
//!
//! In-degree of a node is the number of its declared inputs; the adjacency
//! relation points from each input to the nodes consuming it. Runs in
//! O(N + E).

use super::node::{Node, NodeId};
use ahash::AHashMap;
use itertools::Itertools;
use std::collections::VecDeque;

/// The outcome of a sort attempt over a node set.
#[derive(Debug, Clone)]
pub struct SortOutcome {
    /// Nodes in dependency order: every node appears after all of its inputs.
    /// Shorter than the node set when a cycle exists.
    pub order: Vec<NodeId>,
    /// Nodes whose in-degree never reached zero. Non-empty exactly when the
    /// graph has a cycle; an over-approximation of the minimal cycle, which
    /// is acceptable for diagnostics.
    pub cycle_nodes: Vec<NodeId>,
}

impl SortOutcome {
    pub fn has_cycle(&self) -> bool {
        !self.cycle_nodes.is_empty()
    }
}

/// Orders `nodes` so every node follows its declared inputs.
///
/// Input references that do not resolve to a node in the set are ignored
/// here; the validator reports them separately as structural defects.
pub fn sort(nodes: &[Node]) -> SortOutcome {
    let known: AHashMap<NodeId, &Node> = nodes.iter().map(|n| (n.id, n)).collect();

    let mut in_degree: AHashMap<NodeId, usize> = AHashMap::with_capacity(nodes.len());
    let mut children: AHashMap<NodeId, Vec<NodeId>> = AHashMap::with_capacity(nodes.len());

    for node in nodes {
        let resolved = node
            .inputs
            .iter()
            .filter(|input| known.contains_key(input))
            .count();
        in_degree.insert(node.id, resolved);
        for input in &node.inputs {
            if known.contains_key(input) {
                children.entry(*input).or_default().push(node.id);
            }
        }
    }

    let mut queue: VecDeque<NodeId> = nodes
        .iter()
        .filter(|n| in_degree[&n.id] == 0)
        .map(|n| n.id)
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(id) = queue.pop_front() {
        order.push(id);
        if let Some(consumers) = children.get(&id) {
            for child in consumers {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*child);
                    }
                }
            }
        }
    }

    let cycle_nodes = if order.len() == nodes.len() {
        Vec::new()
    } else {
        in_degree
            .iter()
            .filter(|(_, degree)| **degree > 0)
            .map(|(id, _)| *id)
            .sorted()
            .collect()
    };

    SortOutcome { order, cycle_nodes }
}
