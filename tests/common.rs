//! Common test utilities for building graph definitions and data contexts.
use flowgate::prelude::*;
use serde_json::{json, Value};

/// Wire node builders keeping the test graphs terse.
#[allow(dead_code)]
pub fn provider(id: u64, source: &str, path: &str) -> NodeDefinition {
    NodeDefinition {
        id,
        name: None,
        kind: flowgate::graph::NodeKindDefinition::Provider {
            source_name: source.to_string(),
            json_path: path.to_string(),
        },
        input_nodes: Vec::new(),
    }
}

#[allow(dead_code)]
pub fn named_provider(id: u64, name: &str, source: &str, path: &str) -> NodeDefinition {
    let mut node = provider(id, source, path);
    node.name = Some(name.to_string());
    node
}

#[allow(dead_code)]
pub fn constant(id: u64, value: Value) -> NodeDefinition {
    NodeDefinition {
        id,
        name: None,
        kind: flowgate::graph::NodeKindDefinition::Constant { value },
        input_nodes: Vec::new(),
    }
}

#[allow(dead_code)]
pub fn logic(id: u64, operator: &str, inputs: &[u64]) -> NodeDefinition {
    NodeDefinition {
        id,
        name: None,
        kind: flowgate::graph::NodeKindDefinition::Logic {
            operator_name: operator.to_string(),
        },
        input_nodes: refs(inputs),
    }
}

#[allow(dead_code)]
pub fn config(id: u64, inputs: &[u64]) -> NodeDefinition {
    NodeDefinition {
        id,
        name: None,
        kind: flowgate::graph::NodeKindDefinition::Config,
        input_nodes: refs(inputs),
    }
}

#[allow(dead_code)]
pub fn refs(inputs: &[u64]) -> Vec<InputRef> {
    inputs
        .iter()
        .enumerate()
        .map(|(position, parent_id)| InputRef {
            parent_id: *parent_id,
            order_index: position as u32,
        })
        .collect()
}

#[allow(dead_code)]
pub fn definition(nodes: Vec<NodeDefinition>) -> GraphDefinition {
    GraphDefinition { nodes }
}

/// Logic: `$orders.total > 100`.
#[allow(dead_code)]
pub fn gt_definition() -> GraphDefinition {
    definition(vec![
        provider(1, "orders", "total"),
        constant(2, json!(100)),
        logic(3, "GREATER_THAN", &[1, 2]),
    ])
}

/// Logic: `($inventory.a.b + 3) == 8`.
#[allow(dead_code)]
pub fn add_definition() -> GraphDefinition {
    definition(vec![
        provider(1, "inventory", "a.b"),
        constant(2, json!(3)),
        logic(3, "ADD", &[1, 2]),
        constant(4, json!(8)),
        logic(5, "EQUAL", &[3, 4]),
    ])
}

/// Change detection with memory: the gate opens when the observed status
/// differs from the one remembered in the snapshot, and the config node
/// writes the current status back under the key `status`.
#[allow(dead_code)]
pub fn change_detection_definition() -> GraphDefinition {
    definition(vec![
        named_provider(1, "status", "orders", "status"),
        provider(2, SNAPSHOT_SOURCE, "status"),
        logic(3, "NOT_EQUAL", &[1, 2]),
        config(4, &[1]),
    ])
}

/// Nodes 1 and 2 feed each other; node 4 is the only terminal.
#[allow(dead_code)]
pub fn cyclic_definition() -> GraphDefinition {
    definition(vec![
        logic(1, "AND", &[2, 3]),
        logic(2, "NOT", &[1]),
        constant(3, json!(true)),
        logic(4, "AND", &[2, 3]),
    ])
}

#[allow(dead_code)]
pub fn deploy(definition: &GraphDefinition) -> Graph {
    flowgate::graph::compile(definition).expect("definition should be deployable")
}

#[allow(dead_code)]
pub fn context_with(sources: &[(&str, Value)]) -> DataContext {
    let mut context = DataContext::new();
    for (name, document) in sources {
        context.insert_source(*name, document.clone());
    }
    context.insert_source(SNAPSHOT_SOURCE, json!({}));
    context
}
