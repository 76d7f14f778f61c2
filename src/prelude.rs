//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! flowgate crate. Import this module to get access to the core functionality
//! without having to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowgate::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/graph.json")?;
//! let definition = GraphDefinition::from_json(&json)?;
//!
//! let graph = flowgate::graph::compile(&definition)
//!     .map_err(|issues| format!("{} validation issue(s)", issues.len()))?;
//!
//! let mut context = DataContext::new();
//! context.insert_source("orders", serde_json::json!({"total": 42}));
//!
//! let outcome = GraphEvaluator::new(&graph).evaluate(&context)?;
//! println!("gate: {}", outcome.final_result);
//! # Ok(())
//! # }
//! ```

// Graph model and wire format
pub use crate::graph::{compile, Graph, GraphDefinition, InputRef, Node, NodeDefinition, NodeId, NodeKind};

// Evaluation
pub use crate::eval::{DataContext, EvaluationOutcome, GraphEvaluator, Snapshot, SNAPSHOT_SOURCE};

// Drift detection
pub use crate::hash::{hash_definition, GraphHash};

// Runtime coordination
pub use crate::runtime::{
    Dispatcher, GateEngine, GraphCache, Phase, RoundOutcome, RuntimeConfig, SyncJob,
    TimeoutMonitor,
};

// Storage seam
pub use crate::store::{GraphId, GraphStore, MemoryGraphStore, StoredGraph};

// Error types
pub use crate::error::{EngineError, EvalError, ValidationIssue};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
