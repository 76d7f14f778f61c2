//! # Flowgate - Logic-Graph Gate Engine
//!
//! **Flowgate** decides, per incoming data event, whether a downstream
//! transformation between two external APIs should run. Each entity carries a
//! small user-authored decision graph; evaluating it against the freshly
//! collected source documents (plus the entity's memory of previous rounds)
//! yields a boolean gate. The engine also coordinates fan-in across multiple
//! asynchronous sources and recovers states stuck waiting on a source that
//! stopped reporting.
//!
//! ## Core Workflow
//!
//! 1. **Define**: author a graph in the wire format (a flat node array with
//!    explicit, index-ordered input references) and parse it into a
//!    [`GraphDefinition`](graph::GraphDefinition).
//! 2. **Deploy**: [`graph::compile`] validates the definition - structural
//!    checks, operator contracts, cycle detection, final-node check - and
//!    returns either a deployable [`Graph`](graph::Graph) or the complete
//!    list of defects.
//! 3. **Evaluate**: a [`GraphEvaluator`](eval::GraphEvaluator) runs the graph
//!    in dependency order against a [`DataContext`](eval::DataContext),
//!    producing the gate decision and the round's new snapshot.
//! 4. **Coordinate**: the [`GateEngine`](runtime::GateEngine) accepts
//!    [`SyncJob`](runtime::SyncJob)s, waits until every required source has
//!    reported, serializes evaluation per entity, and hands the gate decision
//!    back to the caller, who invokes the script stage only when it is open.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowgate::prelude::*;
//! use ahash::AHashSet;
//! use serde_json::json;
//!
//! # async fn run() -> Result<()> {
//! // A graph gating on `orders.total > 100`, in the wire format.
//! let definition = GraphDefinition::from_json(
//!     r#"{
//!         "nodes": [
//!             {"id": 1, "node_type": "PROVIDER", "source_name": "orders", "json_path": "total"},
//!             {"id": 2, "node_type": "CONSTANT", "value": 100},
//!             {"id": 3, "node_type": "LOGIC", "operator_name": "GREATER_THAN",
//!              "input_nodes": [
//!                 {"parent_id": 1, "order_index": 0},
//!                 {"parent_id": 2, "order_index": 1}
//!              ]}
//!         ]
//!     }"#,
//! )?;
//!
//! let engine = GateEngine::new();
//! let required: AHashSet<String> = ["orders".to_string()].into_iter().collect();
//! let hash = engine.deploy("entity-1", &definition, required)?;
//!
//! let job = SyncJob {
//!     entity_id: "entity-1".to_string(),
//!     script_id: "script-7".to_string(),
//!     script_code: "ctx.push()".to_string(),
//!     script_language: "javascript".to_string(),
//!     expected_graph_hash: hash,
//!     source_data: [("orders".to_string(), json!({"total": 250}))].into_iter().collect(),
//! };
//!
//! if let Some(round) = engine.submit(job).await? {
//!     if round.gate {
//!         println!("gate open - run the transformation for {}", round.entity_id);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod eval;
pub mod graph;
pub mod hash;
pub mod ops;
pub mod prelude;
pub mod runtime;
pub mod store;
