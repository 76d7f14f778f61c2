//! The stateful per-entity graph cache.
//!
//! One [`StatefulGraphInstance`] exists per entity id: the shared immutable
//! graph plus the mutable snapshot surviving between rounds. Instances are
//! created lazily and retained until invalidated. All evaluation for one
//! entity is serialized behind that entity's async lock, while distinct
//! entities evaluate fully in parallel.

use crate::error::EvalError;
use crate::eval::{DataContext, EvaluationOutcome, GraphEvaluator, Snapshot};
use crate::graph::Graph;
use crate::hash::GraphHash;
use ahash::AHashMap;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as EntityLock;
use tracing::debug;

/// A deployed graph plus the entity's memory of previous rounds.
#[derive(Debug)]
pub struct StatefulGraphInstance {
    graph: Arc<Graph>,
    graph_hash: GraphHash,
    last_snapshot: Snapshot,
}

impl StatefulGraphInstance {
    pub fn new(graph: Arc<Graph>, graph_hash: GraphHash) -> Self {
        StatefulGraphInstance {
            graph,
            graph_hash,
            last_snapshot: Snapshot::new(),
        }
    }

    pub fn graph_hash(&self) -> &GraphHash {
        &self.graph_hash
    }

    /// Memory of the last successful round; empty before the first one.
    pub fn last_snapshot(&self) -> &Snapshot {
        &self.last_snapshot
    }

    /// Runs one round: merges the prior snapshot into the context under the
    /// reserved source name, evaluates, and on success replaces the stored
    /// snapshot. A failed round leaves the snapshot untouched.
    pub fn evaluate(
        &mut self,
        sources: AHashMap<String, Value>,
    ) -> Result<EvaluationOutcome, EvalError> {
        let context = DataContext::with_snapshot(sources, &self.last_snapshot);
        let outcome = GraphEvaluator::new(&self.graph).evaluate(&context)?;
        if let Some(snapshot) = &outcome.new_snapshot {
            self.last_snapshot = snapshot.clone();
        }
        Ok(outcome)
    }
}

/// Keyed table of graph instances with per-entity exclusivity.
#[derive(Debug, Default)]
pub struct GraphCache {
    entries: Mutex<AHashMap<String, Arc<EntityLock<StatefulGraphInstance>>>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic get-or-create of the entity's instance cell.
    fn entry(
        &self,
        entity_id: &str,
        graph: &Arc<Graph>,
        graph_hash: &GraphHash,
    ) -> Arc<EntityLock<StatefulGraphInstance>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(entity_id.to_string())
            .or_insert_with(|| {
                debug!(entity_id, "creating graph instance");
                Arc::new(EntityLock::new(StatefulGraphInstance::new(
                    graph.clone(),
                    graph_hash.clone(),
                )))
            })
            .clone()
    }

    /// Evaluates the entity's cached instance against freshly collected
    /// source data.
    ///
    /// The entity lock is held for the whole round, so concurrent rounds for
    /// the same entity serialize while other entities proceed. An instance
    /// whose hash no longer matches the authoritative `expected_hash` is
    /// stale: it is rebuilt from `graph` and its snapshot discarded.
    pub async fn evaluate(
        &self,
        entity_id: &str,
        graph: &Arc<Graph>,
        expected_hash: &GraphHash,
        sources: AHashMap<String, Value>,
    ) -> Result<EvaluationOutcome, EvalError> {
        let cell = self.entry(entity_id, graph, expected_hash);
        let mut instance = cell.lock().await;
        if instance.graph_hash() != expected_hash {
            debug!(entity_id, "cached graph instance is stale, rebuilding");
            *instance = StatefulGraphInstance::new(graph.clone(), expected_hash.clone());
        }
        instance.evaluate(sources)
    }

    /// Drops the entity's instance; returns whether one existed. The next
    /// round recreates it with an empty snapshot.
    pub fn invalidate(&self, entity_id: &str) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(entity_id).is_some()
    }

    /// Read-only view of the entity's current snapshot, for diagnostics.
    pub async fn snapshot(&self, entity_id: &str) -> Option<Snapshot> {
        let cell = {
            let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.get(entity_id).cloned()
        }?;
        let instance = cell.lock().await;
        Some(instance.last_snapshot().clone())
    }
}
