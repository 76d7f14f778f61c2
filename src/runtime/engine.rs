//! The round coordinator: ties the dispatcher's fan-in to the stateful graph
//! cache and surfaces the gate decision to the caller.
//!
//! The engine never invokes the script-execution collaborator itself; it
//! returns the gate and the new snapshot, and the caller runs the script
//! stage only when the gate is open.

use super::cache::GraphCache;
use super::dispatcher::{Dispatcher, Phase};
use crate::error::{DeployError, EngineError};
use crate::eval::Snapshot;
use crate::graph::{self, Graph, GraphDefinition};
use crate::hash::{hash_definition, GraphHash};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A unit of work arriving from the transport layer: identifies the entity,
/// the downstream script, the authoritative graph version, and carries one
/// or more named source documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncJob {
    pub entity_id: String,
    pub script_id: String,
    pub script_code: String,
    pub script_language: String,
    pub expected_graph_hash: GraphHash,
    pub source_data: AHashMap<String, Value>,
}

/// The outcome of a completed evaluation round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub entity_id: String,
    /// Whether the downstream transformation should run.
    pub gate: bool,
    /// The round's new snapshot, when the graph maintains one.
    pub snapshot: Option<Snapshot>,
}

/// Deploy-time constants for one entity's transformation.
#[derive(Debug)]
struct Deployment {
    graph: Arc<Graph>,
    hash: GraphHash,
    required_sources: AHashSet<String>,
}

/// Coordinates fan-in, cached evaluation, and gate decisions across all
/// entities.
#[derive(Default)]
pub struct GateEngine {
    dispatcher: Arc<Dispatcher>,
    cache: Arc<GraphCache>,
    deployments: Mutex<AHashMap<String, Arc<Deployment>>>,
}

impl GateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared dispatcher, for wiring up a
    /// [`TimeoutMonitor`](super::monitor::TimeoutMonitor).
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    /// Validates and registers an entity's decision graph together with the
    /// set of sources that must report before a round may evaluate.
    ///
    /// Returns the definition's canonical hash. Redeploying with a changed
    /// definition invalidates the entity's cached instance (and with it the
    /// accumulated snapshot).
    pub fn deploy(
        &self,
        entity_id: &str,
        definition: &GraphDefinition,
        required_sources: AHashSet<String>,
    ) -> Result<GraphHash, DeployError> {
        let graph = graph::compile(definition).map_err(DeployError::Invalid)?;
        let hash = hash_definition(definition)?;

        let previous = {
            let mut deployments = self.deployments.lock().unwrap_or_else(|e| e.into_inner());
            deployments.insert(
                entity_id.to_string(),
                Arc::new(Deployment {
                    graph: Arc::new(graph),
                    hash: hash.clone(),
                    required_sources,
                }),
            )
        };

        if previous.is_some_and(|d| d.hash != hash) {
            debug!(entity_id, "graph definition changed, invalidating instance");
            self.cache.invalidate(entity_id);
        }
        Ok(hash)
    }

    /// Feeds one job's source data into the fan-in. Returns `Ok(None)` while
    /// the entity is still collecting, and the round outcome once all
    /// required sources have reported.
    ///
    /// An evaluation fault aborts only that round: the partial collection is
    /// consumed, but the cached snapshot keeps the state of the last
    /// successful round.
    pub async fn submit(&self, job: SyncJob) -> Result<Option<RoundOutcome>, EngineError> {
        let deployment = {
            let deployments = self.deployments.lock().unwrap_or_else(|e| e.into_inner());
            deployments.get(&job.entity_id).cloned()
        }
        .ok_or_else(|| EngineError::UnknownEntity(job.entity_id.clone()))?;

        if deployment.hash != job.expected_graph_hash {
            return Err(EngineError::GraphOutdated {
                expected: job.expected_graph_hash.to_string(),
                cached: deployment.hash.to_string(),
            });
        }

        let entity_id = job.entity_id;
        let result = self
            .dispatcher
            .dispatch(
                &entity_id,
                &deployment.required_sources,
                job.source_data,
                |sources| {
                    self.cache
                        .evaluate(&entity_id, &deployment.graph, &deployment.hash, sources)
                },
            )
            .await;

        match result {
            None => Ok(None),
            Some(Ok(outcome)) => Ok(Some(RoundOutcome {
                entity_id,
                gate: outcome.final_result,
                snapshot: outcome.new_snapshot,
            })),
            Some(Err(error)) => Err(error.into()),
        }
    }

    /// Monitoring endpoint: the partially collected source data for an
    /// entity, if any. Callers map `None` to a 404.
    pub async fn collected_data(&self, entity_id: &str) -> Option<AHashMap<String, Value>> {
        self.dispatcher.collected_data(entity_id).await
    }

    /// Monitoring endpoint: the entity's current fan-in phase.
    pub async fn phase(&self, entity_id: &str) -> Option<Phase> {
        self.dispatcher.phase(entity_id).await
    }

    /// Monitoring endpoint: the entity's cached snapshot.
    pub async fn cached_snapshot(&self, entity_id: &str) -> Option<Snapshot> {
        self.cache.snapshot(entity_id).await
    }
}
