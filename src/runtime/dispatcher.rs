//! Fan-in coordination: one evaluation round fires only after every required
//! source has reported for an entity.
//!
//! Source arrivals are additive and idempotent. The transition from Ready
//! through consumption back to Empty happens under the entity's state lock,
//! so the timeout monitor can never discard a round that is mid-dispatch.

use ahash::{AHashMap, AHashSet};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Mutex as StateLock;
use tracing::warn;

/// Where an entity currently sits in the fan-in lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No source data since the last reset.
    Empty,
    /// Some, but not all, required sources have reported.
    Collecting,
    /// Every required source has reported; the round is ready to evaluate.
    Ready,
}

/// Fan-in bookkeeping for a single entity.
#[derive(Debug)]
pub struct TransformationState {
    entity_id: String,
    required: AHashSet<String>,
    received: AHashSet<String>,
    collected: AHashMap<String, Value>,
    ready: bool,
    last_activity: Instant,
}

impl TransformationState {
    pub fn new(entity_id: impl Into<String>, required: AHashSet<String>) -> Self {
        TransformationState {
            entity_id: entity_id.into(),
            required,
            received: AHashSet::new(),
            collected: AHashMap::new(),
            ready: false,
            last_activity: Instant::now(),
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Records one source arrival. Re-arrival of an already-received source
    /// is a no-op apart from refreshing the activity timestamp; sources
    /// outside the required set are ignored.
    pub fn record(&mut self, source: &str, document: Value) {
        self.last_activity = Instant::now();
        if self.required.contains(source) && self.received.insert(source.to_string()) {
            self.collected.insert(source.to_string(), document);
        }
        self.ready = self.received == self.required;
    }

    pub fn phase(&self) -> Phase {
        if self.ready {
            Phase::Ready
        } else if self.received.is_empty() {
            Phase::Empty
        } else {
            Phase::Collecting
        }
    }

    /// Discards the round's partial data. Used both after a consumed round
    /// and by the timeout monitor.
    pub fn reset(&mut self) {
        self.received.clear();
        self.collected.clear();
        self.ready = false;
        self.last_activity = Instant::now();
    }

    /// Only Collecting entries age out; Ready entries are expected to be
    /// consumed promptly and Empty entries hold nothing to discard.
    pub fn is_stale(&self, timeout: Duration, now: Instant) -> bool {
        self.phase() == Phase::Collecting
            && now.duration_since(self.last_activity) > timeout
    }

    pub fn collected(&self) -> &AHashMap<String, Value> {
        &self.collected
    }

    fn take_collected(&mut self) -> AHashMap<String, Value> {
        std::mem::take(&mut self.collected)
    }
}

/// Shared fan-in coordinator across all entities.
#[derive(Debug, Default)]
pub struct Dispatcher {
    states: Mutex<AHashMap<String, Arc<StateLock<TransformationState>>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic get-or-create of the entity's state cell. Created on first
    /// arrival for an entity.
    fn state(
        &self,
        entity_id: &str,
        required: &AHashSet<String>,
    ) -> Arc<StateLock<TransformationState>> {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states
            .entry(entity_id.to_string())
            .or_insert_with(|| {
                Arc::new(StateLock::new(TransformationState::new(
                    entity_id,
                    required.clone(),
                )))
            })
            .clone()
    }

    /// Records a batch of source arrivals and, if that completes the fan-in,
    /// consumes the round: `on_ready` runs with the collected data and the
    /// state is reset afterwards, all under the entity's lock.
    ///
    /// Returns `None` while still collecting.
    pub async fn dispatch<F, Fut, T>(
        &self,
        entity_id: &str,
        required: &AHashSet<String>,
        batch: AHashMap<String, Value>,
        on_ready: F,
    ) -> Option<T>
    where
        F: FnOnce(AHashMap<String, Value>) -> Fut,
        Fut: Future<Output = T>,
    {
        let cell = self.state(entity_id, required);
        let mut state = cell.lock().await;
        for (source, document) in batch {
            state.record(&source, document);
        }
        if state.phase() != Phase::Ready {
            return None;
        }
        // Lock stays held across consumption and reset; see module docs.
        let data = state.take_collected();
        let output = on_ready(data).await;
        state.reset();
        Some(output)
    }

    /// Current lifecycle phase of an entity, if it has ever reported.
    pub async fn phase(&self, entity_id: &str) -> Option<Phase> {
        let cell = self.lookup(entity_id)?;
        let state = cell.lock().await;
        Some(state.phase())
    }

    /// Read-only copy of the partially collected source data, for the
    /// monitoring endpoint.
    pub async fn collected_data(&self, entity_id: &str) -> Option<AHashMap<String, Value>> {
        let cell = self.lookup(entity_id)?;
        let state = cell.lock().await;
        Some(state.collected().clone())
    }

    /// Scans every entity and force-resets Collecting states whose last
    /// activity predates `now - timeout`. Entries currently locked by a
    /// dispatch in flight are skipped, never awaited.
    pub async fn expire_stale(&self, timeout: Duration) -> usize {
        let cells: Vec<Arc<StateLock<TransformationState>>> = {
            let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
            states.values().cloned().collect()
        };

        let now = Instant::now();
        let mut expired = 0;
        for cell in cells {
            let Ok(mut state) = cell.try_lock() else {
                continue;
            };
            if state.is_stale(timeout, now) {
                warn!(
                    entity_id = state.entity_id(),
                    "discarding partial source data after inactivity timeout"
                );
                state.reset();
                expired += 1;
            }
        }
        expired
    }

    fn lookup(&self, entity_id: &str) -> Option<Arc<StateLock<TransformationState>>> {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.get(entity_id).cloned()
    }
}
