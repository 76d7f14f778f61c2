//! Graph storage seam.
//!
//! Persistence mechanics live outside this crate; the engine only needs the
//! narrow contract below. [`MemoryGraphStore`] backs tests and embedded use.

use crate::error::StoreError;
use crate::graph::GraphDefinition;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Identifier assigned to a persisted graph definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphId(pub u64);

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted graph definition together with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGraph {
    pub id: GraphId,
    pub name: String,
    pub definition: GraphDefinition,
}

/// Narrow persistence contract consumed by the engine.
pub trait GraphStore: Send + Sync {
    fn persist(&self, name: &str, definition: GraphDefinition) -> Result<GraphId, StoreError>;

    fn find_by_id(&self, id: GraphId) -> Option<StoredGraph>;

    fn find_by_name(&self, name: &str) -> Option<StoredGraph>;

    /// Returns whether a graph with that id existed.
    fn delete(&self, id: GraphId) -> bool;
}

/// In-memory store with sequential ids.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    inner: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    next_id: u64,
    graphs: AHashMap<u64, StoredGraph>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphStore for MemoryGraphStore {
    fn persist(&self, name: &str, definition: GraphDefinition) -> Result<GraphId, StoreError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if state.graphs.values().any(|stored| stored.name == name) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        state.next_id += 1;
        let id = GraphId(state.next_id);
        state.graphs.insert(
            id.0,
            StoredGraph {
                id,
                name: name.to_string(),
                definition,
            },
        );
        Ok(id)
    }

    fn find_by_id(&self, id: GraphId) -> Option<StoredGraph> {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.graphs.get(&id.0).cloned()
    }

    fn find_by_name(&self, name: &str) -> Option<StoredGraph> {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.graphs.values().find(|stored| stored.name == name).cloned()
    }

    fn delete(&self, id: GraphId) -> bool {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.graphs.remove(&id.0).is_some()
    }
}
