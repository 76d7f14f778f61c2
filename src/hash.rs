//! Drift detection for deployed graphs: a SHA-256 digest over the canonical
//! wire serialization.
//!
//! A worker compares the hash of its cached instance against the
//! authoritative hash carried by each job; a mismatch means the cached
//! instance is stale and must be rebuilt. Digest failures are fatal for that
//! purpose — there is deliberately no fallback to a weaker hash.

use crate::error::HashError;
use crate::graph::GraphDefinition;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex-encoded SHA-256 digest of a canonical graph definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphHash(String);

impl GraphHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GraphHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the drift-detection hash of a graph definition.
///
/// The definition is canonicalized first (nodes by id, inputs by order
/// index), so editors that emit nodes in a different order agree on the
/// digest.
pub fn hash_definition(definition: &GraphDefinition) -> Result<GraphHash, HashError> {
    let bytes = serde_json::to_vec(&definition.canonical())?;
    let digest = Sha256::digest(&bytes);
    let hex = digest
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            use fmt::Write;
            let _ = write!(out, "{byte:02x}");
            out
        });
    Ok(GraphHash(hex))
}
