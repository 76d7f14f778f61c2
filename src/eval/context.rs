//! The data context an evaluation round runs against: named source documents
//! plus the reserved snapshot entry.

use ahash::AHashMap;
use serde_json::Value;

/// Reserved source name under which the prior round's memory is exposed.
pub const SNAPSHOT_SOURCE: &str = "__snapshot";

/// Per-entity memory carried across rounds, keyed by the config node's
/// input names.
pub type Snapshot = serde_json::Map<String, Value>;

/// Named source documents for one evaluation round.
#[derive(Debug, Clone, Default)]
pub struct DataContext {
    sources: AHashMap<String, Value>,
}

impl DataContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from collected source documents plus the prior
    /// snapshot, always present under [`SNAPSHOT_SOURCE`] so change-detection
    /// graphs behave identically on the first round.
    pub fn with_snapshot(sources: AHashMap<String, Value>, snapshot: &Snapshot) -> Self {
        let mut context = DataContext { sources };
        context
            .sources
            .insert(SNAPSHOT_SOURCE.to_string(), Value::Object(snapshot.clone()));
        context
    }

    pub fn insert_source(&mut self, name: impl Into<String>, document: Value) {
        self.sources.insert(name.into(), document);
    }

    pub fn source(&self, name: &str) -> Option<&Value> {
        self.sources.get(name)
    }
}

/// Resolves a dot-separated path expression with optional `[index]` steps
/// (e.g. `order.items[0].sku`) inside a document.
///
/// `None` means the path does not resolve — a recoverable "no value", not an
/// error. The empty path addresses the whole document.
pub fn resolve_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    if path.is_empty() {
        return Some(current);
    }
    for segment in path.split('.') {
        let (field, indexes) = split_segment(segment)?;
        if !field.is_empty() {
            current = current.as_object()?.get(field)?;
        }
        for index in indexes {
            current = current.as_array()?.get(index)?;
        }
    }
    Some(current)
}

/// Splits `items[0][2]` into `("items", [0, 2])`. Malformed segments do not
/// resolve.
fn split_segment(segment: &str) -> Option<(&str, Vec<usize>)> {
    match segment.find('[') {
        None => Some((segment, Vec::new())),
        Some(open) => {
            let (field, mut rest) = segment.split_at(open);
            let mut indexes = Vec::new();
            while let Some(stripped) = rest.strip_prefix('[') {
                let close = stripped.find(']')?;
                indexes.push(stripped[..close].parse().ok()?);
                rest = &stripped[close + 1..];
            }
            if rest.is_empty() {
                Some((field, indexes))
            } else {
                None
            }
        }
    }
}
