//! ObservedStore - latest recorded output per node (DashMap)
//!
//! Filled by the embedding runtime from execution or debug traces. The
//! resolver prefers observed keys over declared outputs because they are
//! what the node actually produced.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;

use crate::expr::ValueLookup;
use crate::util::jsonpath;

/// Source of the most recent output payload of a node
pub trait ObservedOutputs {
    fn latest(&self, node_id: &str) -> Option<Arc<Value>>;
}

/// One recorded payload
#[derive(Debug, Clone)]
pub struct Observation {
    /// Arc for O(1) cloning of large payloads
    pub output: Arc<Value>,
    pub recorded_at: DateTime<Utc>,
}

/// Thread-safe observed-output storage (lock-free)
#[derive(Debug, Clone, Default)]
pub struct ObservedStore {
    outputs: Arc<DashMap<Arc<str>, Observation>>,
}

impl ObservedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a payload observed now, replacing any previous one
    pub fn record(&self, node_id: impl Into<Arc<str>>, output: Value) {
        self.outputs.insert(
            node_id.into(),
            Observation {
                output: Arc::new(output),
                recorded_at: Utc::now(),
            },
        );
    }

    /// Record a payload observed at `at`. Older than the stored one → ignored.
    pub fn record_at(&self, node_id: impl Into<Arc<str>>, output: Value, at: DateTime<Utc>) {
        let observation = Observation {
            output: Arc::new(output),
            recorded_at: at,
        };
        self.outputs
            .entry(node_id.into())
            .and_modify(|current| {
                if current.recorded_at <= at {
                    *current = observation.clone();
                }
            })
            .or_insert(observation);
    }

    pub fn get(&self, node_id: &str) -> Option<Observation> {
        self.outputs.get(node_id).map(|o| o.value().clone())
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.outputs.contains_key(node_id)
    }

    pub fn remove(&self, node_id: &str) -> Option<Observation> {
        self.outputs.remove(node_id).map(|(_, o)| o)
    }

    pub fn clear(&self) {
        self.outputs.clear();
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Resolve `node.path` (e.g. `"n1.body.items[0]"`) against observed outputs
    pub fn resolve_path(&self, path: &str) -> Option<Value> {
        let (node_id, rest) = match path.split_once('.') {
            Some((node_id, rest)) => (node_id, Some(rest)),
            None => (path, None),
        };
        let output = self.latest(node_id)?;
        match rest {
            None => Some((*output).clone()),
            Some(rest) => jsonpath::resolve(&output, rest).cloned(),
        }
    }
}

impl ObservedOutputs for ObservedStore {
    fn latest(&self, node_id: &str) -> Option<Arc<Value>> {
        self.outputs.get(node_id).map(|o| Arc::clone(&o.output))
    }
}

impl ValueLookup for ObservedStore {
    fn lookup(&self, field: &str) -> Option<Value> {
        self.resolve_path(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_record_replaces_latest() {
        let store = ObservedStore::new();
        store.record("n1", json!({"amount": 1}));
        store.record("n1", json!({"amount": 2}));
        assert_eq!(store.len(), 1);
        assert_eq!(*store.latest("n1").unwrap(), json!({"amount": 2}));
        assert!(store.latest("n2").is_none());
    }

    #[test]
    fn test_record_at_keeps_most_recent() {
        let store = ObservedStore::new();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        store.record_at("n1", json!({"v": "new"}), t2);
        store.record_at("n1", json!({"v": "old"}), t1);

        let observation = store.get("n1").unwrap();
        assert_eq!(*observation.output, json!({"v": "new"}));
        assert_eq!(observation.recorded_at, t2);
    }

    #[test]
    fn test_resolve_nested_paths() {
        let store = ObservedStore::new();
        store.record("n1", json!({"body": {"items": [{"sku": "A"}]}}));

        assert_eq!(store.resolve_path("n1.body.items[0].sku"), Some(json!("A")));
        assert_eq!(store.lookup("n1.body.items[1]"), None);
        assert_eq!(store.resolve_path("n1").unwrap()["body"]["items"][0]["sku"], "A");
        assert_eq!(store.resolve_path("n2.body"), None);
    }

    #[test]
    fn test_clones_share_storage() {
        let store = ObservedStore::new();
        let handle = store.clone();
        handle.record("n1", json!({"ok": true}));
        assert!(store.contains("n1"));
        assert!(store.remove("n1").is_some());
        assert!(handle.is_empty());
    }
}
