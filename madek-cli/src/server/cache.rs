//! Whole-response cache
//!
//! Compiled documents keyed by resource kind and id. Entries never expire;
//! they are replaced when a request with `?fresh=yes` recompiles them.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Kind of compiled resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Collection,
    MediaEntry,
}

#[derive(Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<(ResourceKind, String), Arc<Value>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, kind: ResourceKind, id: &str) -> Option<Arc<Value>> {
        self.entries.read().await.get(&(kind, id.to_string())).cloned()
    }

    pub async fn insert(&self, kind: ResourceKind, id: impl Into<String>, document: Value) {
        self.entries.write().await.insert((kind, id.into()), Arc::new(document));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
