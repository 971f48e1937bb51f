use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{Envelope, KeyPattern, KeyValueBackend, StoreError};

/// Process-local backend on a concurrent map.
///
/// With a root (`with_root("kv_store")`) entries live under `<root>/<key>`
/// and `get_all_matching` reports the rooted keys, the way the platform
/// store reports them.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: DashMap<String, Envelope>,
    root: Option<String>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<String>) -> Self {
        Self { entries: DashMap::new(), root: Some(root.into()) }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn rooted(&self, key: &str) -> String {
        match &self.root {
            Some(root) => format!("{root}/{key}"),
            None => key.to_string(),
        }
    }
}

#[async_trait]
impl KeyValueBackend for InMemoryBackend {
    async fn set(&self, key: &str, value: Envelope) -> Result<(), StoreError> {
        debug!(%key, type_url = %value.type_url, "kv set");
        self.entries.insert(self.rooted(key), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Envelope>, StoreError> {
        debug!(%key, "kv get");
        Ok(self.entries.get(&self.rooted(key)).map(|e| e.value().clone()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        debug!(%key, "kv delete");
        self.entries.remove(&self.rooted(key));
        Ok(())
    }

    async fn get_all_matching(&self, pattern: &str) -> Result<Vec<(String, Envelope)>, StoreError> {
        let matcher = KeyPattern::parse(&self.rooted(pattern))?;
        let items: Vec<(String, Envelope)> = self
            .entries
            .iter()
            .filter(|e| matcher.matches(e.key()))
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        debug!(%pattern, count = items.len(), "kv get_all_matching");
        Ok(items)
    }
}
