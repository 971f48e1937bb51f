use std::{collections::HashMap, hash::Hash, io, path::{Path, PathBuf}, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};

use super::{Envelope, KeyPattern, KeyValueBackend, StoreError};

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file and provides simple CRUD helpers.
/// Intended for lightweight state where a database is overkill. Writes are
/// persisted while the write lock is held, so the file always reflects one
/// complete version of the map.
pub struct JsonMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    ///
    /// A file that exists but cannot be read or parsed is an error rather than an empty map.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(format!("{}: {e}", parent.display())))?;
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Serialization(format!("{}: {e}", file_path.display())))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let empty: HashMap<K, V> = HashMap::new();
                write_map(&file_path, &empty).await?;
                info!(path = %file_path.display(), "created empty json store");
                empty
            }
            // an unreadable store is never replaced with an empty one
            Err(e) => return Err(StoreError::Io(format!("{}: {e}", file_path.display()))),
        };

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    /// List all entries as `(key, value)` pairs.
    pub async fn list(&self) -> Vec<(K, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        map.insert(key, value);
        write_map(&self.file_path, &map).await
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, StoreError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        if existed {
            write_map(&self.file_path, &map).await?;
        }
        Ok(existed)
    }
}

async fn write_map<K, V>(path: &Path, map: &HashMap<K, V>) -> Result<(), StoreError>
where
    K: Eq + Hash + serde::Serialize,
    V: serde::Serialize,
{
    let data = serde_json::to_vec(map).map_err(|e| StoreError::Serialization(e.to_string()))?;
    fs::write(path, data)
        .await
        .map_err(|e| StoreError::Io(format!("{}: {e}", path.display())))
}

/// Key-value backend persisted as one JSON document of `key -> envelope`.
#[derive(Clone)]
pub struct JsonFileBackend {
    store: Arc<JsonMapStore<String, Envelope>>,
}

impl JsonFileBackend {
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StoreError> {
        let store = JsonMapStore::<String, Envelope>::new(path).await?;
        Ok(Self { store })
    }
}

#[async_trait]
impl KeyValueBackend for JsonFileBackend {
    async fn set(&self, key: &str, value: Envelope) -> Result<(), StoreError> {
        debug!(%key, type_url = %value.type_url, "kv set");
        self.store.insert(key.to_string(), value).await
    }

    async fn get(&self, key: &str) -> Result<Option<Envelope>, StoreError> {
        debug!(%key, "kv get");
        Ok(self.store.get(&key.to_string()).await)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        debug!(%key, "kv delete");
        self.store.remove(&key.to_string()).await.map(|_| ())
    }

    async fn get_all_matching(&self, pattern: &str) -> Result<Vec<(String, Envelope)>, StoreError> {
        let matcher = KeyPattern::parse(pattern)?;
        let items: Vec<(String, Envelope)> = self
            .store
            .list()
            .await
            .into_iter()
            .filter(|(k, _)| matcher.matches(k))
            .collect();
        debug!(%pattern, count = items.len(), "kv get_all_matching");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{tag}_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = tmp_path("json_map_store");
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.list().await.len(), 0);

        store.insert("a".into(), "1".into()).await?;
        store.insert("b".into(), "2".into()).await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("1"));

        // remove and reload persistence
        assert!(store.remove(&"b".into()).await?);
        assert!(!store.remove(&"b".into()).await?);
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        let entries = reloaded.list().await;
        assert_eq!(entries, vec![("a".to_string(), "1".to_string())]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() -> Result<(), anyhow::Error> {
        let tmp = tmp_path("json_map_store_corrupt");
        tokio::fs::write(&tmp, b"{not json").await?;
        let res = JsonMapStore::<String, String>::new(&tmp).await;
        assert!(matches!(res, Err(StoreError::Serialization(_))));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_path_is_an_error_and_left_alone() -> Result<(), anyhow::Error> {
        // a directory where the store file should be fails the read with something other than NotFound
        let tmp = tmp_path("json_map_store_unreadable");
        tokio::fs::create_dir_all(&tmp).await?;
        tokio::fs::write(tmp.join("keep.txt"), b"keep").await?;

        let res = JsonMapStore::<String, String>::new(&tmp).await;
        assert!(matches!(res, Err(StoreError::Io(_))));
        assert_eq!(tokio::fs::read(tmp.join("keep.txt")).await?, b"keep");

        let _ = tokio::fs::remove_dir_all(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn file_backend_survives_reopen() -> Result<(), anyhow::Error> {
        let tmp = tmp_path("json_file_backend");
        let kv = JsonFileBackend::open(&tmp).await?;
        let env = Envelope::new("type.test/Str", b"\"x\"".to_vec());
        kv.set("ns/a", env.clone()).await?;
        kv.set("ns/b", env.clone()).await?;
        kv.set("other/c", env.clone()).await?;
        kv.delete("ns/b").await?;

        let reopened = JsonFileBackend::open(&tmp).await?;
        assert_eq!(reopened.get("ns/a").await?, Some(env.clone()));
        assert_eq!(reopened.get("ns/b").await?, None);
        let all = reopened.get_all_matching("ns/**").await?;
        assert_eq!(all, vec![("ns/a".to_string(), env)]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
