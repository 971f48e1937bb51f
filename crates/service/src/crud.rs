use std::{collections::HashMap, marker::PhantomData, sync::Arc};

use tracing::{error, info, instrument, warn};

use crate::codec::{Entity, EntityCodec};
use crate::errors::ServiceError;
use crate::key::Namespace;
use crate::storage::KeyValueBackend;

/// CRUD operations for one entity type over one namespace of a key-value
/// backend.
///
/// Every call is a single backend round trip; failures are returned to the
/// caller as-is, nothing is retried here.
pub struct CrudService<T> {
    backend: Arc<dyn KeyValueBackend>,
    namespace: Namespace,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> CrudService<T> {
    pub fn new(backend: Arc<dyn KeyValueBackend>, namespace: Namespace) -> Self {
        Self { backend, namespace, _entity: PhantomData }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Write the default value, overwriting whatever was there.
    #[instrument(skip(self), fields(namespace = %self.namespace.as_str()))]
    pub async fn create(&self, name: &str) -> Result<(), ServiceError> {
        let key = self.namespace.key(name)?;
        info!(%key, entity = T::LABEL, "creating with default value");
        self.write(&key, &T::default()).await
    }

    #[instrument(skip(self, value), fields(namespace = %self.namespace.as_str()))]
    pub async fn put(&self, name: &str, value: &T) -> Result<(), ServiceError> {
        let key = self.namespace.key(name)?;
        info!(%key, entity = T::LABEL, "storing value");
        self.write(&key, value).await
    }

    #[instrument(skip(self), fields(namespace = %self.namespace.as_str()))]
    pub async fn get(&self, name: &str) -> Result<T, ServiceError> {
        let key = self.namespace.key(name)?;
        let envelope = self
            .backend
            .get(&key)
            .await
            .map_err(|e| {
                error!(%key, error = %e, "backend read failed");
                ServiceError::from(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("{} '{}'", T::LABEL, name)))?;
        T::decode(&envelope).map_err(|e| {
            error!(%key, error = %e, "stored value does not decode");
            ServiceError::from(e)
        })
    }

    /// All entities in the namespace. Entries that cannot be mapped back to a
    /// name or fail to decode are skipped and logged.
    #[instrument(skip(self), fields(namespace = %self.namespace.as_str()))]
    pub async fn get_all(&self) -> Result<HashMap<String, T>, ServiceError> {
        let pattern = self.namespace.pattern();
        let entries = self.backend.get_all_matching(&pattern).await.map_err(|e| {
            error!(%pattern, error = %e, "backend query failed");
            ServiceError::from(e)
        })?;

        let mut out = HashMap::with_capacity(entries.len());
        let mut skipped = 0usize;
        for (key, envelope) in entries {
            let Some(name) = self.namespace.name_of(&key) else {
                warn!(%key, "skipping key outside of entity naming scheme");
                skipped += 1;
                continue;
            };
            match T::decode(&envelope) {
                Ok(value) => {
                    out.insert(name.to_string(), value);
                }
                Err(e) => {
                    warn!(%key, error = %e, "skipping undecodable entry");
                    skipped += 1;
                }
            }
        }
        info!(count = out.len(), skipped, "fetched all entries");
        Ok(out)
    }

    /// Remove the entity; removing an absent name succeeds.
    #[instrument(skip(self), fields(namespace = %self.namespace.as_str()))]
    pub async fn delete(&self, name: &str) -> Result<(), ServiceError> {
        let key = self.namespace.key(name)?;
        info!(%key, "deleting value");
        self.backend.delete(&key).await.map_err(|e| {
            error!(%key, error = %e, "backend delete failed");
            ServiceError::from(e)
        })
    }

    async fn write(&self, key: &str, value: &T) -> Result<(), ServiceError> {
        let envelope = value.encode().map_err(|e| {
            error!(%key, error = %e, "encoding failed");
            ServiceError::from(e)
        })?;
        self.backend.set(key, envelope).await.map_err(|e| {
            error!(%key, error = %e, "backend write failed");
            ServiceError::from(e)
        })
    }
}
