use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::Entity;
use crate::crud::CrudService;
use crate::errors::ServiceError;
use crate::key::Namespace;
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::storage::KeyValueBackend;

/// Entity CRUD behind a lifecycle guard.
///
/// Business operations are admitted by the lifecycle first; the lifecycle
/// controls themselves are always available.
pub struct ServiceFacade<T> {
    crud: CrudService<T>,
    lifecycle: Lifecycle,
}

impl<T: Entity> ServiceFacade<T> {
    pub fn new(crud: CrudService<T>, lifecycle: Lifecycle) -> Self {
        Self { crud, lifecycle }
    }

    /// Facade over `namespace` of `backend`, with a lifecycle named after
    /// the namespace.
    pub fn over(
        backend: Arc<dyn KeyValueBackend>,
        namespace: &str,
        request_quota: Option<u64>,
    ) -> Result<Self, ServiceError> {
        let namespace = Namespace::new(namespace)?;
        let lifecycle = Lifecycle::new(namespace.as_str()).with_request_quota(request_quota);
        Ok(Self::new(CrudService::new(backend, namespace), lifecycle))
    }

    pub fn namespace(&self) -> &Namespace {
        self.crud.namespace()
    }

    pub async fn create(&self, name: &str) -> Result<(), ServiceError> {
        let _admitted = self.lifecycle.admit().await?;
        self.crud.create(name).await
    }

    pub async fn put(&self, name: &str, value: &T) -> Result<(), ServiceError> {
        let _admitted = self.lifecycle.admit().await?;
        self.crud.put(name, value).await
    }

    pub async fn get(&self, name: &str) -> Result<T, ServiceError> {
        let _admitted = self.lifecycle.admit().await?;
        self.crud.get(name).await
    }

    pub async fn get_all(&self) -> Result<HashMap<String, T>, ServiceError> {
        let _admitted = self.lifecycle.admit().await?;
        self.crud.get_all().await
    }

    pub async fn delete(&self, name: &str) -> Result<(), ServiceError> {
        let _admitted = self.lifecycle.admit().await?;
        self.crud.delete(name).await
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    pub async fn enable(&self) {
        self.lifecycle.enable().await
    }

    pub async fn disable(&self) -> Result<(), ServiceError> {
        self.lifecycle.disable().await
    }

    #[cfg(test)]
    pub(crate) async fn force_error(&self, reason: &str) {
        self.lifecycle.force_error(reason).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Counter, Point};
    use crate::storage::InMemoryBackend;

    fn counters() -> ServiceFacade<Counter> {
        ServiceFacade::over(Arc::new(InMemoryBackend::new()), "demo_counters", None).unwrap()
    }

    #[tokio::test]
    async fn put_get_round_trip() -> Result<(), ServiceError> {
        let svc = ServiceFacade::<Point>::over(Arc::new(InMemoryBackend::new()), "points", None)?;
        for (name, p) in [
            ("origin", Point::default()),
            ("neg", Point { x: -1.5, y: 0.25, z: -1e9 }),
            ("far", Point { x: 123456.75, y: -0.125, z: 42.0 }),
        ] {
            svc.put(name, &p).await?;
            assert_eq!(svc.get(name).await?, p);
        }
        Ok(())
    }

    #[tokio::test]
    async fn get_all_is_complete() -> Result<(), ServiceError> {
        let svc = counters();
        svc.put("b", &Counter(2)).await?;
        svc.put("a", &Counter(1)).await?;
        let all = svc.get_all().await?;
        assert_eq!(all, HashMap::from([("a".to_string(), Counter(1)), ("b".to_string(), Counter(2))]));
        Ok(())
    }

    #[tokio::test]
    async fn disabled_service_rejects_business_calls() -> Result<(), ServiceError> {
        let svc = counters();
        svc.create("c").await?;
        svc.disable().await?;

        assert!(matches!(svc.get("c").await, Err(ServiceError::FailedPrecondition(_))));
        assert!(matches!(svc.put("c", &Counter(1)).await, Err(ServiceError::FailedPrecondition(_))));
        assert!(matches!(svc.delete("c").await, Err(ServiceError::FailedPrecondition(_))));
        assert!(matches!(svc.create("d").await, Err(ServiceError::FailedPrecondition(_))));
        assert!(matches!(svc.get_all().await, Err(ServiceError::FailedPrecondition(_))));
        // lifecycle controls stay reachable
        assert_eq!(svc.state().await, LifecycleState::Disabled);

        svc.enable().await;
        assert_eq!(svc.get("c").await?, Counter(0));
        svc.put("c", &Counter(1)).await?;
        svc.delete("c").await?;
        Ok(())
    }

    #[tokio::test]
    async fn error_state_blocks_disable_and_enable_recovers() -> Result<(), ServiceError> {
        let svc = counters();
        svc.force_error("forced").await;
        assert!(matches!(svc.disable().await, Err(ServiceError::InvalidTransition(_))));
        assert!(matches!(svc.get("c").await, Err(ServiceError::FailedPrecondition(_))));

        svc.enable().await;
        assert_eq!(svc.state().await, LifecycleState::Enabled);
        svc.create("c").await?;
        assert_eq!(svc.get("c").await?, Counter(0));
        Ok(())
    }

    #[tokio::test]
    async fn quota_applies_to_crud_calls() -> Result<(), ServiceError> {
        let svc = ServiceFacade::<Counter>::over(Arc::new(InMemoryBackend::new()), "q", Some(1))?;
        svc.create("c").await?;
        assert!(matches!(svc.get("c").await, Err(ServiceError::FailedPrecondition(_))));
        assert_eq!(svc.state().await.code(), "ERROR");
        svc.enable().await;
        assert_eq!(svc.get("c").await?, Counter(0));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_calls_on_distinct_names() -> Result<(), anyhow::Error> {
        let svc = Arc::new(counters());
        let mut handles = Vec::new();
        for i in 0..32i64 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                let name = format!("c{i}");
                svc.put(&name, &Counter(i)).await?;
                svc.get(&name).await
            }));
        }
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.await??, Counter(i as i64));
        }
        assert_eq!(svc.get_all().await?.len(), 32);
        Ok(())
    }
}
