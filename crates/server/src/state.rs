use std::sync::Arc;

use configs::{AppConfig, BackendKind, LifecycleConfig, StoreConfig};
use service::storage::{InMemoryBackend, JsonFileBackend, KeyValueBackend};
use service::{Counter, Point, RandomNumberService, ServiceFacade};
use tracing::info;

/// Services shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub counters: Arc<ServiceFacade<Counter>>,
    pub points: Arc<ServiceFacade<Point>>,
    pub random: Arc<RandomNumberService>,
}

impl AppState {
    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let backend: Arc<dyn KeyValueBackend> = match cfg.store.backend {
            BackendKind::Memory => {
                info!("using in-memory key-value backend");
                Arc::new(InMemoryBackend::new())
            }
            BackendKind::JsonFile => {
                let path = cfg
                    .store
                    .path
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.path missing for json_file backend"))?;
                common::env::ensure_data_dir(path).await?;
                info!(%path, "using json file key-value backend");
                Arc::new(JsonFileBackend::open(path).await?)
            }
        };
        Self::with_backend(backend, &cfg.store, &cfg.lifecycle)
    }

    pub fn with_backend(
        backend: Arc<dyn KeyValueBackend>,
        store: &StoreConfig,
        lifecycle: &LifecycleConfig,
    ) -> anyhow::Result<Self> {
        let counters = ServiceFacade::over(
            Arc::clone(&backend),
            &store.counters_namespace,
            lifecycle.counters_request_quota,
        )?;
        let points = ServiceFacade::over(backend, &store.points_namespace, lifecycle.points_request_quota)?;
        Ok(Self {
            counters: Arc::new(counters),
            points: Arc::new(points),
            random: Arc::new(RandomNumberService::new(lifecycle.random_request_quota)),
        })
    }
}
