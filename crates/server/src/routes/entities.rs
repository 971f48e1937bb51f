use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use service::{Entity, LifecycleState, ServiceFacade};

use crate::errors::ApiError;
use crate::observability::{record, record_transition, start_timer};

/// Handler state for one entity space.
pub struct EntityCtx<T> {
    pub space: &'static str,
    pub facade: Arc<ServiceFacade<T>>,
}

impl<T> Clone for EntityCtx<T> {
    fn clone(&self) -> Self {
        Self { space: self.space, facade: Arc::clone(&self.facade) }
    }
}

#[derive(Serialize)]
pub struct Item<T> {
    pub name: String,
    pub value: T,
}

#[derive(Serialize)]
pub struct Items<T> {
    pub items: HashMap<String, T>,
}

fn ack() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true}))
}

/// Routes for one entity space, to be nested under `/<space>`.
pub fn router<T: Entity>(space: &'static str, facade: Arc<ServiceFacade<T>>) -> Router {
    Router::new()
        .route("/items", get(list_items::<T>))
        .route(
            "/items/:name",
            get(get_item::<T>).put(put_item::<T>).post(create_item::<T>).delete(delete_item::<T>),
        )
        .route("/state", get(get_state::<T>))
        .route("/enable", post(enable::<T>))
        .route("/disable", post(disable::<T>))
        .with_state(EntityCtx { space, facade })
}

pub async fn create_item<T: Entity>(
    State(ctx): State<EntityCtx<T>>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let _timer = start_timer(ctx.space, "create");
    let res = ctx.facade.create(&name).await;
    record(ctx.space, "create", &res);
    res?;
    Ok((StatusCode::CREATED, ack()))
}

pub async fn put_item<T: Entity>(
    State(ctx): State<EntityCtx<T>>,
    Path(name): Path<String>,
    body: Result<Json<T>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let _timer = start_timer(ctx.space, "put");
    let res = match body {
        Ok(Json(value)) => ctx.facade.put(&name, &value).await,
        Err(rejection) => Err(ApiError::from(rejection).0),
    };
    record(ctx.space, "put", &res);
    res?;
    Ok(ack())
}

pub async fn get_item<T: Entity>(
    State(ctx): State<EntityCtx<T>>,
    Path(name): Path<String>,
) -> Result<Json<Item<T>>, ApiError> {
    let _timer = start_timer(ctx.space, "get");
    let res = ctx.facade.get(&name).await;
    record(ctx.space, "get", &res);
    Ok(Json(Item { name, value: res? }))
}

pub async fn list_items<T: Entity>(State(ctx): State<EntityCtx<T>>) -> Result<Json<Items<T>>, ApiError> {
    let _timer = start_timer(ctx.space, "get_all");
    let res = ctx.facade.get_all().await;
    record(ctx.space, "get_all", &res);
    Ok(Json(Items { items: res? }))
}

pub async fn delete_item<T: Entity>(
    State(ctx): State<EntityCtx<T>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let _timer = start_timer(ctx.space, "delete");
    let res = ctx.facade.delete(&name).await;
    record(ctx.space, "delete", &res);
    res?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_state<T: Entity>(State(ctx): State<EntityCtx<T>>) -> Json<LifecycleState> {
    Json(ctx.facade.state().await)
}

pub async fn enable<T: Entity>(State(ctx): State<EntityCtx<T>>) -> Json<serde_json::Value> {
    ctx.facade.enable().await;
    record_transition(ctx.space, "enable");
    Json(serde_json::json!({"status": "ENABLED"}))
}

pub async fn disable<T: Entity>(State(ctx): State<EntityCtx<T>>) -> Result<Json<serde_json::Value>, ApiError> {
    record_transition(ctx.space, "disable");
    ctx.facade.disable().await?;
    Ok(Json(serde_json::json!({"status": "DISABLED"})))
}
