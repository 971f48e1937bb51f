use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use service::{LifecycleState, RandomNumberService};

use crate::errors::ApiError;
use crate::observability::{record, record_transition, start_timer};

const SPACE: &str = "random";

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Serialize)]
pub struct RandomNumber {
    pub result: i64,
}

pub fn router(svc: Arc<RandomNumberService>) -> Router {
    Router::new()
        .route("/random", get(generate))
        .route("/random/state", get(get_state))
        .route("/random/enable", post(enable))
        .route("/random/disable", post(disable))
        .with_state(svc)
}

pub async fn generate(
    State(svc): State<Arc<RandomNumberService>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<RandomNumber>, ApiError> {
    let _timer = start_timer(SPACE, "generate");
    let res = match query {
        Ok(Query(q)) => svc.generate(q.start, q.end).await,
        Err(rejection) => Err(ApiError::from(rejection).0),
    };
    record(SPACE, "generate", &res);
    Ok(Json(RandomNumber { result: res? }))
}

pub async fn get_state(State(svc): State<Arc<RandomNumberService>>) -> Json<LifecycleState> {
    Json(svc.state().await)
}

pub async fn enable(State(svc): State<Arc<RandomNumberService>>) -> Json<serde_json::Value> {
    svc.enable().await;
    record_transition(SPACE, "enable");
    Json(serde_json::json!({"status": "ENABLED"}))
}

pub async fn disable(State(svc): State<Arc<RandomNumberService>>) -> Result<Json<serde_json::Value>, ApiError> {
    record_transition(SPACE, "disable");
    svc.disable().await?;
    Ok(Json(serde_json::json!({"status": "DISABLED"})))
}
