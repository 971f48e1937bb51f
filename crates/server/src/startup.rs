use std::{net::SocketAddr, time::Duration};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Build the services named by `cfg`, then serve HTTP until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&cfg).await?;

    let timeout = Duration::from_secs(cfg.server.request_timeout_secs);
    let app: Router = routes::build_router(state, build_cors(), timeout);

    let addr = bind_addr(&cfg)?;
    info!(%addr, counters = %cfg.store.counters_namespace, points = %cfg.store.points_namespace, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received, draining connections");
        })
        .await?;
    Ok(())
}
