mod handlers;
mod router;
mod routes;
mod ws;

use std::sync::Arc;

use axum::Router;
use redis::aio::ConnectionManager;
use tokio::net::TcpListener;
use tracing::info;
use verdict_common::config::Config;
use verdict_common::queue;

use crate::ws::ConnectionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub redis: ConnectionManager,
    pub registry: Arc<ConnectionRegistry>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Verdict API booting...");

    let config = Config::from_env();

    // Tolerates the broker being down at startup.
    let redis_conn = queue::connect_with_retry(&config.redis_url).await?;

    let registry = Arc::new(ConnectionRegistry::new());

    // The result router runs for the lifetime of the process, sharing the
    // registry with the connection-accept path.
    tokio::spawn(router::run(redis_conn.clone(), registry.clone()));

    let state = Arc::new(AppState {
        redis: redis_conn,
        registry,
    });

    let app = Router::new().merge(routes::routes()).with_state(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("HTTP server listening on {}", config.bind_addr);
    info!("Ready to accept submissions");

    axum::serve(listener, app).await?;
    Ok(())
}
