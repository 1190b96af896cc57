use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::ws;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/submit", post(handlers::submit_job))
        .route("/status", get(handlers::health_check))
        .route("/ws", get(ws::ws_handler))
}
