// HTTP route handlers for the verdict API.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use redis::RedisResult;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use verdict_common::queue;
use verdict_common::types::Job;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: String,
}

/// POST /submit - Accept a code submission and enqueue it for execution.
///
/// Required fields are checked here, before the queue is ever touched; the
/// result reaches the submitter asynchronously over its registered
/// WebSocket connection, there is no polling endpoint.
pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(job): Json<Job>,
) -> Response {
    let missing = job.missing_fields();
    if !missing.is_empty() {
        warn!(fields = ?missing, "Submission rejected, missing required fields");
        return rejection_response(missing);
    }

    let mut conn = state.redis.clone();
    let outcome = queue::push_job(&mut conn, &job).await;
    enqueue_response(&job, outcome)
}

/// 400 with the wire names of the missing fields; the queue is never touched.
fn rejection_response(missing: Vec<&'static str>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": "missing required fields",
            "fields": missing,
        })),
    )
        .into_response()
}

/// Map the queue write outcome to the submission response:
/// acknowledged on success, server error when the broker write failed.
fn enqueue_response(job: &Job, outcome: RedisResult<()>) -> Response {
    match outcome {
        Ok(_) => {
            info!(
                identity = %job.identity,
                problem_id = %job.problem_id,
                language = %job.language,
                source_size = job.code.len(),
                "Job queued"
            );
            (
                StatusCode::ACCEPTED,
                Json(SubmitResponse {
                    status: "queued".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(identity = %job.identity, error = %e, "Failed to queue job");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "failed to enqueue job",
                })),
            )
                .into_response()
        }
    }
}

/// GET /status - Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
