mod executor;

use tokio::signal;
use tracing::{error, info, instrument, warn};
use verdict_common::config::Config;
use verdict_common::queue;

/// BLPOP timeout; short enough that shutdown is noticed promptly.
const POP_TIMEOUT_SECONDS: f64 = 5.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("Verdict worker booting...");

    let config = Config::from_env();

    // Tolerates the broker being down at startup.
    let mut redis_conn = queue::connect_with_retry(&config.redis_url).await?;

    // Setup graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C signal handler");
        warn!("Received shutdown signal");
    };

    tokio::select! {
        _ = worker_loop(&mut redis_conn, &config) => {},
        _ = shutdown => {},
    }

    info!("Worker shutdown complete");
    Ok(())
}

/// Drain the job queue forever: pop one job, execute it, push one result.
///
/// Strictly single-threaded per worker instance: jobs complete in dequeue
/// order, never concurrently. Fail-open on every per-job error so a broken
/// job or a failed result write advances the loop instead of wedging it.
/// A job lost between pop and result push is not recovered; delivery is
/// at-most-once by design.
#[instrument(skip_all)]
async fn worker_loop(
    redis_conn: &mut redis::aio::ConnectionManager,
    config: &Config,
) -> anyhow::Result<()> {
    info!("Worker ready, waiting for jobs");
    loop {
        match queue::pop_job(redis_conn, POP_TIMEOUT_SECONDS).await {
            Ok(Some(job)) => {
                process_job(redis_conn, job, config.execution_delay).await;
            }
            Ok(None) => {
                // Timeout - check for shutdown
                continue;
            }
            Err(e) => {
                error!(error = %e, "Redis error");
                tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
            }
        }
    }
}

/// Execute one job and enqueue its result.
///
/// Never propagates a per-job error: a failed result write is logged and
/// the job is lost, the caller always advances to the next pop.
async fn process_job(
    redis_conn: &mut redis::aio::ConnectionManager,
    job: verdict_common::types::Job,
    delay: std::time::Duration,
) {
    info!(
        identity = %job.identity,
        problem_id = %job.problem_id,
        language = %job.language,
        source_size = job.code.len(),
        "Received job"
    );

    let start = std::time::Instant::now();
    let result = executor::execute(&job, delay).await;

    info!(
        identity = %job.identity,
        problem_id = %job.problem_id,
        status = %result.status,
        execution_ms = start.elapsed().as_millis() as u64,
        "Execution completed"
    );

    match queue::push_result(redis_conn, &result).await {
        Ok(_) => {
            info!(identity = %job.identity, "Result enqueued");
        }
        Err(e) => {
            // Non-fatal: the result is lost, the worker continues.
            error!(identity = %job.identity, error = %e, "Failed to enqueue result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis::AsyncCommands;
    use std::time::Duration;
    use verdict_common::types::Job;

    async fn connection() -> redis::aio::ConnectionManager {
        queue::connect_with_retry("redis://127.0.0.1:6379")
            .await
            .expect("Failed to connect to Redis")
    }

    fn job(identity: &str) -> Job {
        Job {
            identity: identity.to_string(),
            display_name: "alice".to_string(),
            problem_id: "two_sum".to_string(),
            code: "print(1)".to_string(),
            language: "python".to_string(),
        }
    }

    /// Requires a running Redis instance.
    #[tokio::test]
    #[ignore]
    async fn processed_job_lands_on_the_result_queue() {
        let mut conn = connection().await;
        let _: () = redis::cmd("DEL")
            .arg(queue::RESULT_QUEUE)
            .query_async(&mut conn)
            .await
            .expect("cleanup failed");

        process_job(&mut conn, job("u1"), Duration::from_millis(10)).await;

        let result = queue::pop_result(&mut conn, 1.0)
            .await
            .expect("pop failed")
            .expect("no result enqueued");
        assert_eq!(result.identity, "u1");
        assert_eq!(result.problem_id, "two_sum");
        assert!(!result.status.is_empty());
    }

    /// Requires a running Redis instance.
    ///
    /// RPUSH fails when the result queue key holds the wrong type; the
    /// worker must swallow that and return normally instead of crashing.
    #[tokio::test]
    #[ignore]
    async fn result_write_failure_does_not_propagate() {
        let mut conn = connection().await;
        let _: () = conn
            .set(queue::RESULT_QUEUE, "not-a-list")
            .await
            .expect("setup failed");

        process_job(&mut conn, job("u2"), Duration::from_millis(10)).await;

        let _: () = redis::cmd("DEL")
            .arg(queue::RESULT_QUEUE)
            .query_async(&mut conn)
            .await
            .expect("cleanup failed");
    }
}
