use crate::types::{Job, JobResult};
use redis::{AsyncCommands, RedisResult};
use std::time::Duration;
use tracing::{info, warn};

/// Redis queue semantics - defines only semantics, not runtime logic.
/// Ensures API and worker never drift and Redis keys stay deterministic.

pub const JOB_QUEUE: &str = "verdict:queue:jobs";
pub const RESULT_QUEUE: &str = "verdict:queue:results";

/// Initial delay between broker connection attempts.
const RETRY_BASE: Duration = Duration::from_millis(500);
/// Backoff is bounded; retries are not.
const RETRY_CAP: Duration = Duration::from_secs(10);

fn serialization_error(e: serde_json::Error) -> redis::RedisError {
    redis::RedisError::from((
        redis::ErrorKind::TypeError,
        "serialization error",
        e.to_string(),
    ))
}

fn deserialization_error(e: serde_json::Error) -> redis::RedisError {
    redis::RedisError::from((
        redis::ErrorKind::TypeError,
        "deserialization error",
        e.to_string(),
    ))
}

/// Connect to the broker, retrying with bounded backoff until it is up.
///
/// The broker may be unavailable at startup; neither binary gives up on it.
pub async fn connect_with_retry(redis_url: &str) -> anyhow::Result<redis::aio::ConnectionManager> {
    let client = redis::Client::open(redis_url)?;
    let mut delay = RETRY_BASE;
    loop {
        match redis::aio::ConnectionManager::new(client.clone()).await {
            Ok(conn) => {
                info!(url = %redis_url, "Connected to Redis");
                return Ok(conn);
            }
            Err(e) => {
                warn!(error = %e, retry_in_ms = delay.as_millis() as u64, "Redis unavailable, retrying");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(RETRY_CAP);
            }
        }
    }
}

/// Append a job to the job queue tail.
/// Uses RPUSH for FIFO semantics; a write failure propagates to the caller.
pub async fn push_job(
    conn: &mut redis::aio::ConnectionManager,
    job: &Job,
) -> RedisResult<()> {
    let payload = serde_json::to_string(job).map_err(serialization_error)?;
    conn.rpush(JOB_QUEUE, payload).await
}

/// Pop the next job, blocking up to `timeout_seconds`.
///
/// BLPOP hands the item to exactly one caller; `Ok(None)` on timeout lets
/// the worker loop re-check for shutdown instead of blocking forever.
pub async fn pop_job(
    conn: &mut redis::aio::ConnectionManager,
    timeout_seconds: f64,
) -> RedisResult<Option<Job>> {
    let result: Option<(String, String)> = conn.blpop(JOB_QUEUE, timeout_seconds).await?;
    match result {
        Some((_key, payload)) => {
            let job: Job = serde_json::from_str(&payload).map_err(deserialization_error)?;
            Ok(Some(job))
        }
        None => Ok(None),
    }
}

/// Append an execution result to the result queue tail.
pub async fn push_result(
    conn: &mut redis::aio::ConnectionManager,
    result: &JobResult,
) -> RedisResult<()> {
    let payload = serde_json::to_string(result).map_err(serialization_error)?;
    conn.rpush(RESULT_QUEUE, payload).await
}

/// Pop the next execution result, blocking up to `timeout_seconds`.
pub async fn pop_result(
    conn: &mut redis::aio::ConnectionManager,
    timeout_seconds: f64,
) -> RedisResult<Option<JobResult>> {
    let result: Option<(String, String)> = conn.blpop(RESULT_QUEUE, timeout_seconds).await?;
    match result {
        Some((_key, payload)) => {
            let parsed: JobResult = serde_json::from_str(&payload).map_err(deserialization_error)?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Job;

    fn job(identity: &str, problem_id: &str) -> Job {
        Job {
            identity: identity.to_string(),
            display_name: "alice".to_string(),
            problem_id: problem_id.to_string(),
            code: "print(1)".to_string(),
            language: "python".to_string(),
        }
    }

    #[test]
    fn queue_names_are_distinct() {
        assert_ne!(JOB_QUEUE, RESULT_QUEUE);
        assert!(JOB_QUEUE.starts_with("verdict:queue:"));
        assert!(RESULT_QUEUE.starts_with("verdict:queue:"));
    }

    /// Requires a running Redis instance.
    #[tokio::test]
    #[ignore]
    async fn jobs_pop_in_push_order() {
        let mut conn = connect_with_retry("redis://127.0.0.1:6379")
            .await
            .expect("Failed to connect to Redis");

        // Drain anything left over from a previous run.
        while pop_job(&mut conn, 0.1).await.expect("pop failed").is_some() {}

        push_job(&mut conn, &job("u1", "two_sum")).await.expect("push failed");
        push_job(&mut conn, &job("u2", "reverse_list")).await.expect("push failed");

        let first = pop_job(&mut conn, 1.0).await.expect("pop failed").expect("queue empty");
        let second = pop_job(&mut conn, 1.0).await.expect("pop failed").expect("queue empty");

        assert_eq!(first.identity, "u1");
        assert_eq!(first.problem_id, "two_sum");
        assert_eq!(second.identity, "u2");
    }

    /// Requires a running Redis instance.
    ///
    /// RPUSH fails when the queue key holds the wrong type; the error must
    /// reach the caller so the submission boundary can report it.
    #[tokio::test]
    #[ignore]
    async fn push_failure_propagates_to_the_caller() {
        let mut conn = connect_with_retry("redis://127.0.0.1:6379")
            .await
            .expect("Failed to connect to Redis");

        let _: () = conn.set(JOB_QUEUE, "not-a-list").await.expect("setup failed");

        let pushed = push_job(&mut conn, &job("u1", "two_sum")).await;
        assert!(pushed.is_err());

        let _: () = redis::cmd("DEL")
            .arg(JOB_QUEUE)
            .query_async(&mut conn)
            .await
            .expect("cleanup failed");
    }

    /// Requires a running Redis instance.
    #[tokio::test]
    #[ignore]
    async fn pop_times_out_on_empty_queue() {
        let mut conn = connect_with_retry("redis://127.0.0.1:6379")
            .await
            .expect("Failed to connect to Redis");

        while pop_result(&mut conn, 0.1).await.expect("pop failed").is_some() {}

        let popped = pop_result(&mut conn, 0.2).await.expect("pop failed");
        assert!(popped.is_none());
    }
}
