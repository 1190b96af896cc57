//! Job executor.
//!
//! Stands in for a real sandboxed execution engine: the submitted code is
//! not actually run, a fixed delay simulates the execution and the result
//! always reports success. A real engine plugged in here would own its own
//! timeout and cancellation.

use std::time::Duration;

use tracing::debug;
use verdict_common::types::{Job, JobResult};

pub const STATUS_EXECUTED: &str = "executed";

/// Execute a single job and produce its result.
///
/// Infallible on purpose: an execution failure is encoded in the result's
/// `status`, never raised, so a broken job can never wedge the worker loop.
/// Correlation fields are copied through from the job unchanged.
pub async fn execute(job: &Job, delay: Duration) -> JobResult {
    debug!(
        identity = %job.identity,
        problem_id = %job.problem_id,
        delay_ms = delay.as_millis() as u64,
        "Simulating execution"
    );
    tokio::time::sleep(delay).await;
    JobResult::for_job(job, STATUS_EXECUTED)
}
