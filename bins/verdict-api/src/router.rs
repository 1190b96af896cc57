//! Result router: drains the result queue and pushes each result to the
//! one live connection registered for its submitter identity.

use std::sync::Arc;

use axum::extract::ws::Message;
use tracing::{debug, error, info};
use verdict_common::queue;
use verdict_common::types::JobResult;

use crate::ws::registry::ConnectionRegistry;

/// BLPOP timeout; the loop re-polls so a drop never wedges the router.
const POP_TIMEOUT_SECONDS: f64 = 5.0;

/// Outcome of one routing step.
///
/// Delivery is fire-and-forget: dropped results are logged and discarded,
/// never retried or buffered. The tagged outcome keeps the drop visible
/// and testable instead of silently swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// No connection is registered for the identity.
    DroppedNoConnection,
    /// A connection was registered but its channel is closed.
    DroppedClosed,
}

/// Run the routing loop until the process terminates.
///
/// A plain iterative loop: block on the result queue, route, repeat.
/// Redis errors back off for a second and retry rather than killing the
/// router task.
pub async fn run(
    mut redis_conn: redis::aio::ConnectionManager,
    registry: Arc<ConnectionRegistry>,
) {
    info!("Result router started");
    loop {
        match queue::pop_result(&mut redis_conn, POP_TIMEOUT_SECONDS).await {
            Ok(Some(result)) => match route(&registry, &result).await {
                Ok(DeliveryOutcome::Delivered) => {
                    info!(
                        identity = %result.identity,
                        problem_id = %result.problem_id,
                        status = %result.status,
                        "Result delivered"
                    );
                }
                Ok(outcome) => {
                    debug!(
                        identity = %result.identity,
                        problem_id = %result.problem_id,
                        outcome = ?outcome,
                        "Result dropped"
                    );
                }
                Err(e) => {
                    error!(identity = %result.identity, error = %e, "Failed to route result");
                }
            },
            Ok(None) => continue,
            Err(e) => {
                error!(error = %e, "Redis error");
                tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
            }
        }
    }
}

/// Route a single result to its submitter's live connection, if any.
pub async fn route(
    registry: &ConnectionRegistry,
    result: &JobResult,
) -> anyhow::Result<DeliveryOutcome> {
    let Some(sender) = registry.lookup(&result.identity).await else {
        return Ok(DeliveryOutcome::DroppedNoConnection);
    };

    let payload = serde_json::to_string(result)?;
    if sender.send(Message::Text(payload)).is_err() {
        // The receive half is gone; the connection task is tearing down.
        return Ok(DeliveryOutcome::DroppedClosed);
    }
    Ok(DeliveryOutcome::Delivered)
}
