use serde::{Deserialize, Serialize};

/// A unit of submitted work awaiting execution.
///
/// Created at the submission boundary, serialized onto the job queue,
/// consumed exactly once by a worker. The queue is the only store; there
/// is no secondary job log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    /// Opaque stable string identifying one logical client across reconnects.
    pub identity: String,
    pub display_name: String,
    pub problem_id: String,
    pub code: String,
    pub language: String,
}

impl Job {
    /// Names of the required fields that are missing or empty.
    ///
    /// Identity, display name and problem id must be non-empty before the
    /// job may touch the queue. Empty is an error at the producing boundary,
    /// never inside the queue.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.identity.trim().is_empty() {
            missing.push("identity");
        }
        if self.display_name.trim().is_empty() {
            missing.push("displayName");
        }
        if self.problem_id.trim().is_empty() {
            missing.push("problemId");
        }
        missing
    }
}

/// The outcome of executing one [`Job`].
///
/// The worker copies `identity` through unchanged; the result router relies
/// on it to correlate the result back to the submitter's live connection.
/// An execution failure is not exceptional here, it is just a `status` value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub identity: String,
    pub display_name: String,
    pub problem_id: String,
    pub status: String,
}

impl JobResult {
    /// Build the result for a job with the given execution status,
    /// carrying the correlation fields through unchanged.
    pub fn for_job(job: &Job, status: impl Into<String>) -> Self {
        Self {
            identity: job.identity.clone(),
            display_name: job.display_name.clone(),
            problem_id: job.problem_id.clone(),
            status: status.into(),
        }
    }
}

/// Inbound message on a client WebSocket connection.
///
/// A freshly accepted connection is inert until it sends `register`;
/// only afterwards is it eligible to receive routed results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Register {
        identity: String,
        display_name: String,
    },
}
