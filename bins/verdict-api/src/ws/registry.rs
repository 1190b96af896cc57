use std::collections::HashMap;

use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type ConnectionSender = mpsc::UnboundedSender<Message>;

/// One registered connection for a submitter identity.
struct Entry {
    /// Identifies the exact transport connection, not the submitter.
    /// Unregistration keys on this so a stale close event can never evict
    /// a newer connection that reused the same identity.
    conn_id: Uuid,
    display_name: String,
    sender: ConnectionSender,
}

/// Process-wide map from submitter identity to its current live connection.
///
/// At most one entry per identity: a later registration for the same
/// identity silently replaces the earlier one (last-registered-wins, not
/// stacked). Thread-safe via interior `RwLock`; designed to be wrapped in
/// `Arc` and shared between the connection-accept path and the result
/// router. A single global lock is sufficient at expected load.
pub struct ConnectionRegistry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl ConnectionRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection for `identity`. Idempotent upsert: any prior
    /// connection registered for the same identity is replaced, and its
    /// sender dropped, even if that connection is still open.
    pub async fn register(
        &self,
        identity: String,
        display_name: String,
        conn_id: Uuid,
        sender: ConnectionSender,
    ) {
        let replaced = self.entries.write().await.insert(
            identity.clone(),
            Entry {
                conn_id,
                display_name,
                sender,
            },
        );
        if let Some(old) = replaced {
            tracing::debug!(
                identity = %identity,
                old_conn_id = %old.conn_id,
                new_conn_id = %conn_id,
                "Registration replaced an earlier connection"
            );
        }
    }

    /// Remove the entry owned by this exact connection.
    ///
    /// Keys on the connection id, not the identity: when a newer connection
    /// has already overwritten the identity's entry, the old connection's
    /// close event must leave the newer entry in place. No-op if nothing
    /// in the map points at `conn_id`.
    pub async fn unregister(&self, conn_id: Uuid) {
        self.entries
            .write()
            .await
            .retain(|_, entry| entry.conn_id != conn_id);
    }

    /// Sender for the identity's current live connection, if any.
    pub async fn lookup(&self, identity: &str) -> Option<ConnectionSender> {
        self.entries
            .read()
            .await
            .get(identity)
            .map(|entry| entry.sender.clone())
    }

    /// Display name recorded at registration time, if the identity is live.
    pub async fn display_name(&self, identity: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(identity)
            .map(|entry| entry.display_name.clone())
    }

    /// Number of currently registered identities.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
