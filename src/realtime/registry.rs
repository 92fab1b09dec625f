//! Registry of live WebSocket connections
//!
//! Each connection is represented by the sender half of its outbound queue.
//! A send that fails means the writer task is gone, so the connection is
//! dropped from the registry on the spot.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};

/// Opaque connection identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

struct Connection {
    sender: mpsc::UnboundedSender<String>,
    connected_at: DateTime<Utc>,
}

/// Active connections, keyed by id
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outbound queue.
    pub async fn add(&self, id: ConnectionId, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(
            id,
            Connection {
                sender,
                connected_at: Utc::now(),
            },
        );
        tracing::debug!(connection_id = %id, total = connections.len(), "Connection registered");
    }

    /// Drop a connection. Unknown ids are ignored.
    pub async fn remove(&self, id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if let Some(conn) = connections.remove(&id) {
            tracing::debug!(
                connection_id = %id,
                total = connections.len(),
                connected_secs = (Utc::now() - conn.connected_at).num_seconds(),
                "Connection removed"
            );
        }
    }

    /// Deliver one message. Returns false (and forgets the connection) when
    /// delivery fails; unknown ids also report false.
    pub async fn send_to(&self, id: ConnectionId, message: &str) -> bool {
        let delivered = {
            let connections = self.connections.read().await;
            match connections.get(&id) {
                Some(conn) => conn.sender.send(message.to_string()).is_ok(),
                None => return false,
            }
        };

        if !delivered {
            tracing::debug!(connection_id = %id, "Send failed; dropping connection");
            self.remove(id).await;
        }
        delivered
    }

    /// Deliver to every connection. Failed connections are removed after the
    /// sweep. Returns the number of successful deliveries.
    pub async fn broadcast(&self, message: &str) -> usize {
        let (delivered, failed) = {
            let connections = self.connections.read().await;
            let mut delivered = 0;
            let mut failed = Vec::new();
            for (id, conn) in connections.iter() {
                if conn.sender.send(message.to_string()).is_ok() {
                    delivered += 1;
                } else {
                    failed.push(*id);
                }
            }
            (delivered, failed)
        };

        if !failed.is_empty() {
            let mut connections = self.connections.write().await;
            for id in &failed {
                connections.remove(id);
            }
            tracing::debug!(dropped = failed.len(), "Broadcast dropped dead connections");
        }
        delivered
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }
}
