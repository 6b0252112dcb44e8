//! Connection registry for the collaboration channel.
//!
//! Tracks one connection per socket, its per-request subscriptions, and the
//! ephemeral typing-presence sets. Presence lives only here; nothing in this
//! module touches the database.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::extract::ws::Message;
use reforma_core::channel::ChannelMessage;
use tokio::sync::{mpsc, RwLock};

/// Identity attached to a live connection at upgrade time.
#[derive(Debug, Clone)]
pub struct Principal {
    pub tax_id: String,
    pub display_name: String,
    pub can_review: bool,
}

struct Connection {
    principal: Principal,
    sender: mpsc::UnboundedSender<Message>,
    subscriptions: HashSet<i64>,
}

/// Shared registry of live channel connections.
#[derive(Default)]
pub struct ChannelHub {
    /// Keyed by connection id (one per socket, not per principal).
    connections: RwLock<HashMap<String, Connection>>,
    /// Display names of principals currently typing, per request.
    typing: RwLock<HashMap<i64, HashSet<String>>>,
}

impl ChannelHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a connection and return the sender half for its writer task.
    pub async fn add_connection(
        &self,
        connection_id: String,
        principal: Principal,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut connections = self.connections.write().await;
        connections.insert(
            connection_id,
            Connection {
                principal,
                sender: tx,
                subscriptions: HashSet::new(),
            },
        );
        rx
    }

    /// Remove a connection and clear its typing presence everywhere.
    ///
    /// Returns the typing sets that changed so the caller can broadcast
    /// updates to the remaining subscribers.
    pub async fn remove_connection(&self, connection_id: &str) -> Vec<(i64, Vec<String>)> {
        let removed = {
            let mut connections = self.connections.write().await;
            connections.remove(connection_id)
        };

        let Some(connection) = removed else {
            return Vec::new();
        };

        let mut changed = Vec::new();
        let mut typing = self.typing.write().await;
        for request_id in &connection.subscriptions {
            if let Some(names) = typing.get_mut(request_id) {
                if names.remove(&connection.principal.display_name) {
                    let mut snapshot: Vec<String> = names.iter().cloned().collect();
                    snapshot.sort();
                    if names.is_empty() {
                        typing.remove(request_id);
                    }
                    changed.push((*request_id, snapshot));
                }
            }
        }
        changed
    }

    pub async fn subscribe(&self, connection_id: &str, request_id: i64) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(connection_id) {
            connection.subscriptions.insert(request_id);
        }
    }

    /// Drop a subscription and clear the principal's typing flag for it.
    ///
    /// Returns the updated typing set when it changed.
    pub async fn unsubscribe(&self, connection_id: &str, request_id: i64) -> Option<Vec<String>> {
        let display_name = {
            let mut connections = self.connections.write().await;
            let connection = connections.get_mut(connection_id)?;
            connection.subscriptions.remove(&request_id);
            connection.principal.display_name.clone()
        };
        self.clear_typing(request_id, &display_name).await
    }

    /// Set or clear a principal's typing flag for a request.
    ///
    /// Returns the resulting set of typing names when it changed, sorted for
    /// stable output. Setting an already-set flag is a no-op.
    pub async fn set_typing(
        &self,
        connection_id: &str,
        request_id: i64,
        is_typing: bool,
    ) -> Option<Vec<String>> {
        let display_name = {
            let connections = self.connections.read().await;
            let connection = connections.get(connection_id)?;
            if !connection.subscriptions.contains(&request_id) {
                return None;
            }
            connection.principal.display_name.clone()
        };

        if is_typing {
            let mut typing = self.typing.write().await;
            let names = typing.entry(request_id).or_default();
            if !names.insert(display_name) {
                return None;
            }
            let mut snapshot: Vec<String> = names.iter().cloned().collect();
            snapshot.sort();
            Some(snapshot)
        } else {
            self.clear_typing(request_id, &display_name).await
        }
    }

    async fn clear_typing(&self, request_id: i64, display_name: &str) -> Option<Vec<String>> {
        let mut typing = self.typing.write().await;
        let names = typing.get_mut(&request_id)?;
        if !names.remove(display_name) {
            return None;
        }
        let mut snapshot: Vec<String> = names.iter().cloned().collect();
        snapshot.sort();
        if names.is_empty() {
            typing.remove(&request_id);
        }
        Some(snapshot)
    }

    /// Send a message to every connection subscribed to a request.
    pub async fn send_to_request(&self, request_id: i64, message: &ChannelMessage) {
        let Ok(payload) = serde_json::to_string(message) else {
            tracing::error!(request_id, "failed to serialize channel message");
            return;
        };
        let connections = self.connections.read().await;
        for connection in connections.values() {
            if connection.subscriptions.contains(&request_id) {
                let _ = connection.sender.send(Message::Text(payload.clone().into()));
            }
        }
    }

    /// Send a message to every connection belonging to a principal.
    pub async fn send_to_recipient(&self, tax_id: &str, message: &ChannelMessage) {
        let Ok(payload) = serde_json::to_string(message) else {
            tracing::error!(tax_id, "failed to serialize channel message");
            return;
        };
        let connections = self.connections.read().await;
        for connection in connections.values() {
            if connection.principal.tax_id == tax_id {
                let _ = connection.sender.send(Message::Text(payload.clone().into()));
            }
        }
    }

    /// Send a message to a single connection.
    pub async fn send_to_connection(&self, connection_id: &str, message: &ChannelMessage) {
        let Ok(payload) = serde_json::to_string(message) else {
            tracing::error!(connection_id, "failed to serialize channel message");
            return;
        };
        let connections = self.connections.read().await;
        if let Some(connection) = connections.get(connection_id) {
            let _ = connection.sender.send(Message::Text(payload.into()));
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Ping every live connection; stale sockets surface as send failures
    /// in their writer tasks.
    pub async fn ping_all(&self) {
        let connections = self.connections.read().await;
        for connection in connections.values() {
            let _ = connection.sender.send(Message::Ping(Vec::new().into()));
        }
    }

    /// Send a close frame to every connection during shutdown.
    pub async fn shutdown_all(&self) {
        let mut connections = self.connections.write().await;
        for (_, connection) in connections.drain() {
            let _ = connection.sender.send(Message::Close(None));
        }
        self.typing.write().await.clear();
    }
}
