//! WebSocket Connection Hub
//!
//! Manages all WebSocket connections, their topic subscriptions, and
//! message fan-out. Subscriptions live in a single [`TopicTree`] behind
//! one lock, so readers never observe a half-pruned branch.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, RwLock};
use uuid::Uuid;

use super::messages::{ServerMessage, WsEvent};
use crate::auth::{AllowAll, AuthBackend};
use crate::config::HubSettings;
use crate::tree::{TopicPath, TopicTree, TreeError};

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Manages all WebSocket connections and subscriptions
pub struct ConnectionHub {
    /// Active connections: ConnectionId → ConnectionHandle
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
    /// Topic subscriptions
    topics: RwLock<TopicTree<ConnectionId>>,
    /// Every publish is also sent here, for bridge listeners
    events_tx: broadcast::Sender<WsEvent>,
    /// Consulted before subscribe and publish
    auth: Arc<dyn AuthBackend>,
    config: HubConfig,
}

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
            event_capacity: 1024,
        }
    }
}

impl From<&HubSettings> for HubConfig {
    fn from(settings: &HubSettings) -> Self {
        Self {
            max_connections: settings.max_connections,
            event_capacity: settings.event_capacity,
        }
    }
}

/// Handle for sending messages to a specific connection
pub struct ConnectionHandle {
    /// Channel sender for this connection
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Topics this connection is subscribed to
    pub subscriptions: HashSet<String>,
}

impl ConnectionHub {
    /// Create a hub that allows every subscribe and publish
    pub fn new(config: HubConfig) -> Self {
        Self::with_auth(config, Arc::new(AllowAll))
    }

    /// Create a hub with a specific auth backend
    pub fn with_auth(config: HubConfig, auth: Arc<dyn AuthBackend>) -> Self {
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            connections: RwLock::new(HashMap::new()),
            topics: RwLock::new(TopicTree::new()),
            events_tx,
            auth,
            config,
        }
    }

    /// Register a new WebSocket connection
    ///
    /// Returns the connection ID on success, or an error if the connection
    /// limit has been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections {
                limit: self.config.max_connections,
            });
        }

        let id = Uuid::new_v4().to_string();
        connections.insert(
            id.clone(),
            ConnectionHandle {
                sender,
                subscriptions: HashSet::new(),
            },
        );

        tracing::info!(connection_id = %id, "WebSocket connected");
        Ok(id)
    }

    /// Unregister a connection and drop all of its subscriptions
    pub async fn unregister(&self, id: &str) {
        let handle = self.connections.write().await.remove(id);

        if let Some(handle) = handle {
            let member = id.to_string();
            let mut topics = self.topics.write().await;
            for topic in &handle.subscriptions {
                if let Err(e) = topics.remove(&member, topic) {
                    tracing::error!(
                        connection_id = %id,
                        topic = %topic,
                        error = %e,
                        "Subscription bookkeeping out of sync"
                    );
                }
            }
        }

        tracing::info!(connection_id = %id, "WebSocket disconnected");
    }

    /// Subscribe a connection to topics
    ///
    /// Invalid or unauthorized topics are skipped. Returns the topics
    /// that were accepted.
    pub async fn subscribe(&self, id: &str, topics: Vec<String>) -> Result<Vec<String>, HubError> {
        let mut accepted = Vec::with_capacity(topics.len());
        for topic in topics {
            if let Err(e) = TopicPath::parse(&topic) {
                tracing::warn!(connection_id = %id, error = %e, "Invalid topic ignored");
                continue;
            }
            if !self.auth.can_subscribe(id, &topic).await {
                tracing::warn!(connection_id = %id, topic = %topic, "Unauthorized topic ignored");
                continue;
            }
            accepted.push(topic);
        }

        let mut connections = self.connections.write().await;
        let handle = connections
            .get_mut(id)
            .ok_or(HubError::ConnectionNotFound)?;

        let mut tree = self.topics.write().await;
        for topic in &accepted {
            tree.add(id.to_string(), topic)?;
            handle.subscriptions.insert(topic.clone());
        }

        tracing::debug!(
            connection_id = %id,
            topics = ?accepted,
            "Subscribed to topics"
        );

        Ok(accepted)
    }

    /// Unsubscribe a connection from topics
    ///
    /// Topics the connection does not hold are skipped. Returns the topics
    /// that were removed.
    pub async fn unsubscribe(
        &self,
        id: &str,
        topics: Vec<String>,
    ) -> Result<Vec<String>, HubError> {
        let mut connections = self.connections.write().await;
        let handle = connections
            .get_mut(id)
            .ok_or(HubError::ConnectionNotFound)?;

        let member = id.to_string();
        let mut tree = self.topics.write().await;
        let mut unsubscribed = Vec::new();

        for topic in topics {
            if handle.subscriptions.contains(&topic) {
                tree.remove(&member, &topic)?;
                handle.subscriptions.remove(&topic);
                unsubscribed.push(topic);
            }
        }

        tracing::debug!(
            connection_id = %id,
            topics = ?unsubscribed,
            "Unsubscribed from topics"
        );

        Ok(unsubscribed)
    }

    /// Publish `data` on `topic` on behalf of connection `id`
    ///
    /// Returns the number of connections the message was delivered to.
    pub async fn publish(&self, id: &str, topic: &str, data: Value) -> Result<usize, HubError> {
        TopicPath::parse(topic)?;

        if !self.auth.can_publish(id, topic).await {
            return Err(HubError::Unauthorized {
                topic: topic.to_string(),
            });
        }

        let event = WsEvent::publish(id, topic, data);
        let delivered = self.broadcast(&event).await?;

        // No receivers is fine; the bridge is optional
        let _ = self.events_tx.send(event);

        Ok(delivered)
    }

    /// Deliver an event to every local connection its topic resolves to
    ///
    /// Also the entry point for events mirrored in from other instances.
    pub async fn broadcast(&self, event: &WsEvent) -> Result<usize, HubError> {
        let recipients = self.topics.read().await.resolve(&event.topic)?;
        let connections = self.connections.read().await;

        let mut sent_count = 0;
        for id in &recipients {
            if let Some(handle) = connections.get(id) {
                if handle.sender.send(event.message.clone()).is_ok() {
                    sent_count += 1;
                }
            }
        }

        tracing::trace!(
            topic = %event.topic,
            subscribers = sent_count,
            "Broadcast event"
        );

        Ok(sent_count)
    }

    /// Send a message directly to a specific connection
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        let handle = connections.get(id).ok_or(HubError::ConnectionNotFound)?;

        handle
            .sender
            .send(message)
            .map_err(|_| HubError::SendFailed)
    }

    /// Receive every publish handled by this hub
    pub fn subscribe_events(&self) -> broadcast::Receiver<WsEvent> {
        self.events_tx.subscribe()
    }

    /// Get the current connection count
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Number of connections a publish on `topic` would reach
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .await
            .resolve(topic)
            .map(|members| members.len())
            .unwrap_or(0)
    }

    /// Number of live nodes in the topic tree
    pub async fn topic_node_count(&self) -> usize {
        self.topics.read().await.node_count()
    }

    /// Name of the configured auth backend
    pub fn auth_backend(&self) -> &str {
        self.auth.name()
    }
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {limit})")]
    TooManyConnections { limit: usize },

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,

    #[error("Not authorized for topic: {topic}")]
    Unauthorized { topic: String },

    #[error(transparent)]
    Tree(#[from] TreeError),
}
