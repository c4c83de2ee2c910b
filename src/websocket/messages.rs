//! WebSocket Message Types
//!
//! Defines all message types for WebSocket communication between
//! clients and the socker server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics (e.g., "room.42.chat", "room.42.*")
    Subscribe { topics: Vec<String> },
    /// Unsubscribe from topics
    Unsubscribe { topics: Vec<String> },
    /// Publish a payload on a topic
    Publish {
        topic: String,
        #[serde(default)]
        data: Value,
    },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
    /// Subscription confirmed
    Subscribed {
        /// Topics successfully subscribed to
        topics: Vec<String>,
    },
    /// Unsubscription confirmed
    Unsubscribed {
        /// Topics successfully unsubscribed from
        topics: Vec<String>,
    },
    /// A message published on a topic this connection matches
    Message { topic: String, data: Value },
    /// Publish acknowledged
    Published {
        topic: String,
        /// Number of connections the message was delivered to
        recipients: usize,
    },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

/// A publish routed through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic the message was published on
    pub topic: String,
    /// Connection that published it
    pub origin: String,
    /// The message delivered to subscribers
    pub message: ServerMessage,
}

impl WsEvent {
    /// Create a publish event
    pub fn publish(origin: &str, topic: &str, data: Value) -> Self {
        Self {
            topic: topic.to_string(),
            origin: origin.to_string(),
            message: ServerMessage::Message {
                topic: topic.to_string(),
                data,
            },
        }
    }
}
