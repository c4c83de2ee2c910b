//! Data Transfer Objects
//!
//! Request and response types for the HTTP endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Active websocket connections
    pub connections: usize,
    /// Live nodes in the topic tree
    pub topic_nodes: usize,
    /// Configured auth backend
    pub auth_backend: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

/// Server-side publish request
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    /// Topic to publish on
    pub topic: String,
    /// Arbitrary JSON payload
    #[serde(default)]
    pub data: Value,
}

/// Server-side publish response
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub topic: String,
    /// Number of connections the message was delivered to
    pub recipients: usize,
}
