//! Application State
//!
//! Shared state accessible by all handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::auth;
use crate::config::{Config, ConfigError};
use crate::websocket::{ConnectionHub, HubConfig};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub
    pub ws_hub: Arc<ConnectionHub>,
}

impl AppState {
    /// Create state with the hub and auth backend described by `config`
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let auth = auth::from_config(&config.auth)?;
        let hub = ConnectionHub::with_auth(HubConfig::from(&config.hub), auth);
        Ok(Self::with_hub(config, Arc::new(hub)))
    }

    /// Create state around an existing hub
    pub fn with_hub(config: Config, ws_hub: Arc<ConnectionHub>) -> Self {
        Self {
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub,
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}
