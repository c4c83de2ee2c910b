//! # Socker
//!
//! Websocket pub/sub server with hierarchical wildcard topics and
//! pluggable authorization.
//!
//! ## Modules
//!
//! - [`tree`]: Topic tree mapping dot-delimited paths to subscribers
//! - [`websocket`]: Connection hub, message protocol and upgrade handler
//! - [`auth`]: Authorization backends consulted before subscribe/publish
//! - [`api`]: Axum router, shared state and health endpoints
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use socker::tree::TopicTree;
//!
//! let mut tree = TopicTree::new();
//! tree.add(1u64, "room.42.chat").unwrap();
//! tree.add(2u64, "room.42.*").unwrap();
//!
//! let members = tree.resolve("room.42.chat").unwrap();
//! assert_eq!(members.len(), 2);
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod tree;
pub mod websocket;

pub use tree::{TopicNode, TopicPath, TopicTree, TreeError, TreeResult};

pub use api::{build_router, run, serve, ApiError, AppState};

pub use auth::{AllowAll, AuthBackend, PrefixAuth};

pub use websocket::{
    websocket_handler, ClientMessage, ConnectionHub, ConnectionId, HubConfig, HubError,
    ServerMessage, WsEvent,
};

pub use config::{
    AuthConfig, Config, ConfigError, HubSettings, LoggingConfig, ServerConfig,
};
