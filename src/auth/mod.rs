//! Authorization Backends
//!
//! Decides whether a connection may subscribe or publish to a topic.
//! The hub consults the backend before touching the topic tree.
//!
//! - [`AllowAll`]: permits everything (default)
//! - [`PrefixAuth`]: permits topics whose first segment is in a configured set

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{AuthConfig, ConfigError};
use crate::tree::TopicPath;

/// Common trait for all auth backends
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Unique name for this backend
    fn name(&self) -> &str;

    /// May `connection_id` subscribe to `topic`?
    async fn can_subscribe(&self, connection_id: &str, topic: &str) -> bool;

    /// May `connection_id` publish on `topic`?
    async fn can_publish(&self, connection_id: &str, topic: &str) -> bool;
}

/// Build the backend named in the configuration
pub fn from_config(config: &AuthConfig) -> Result<Arc<dyn AuthBackend>, ConfigError> {
    match config.backend.as_str() {
        AllowAll::NAME => Ok(Arc::new(AllowAll)),
        PrefixAuth::NAME => Ok(Arc::new(PrefixAuth::new(
            config.subscribe_prefixes.iter().cloned(),
            config.publish_prefixes.iter().cloned(),
        ))),
        other => Err(ConfigError::UnknownAuthBackend(other.to_string())),
    }
}

/// Backend that allows every request
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AllowAll {
    pub const NAME: &'static str = "allow_all";
}

#[async_trait]
impl AuthBackend for AllowAll {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn can_subscribe(&self, _connection_id: &str, _topic: &str) -> bool {
        true
    }

    async fn can_publish(&self, _connection_id: &str, _topic: &str) -> bool {
        true
    }
}

/// Backend that restricts topics by their first segment
///
/// An empty prefix set allows every topic for that action.
#[derive(Debug, Clone, Default)]
pub struct PrefixAuth {
    subscribe: HashSet<String>,
    publish: HashSet<String>,
}

impl PrefixAuth {
    pub const NAME: &'static str = "prefix";

    pub fn new(
        subscribe: impl IntoIterator<Item = String>,
        publish: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            subscribe: subscribe.into_iter().collect(),
            publish: publish.into_iter().collect(),
        }
    }

    fn allowed(prefixes: &HashSet<String>, topic: &str) -> bool {
        if prefixes.is_empty() {
            return true;
        }
        // Invalid paths are rejected later by the tree
        TopicPath::parse(topic)
            .map(|path| prefixes.contains(path.root_segment()))
            .unwrap_or(true)
    }
}

#[async_trait]
impl AuthBackend for PrefixAuth {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn can_subscribe(&self, connection_id: &str, topic: &str) -> bool {
        let allowed = Self::allowed(&self.subscribe, topic);
        if !allowed {
            tracing::debug!(connection_id = %connection_id, topic = %topic, "Subscribe denied");
        }
        allowed
    }

    async fn can_publish(&self, connection_id: &str, topic: &str) -> bool {
        let allowed = Self::allowed(&self.publish, topic);
        if !allowed {
            tracing::debug!(connection_id = %connection_id, topic = %topic, "Publish denied");
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_allow_all() {
        let backend = AllowAll;
        assert!(backend.can_subscribe("c1", "anything.at.all").await);
        assert!(backend.can_publish("c1", "*").await);
        assert_eq!(backend.name(), "allow_all");
    }

    #[tokio::test]
    async fn test_prefix_auth() {
        let backend = PrefixAuth::new(strings(&["chat", "room"]), strings(&["chat"]));

        assert!(backend.can_subscribe("c1", "chat.room1").await);
        assert!(backend.can_subscribe("c1", "room.*").await);
        assert!(!backend.can_subscribe("c1", "admin.logs").await);

        assert!(backend.can_publish("c1", "chat.room1").await);
        assert!(!backend.can_publish("c1", "room.42").await);
    }

    #[tokio::test]
    async fn test_prefix_auth_empty_set_allows_all() {
        let backend = PrefixAuth::new(Vec::new(), strings(&["chat"]));

        assert!(backend.can_subscribe("c1", "admin.logs").await);
        assert!(!backend.can_publish("c1", "admin.logs").await);
    }

    #[test]
    fn test_from_config() {
        let mut config = AuthConfig::default();
        assert_eq!(from_config(&config).unwrap().name(), "allow_all");

        config.backend = "prefix".to_string();
        assert_eq!(from_config(&config).unwrap().name(), "prefix");

        config.backend = "ldap".to_string();
        assert!(matches!(
            from_config(&config),
            Err(ConfigError::UnknownAuthBackend(name)) if name == "ldap"
        ));
    }
}
