//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub hub: HubSettings,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Websocket server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8765
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Connection hub limits
#[derive(Debug, Clone, Deserialize)]
pub struct HubSettings {
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_max_connections() -> usize {
    1000
}

fn default_event_capacity() -> usize {
    1024
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            event_capacity: default_event_capacity(),
        }
    }
}

/// Authorization backend selection
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_backend")]
    pub backend: String,

    /// First path segments allowed for subscribe (`prefix` backend)
    #[serde(default)]
    pub subscribe_prefixes: Vec<String>,

    /// First path segments allowed for publish (`prefix` backend)
    #[serde(default)]
    pub publish_prefixes: Vec<String>,
}

fn default_auth_backend() -> String {
    "allow_all".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            backend: default_auth_backend(),
            subscribe_prefixes: Vec::new(),
            publish_prefixes: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("socker").join("config.toml")),
            Some(PathBuf::from("/etc/socker/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("SOCKER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SOCKER_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(backend) = std::env::var("SOCKER_AUTH_BACKEND") {
            self.auth.backend = backend;
        }

        if let Ok(level) = std::env::var("SOCKER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SOCKER_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(file) = std::env::var("SOCKER_LOG_FILE") {
            self.logging.file = Some(file);
        }
    }

    /// The socket address string for the server
    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Unknown auth backend: {0}")]
    UnknownAuthBackend(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Socker Configuration
#
# Environment variables override these settings:
# - SOCKER_HOST
# - SOCKER_PORT
# - SOCKER_AUTH_BACKEND
# - SOCKER_LOG_LEVEL
# - SOCKER_LOG_FORMAT
# - SOCKER_LOG_FILE

[server]
# Listening interface
host = "localhost"

# Listening port
port = 8765

[hub]
# Maximum number of concurrent websocket connections
max_connections = 1000

# Buffered publish events for bridge listeners
event_capacity = 1024

[auth]
# Auth backend: allow_all or prefix
backend = "allow_all"

# First topic segments allowed per action (prefix backend only, empty = all)
subscribe_prefixes = []
publish_prefixes = []

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/socker/socker.log"
"#
    .to_string()
}
