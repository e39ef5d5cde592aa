use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tollgate_core::{CredentialStore, TokenAuthenticator};
use tollgate_mcp::protocol::ServerInfo;
use tollgate_mcp::tools::builtin_registry;
use tollgate_mcp::{Dispatcher, McpServer};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Route the MCP endpoint is mounted on
    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity stamped on every access grant
    #[serde(default = "default_client_id")]
    pub client_id: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8086
}

fn default_path() -> String {
    "/mcp".to_string()
}

fn default_client_id() -> String {
    tollgate_core::auth::DEFAULT_CLIENT_IDENTITY.to_string()
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("AUTH_TOKEN is not set; pass --auth-token or set it in the environment")]
    MissingAuthToken,

    #[error("MY_NUMBER is not set; pass --identity or set it in the environment")]
    MissingIdentity,

    #[error("endpoint path must start with '/' and not be '/': {0}")]
    InvalidPath(String),
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        let config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")?
        } else {
            tracing::info!("Configuration file not found, using defaults");
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = &self.server.path;
        if !path.starts_with('/') || path == "/" || path == "/health" {
            return Err(ConfigError::InvalidPath(path.clone()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Secrets supplied at startup, never read from the config file
#[derive(Clone)]
pub struct Credentials {
    pub auth_token: String,
    pub identity: String,
}

impl Credentials {
    /// Both values are mandatory; blank counts as missing
    pub fn from_values(
        auth_token: Option<String>,
        identity: Option<String>,
    ) -> Result<Self, ConfigError> {
        let auth_token = auth_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingAuthToken)?;
        let identity = identity
            .filter(|i| !i.trim().is_empty())
            .ok_or(ConfigError::MissingIdentity)?;

        Ok(Self {
            auth_token,
            identity,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("auth_token", &"<redacted>")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub mcp: Arc<McpServer>,
}

impl AppState {
    pub fn new(config: &ServerConfig, credentials: Credentials) -> Result<Self> {
        let store = CredentialStore::new(credentials.auth_token, config.auth.client_id.clone())
            .context("Failed to create credential store")?;

        let registry =
            builtin_registry(credentials.identity).context("Failed to register tools")?;
        tracing::info!("Registered {} tools", registry.len());

        let dispatcher = Dispatcher::new(TokenAuthenticator::new(store), registry);
        let info = ServerInfo {
            name: "tollgate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        Ok(Self {
            mcp: Arc::new(McpServer::new(dispatcher, info)),
        })
    }
}
