use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::PathBuf,
};
use url::Url;

use crate::{error::TchaikError, paths::CollectionPath};

pub const DEFAULT_SERVER: &str = "ws://localhost:8080/socket";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Client settings, read from a TOML file:
///
/// ```toml
/// server = "ws://media.local:8080/socket"
/// root = ["Root"]
/// log_filter = "tchaik_core=debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Websocket endpoint of the collection server.
    pub server: Url,
    /// Path the browser opens on.
    pub root: CollectionPath,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server: Url::parse(DEFAULT_SERVER).expect("DEFAULT_SERVER is a valid URL"),
            root: CollectionPath::root(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), TchaikError> {
        match self.server.scheme() {
            "ws" | "wss" => Ok(()),
            other => Err(TchaikError::Config(format!(
                "server must be a ws:// or wss:// URL, got '{other}://'"
            ))),
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn get_config(&self) -> Result<ClientConfig, TchaikError>;
    fn set_config(&self, config: &ClientConfig) -> Result<(), TchaikError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlConfigProvider { path }
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn get_config(&self) -> Result<ClientConfig, TchaikError> {
        tracing::debug!("Attempting to read config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(ClientConfig::default());
        }
        let content = read_to_string(&self.path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn set_config(&self, config: &ClientConfig) -> Result<(), TchaikError> {
        tracing::debug!("Attempting to write config to: {:?}", &self.path);
        config.validate()?;
        let toml_string = toml::to_string(config)?;
        write(&self.path, toml_string)?;
        Ok(())
    }
}
