use crate::adb::protocol::SYNC_MAX_PAYLOAD;
use crate::error::{AdbError, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = ".adbwire.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5037,
            connect_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Outgoing DATA chunk size in bytes
    pub chunk_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            chunk_size: SYNC_MAX_PAYLOAD,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sync: SyncConfig,
}

impl Config {
    /// Load `~/.adbwire.toml`, falling back to defaults if it is missing or broken.
    pub fn load() -> Self {
        let Some(config_path) = Config::config_path() else {
            debug!("No home directory; using default config");
            return Config::default();
        };

        if !config_path.exists() {
            debug!("No config file at {:?}", config_path);
            return Config::default();
        }

        match Config::load_from_path(&config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}", e);
                Config::default()
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);
        let content = fs::read_to_string(path)
            .map_err(|e| AdbError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| AdbError::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        config.validate()?;
        debug!("Parsed config: {:?}", config);
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync.chunk_size == 0 || self.sync.chunk_size > SYNC_MAX_PAYLOAD {
            return Err(AdbError::Config(format!(
                "sync.chunk_size must be between 1 and {}, got {}",
                SYNC_MAX_PAYLOAD, self.sync.chunk_size
            )));
        }
        if self.server.host.trim().is_empty() {
            return Err(AdbError::Config("server.host must not be empty".to_string()));
        }
        Ok(())
    }

    /// `host:port` of the ADB server
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.server.connect_timeout_secs)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, host: Option<&str>, port: Option<u16>, timeout: Option<u64>) -> Self {
        if let Some(host) = host {
            self.server.host = host.to_string();
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(timeout) = timeout {
            self.server.connect_timeout_secs = timeout;
        }
        self
    }
}
