//! Service configuration
//!
//! Loaded from an optional YAML file; every section and field has a
//! default, so an empty or missing file yields a working configuration.
//!
//! ```yaml
//! server:
//!   address: 0.0.0.0
//!   port: 8080
//! locales:
//!   supported: [de, en]
//!   defaults: [de, en]
//! matrix:
//!   default_cell_limit: 12
//!   max_cell_limit: 50
//! index:
//!   default_limit: 100
//!   max_limit: 1000
//! data_path: data/seed.yaml
//! ```

use crate::locale::LocaleSettings;
use crate::views::{IndexSettings, MatrixSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable naming the YAML config file
pub const CONFIG_ENV: &str = "KNOWGRAPH_CONFIG";
/// Environment variable overriding `server.port`
pub const PORT_ENV: &str = "KNOWGRAPH_PORT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid port '{0}'")]
    InvalidPort(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub locales: LocaleSettings,
    pub matrix: MatrixSettings,
    pub index: IndexSettings,
    /// Graph fixture loaded at startup; the graph starts empty without one
    pub data_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&text)?;
        if let (Some(data), Some(dir)) = (&config.data_path, path.parent()) {
            if data.is_relative() && !data.exists() {
                config.data_path = Some(dir.join(data));
            }
        }
        Ok(config)
    }

    /// Resolve the configuration for the server binary. An explicit path
    /// argument wins over `KNOWGRAPH_CONFIG`; `KNOWGRAPH_PORT` is applied last.
    pub fn from_env(arg: Option<String>) -> ConfigResult<Self> {
        let path = arg.or_else(|| std::env::var(CONFIG_ENV).ok());
        let mut config = match path {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_port_override(std::env::var(PORT_ENV).ok().as_deref())?;
        Ok(config)
    }

    pub fn apply_port_override(&mut self, raw: Option<&str>) -> ConfigResult<()> {
        if let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) {
            self.server.port = raw
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.address, self.server.port)
    }
}
