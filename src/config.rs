//! Monitor configuration, read once at startup from
//! `<config_dir>/ozw-monitor/monitor.toml`.
//!
//! ```toml
//! ozw_source_dir = "/home/me/open-zwave-read-only/cpp/src"
//!
//! [broker]
//! host = "localhost"
//! port = 1883
//! topic = "zwave/monitor"
//! ```
//!
//! Every key is optional. Without a file the defaults apply.

use crate::error::MonitorError;
use crate::mqtt::config::MqttConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_DIR: &str = "ozw-monitor";
const CONFIG_FILE: &str = "monitor.toml";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorConfig {
    pub broker: MqttConfig,
    /// Root of the OpenZWave C++ sources (`cpp/src`) holding the enum headers
    pub ozw_source_dir: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            broker: MqttConfig::default(),
            ozw_source_dir: default_ozw_source_dir(),
        }
    }
}

/// `../open-zwave-read-only/cpp/src`, relative to the working directory.
pub fn default_ozw_source_dir() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base = cwd.parent().map(Path::to_path_buf).unwrap_or(cwd);
    base.join("open-zwave-read-only").join("cpp").join("src")
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

impl MonitorConfig {
    /// Loads the config from the default location, falling back to defaults.
    pub async fn load() -> Result<Self, MonitorError> {
        match default_config_path() {
            Some(path) => Self::load_from(&path).await,
            None => {
                info!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self, MonitorError> {
        let exists = tokio::fs::try_exists(path).await.map_err(|e| {
            MonitorError::Configuration(format!("Failed to check {}: {}", path.display(), e))
        })?;
        if !exists {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            MonitorError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content).map_err(|e| {
            MonitorError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
