//! Server configuration.
//!
//! Loads from a TOML file when one exists, falls back to defaults
//! otherwise, with environment variable overrides on top.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub mqtt: MqttConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub broker_url: String,
    pub client_id: String,
    pub topic_prefix: String,
    pub qos: u8,
    /// Seconds without a message before the feed stops reporting itself live.
    pub stale_after_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_url: "mqtt://localhost:1883".to_string(),
            client_id: "onefarmer-server".to_string(),
            topic_prefix: "onefarmer/sensors".to_string(),
            qos: 0,
            stale_after_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory; `None` means `~/.onefarmer`.
    pub data_dir: Option<PathBuf>,
    pub max_dose_entries: usize,
    pub feed_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            max_dose_entries: onefarmer_core::repository::file::DEFAULT_MAX_ENTRIES,
            feed_capacity: onefarmer_core::feed::DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration. A missing file is the first-run case and
    /// yields the defaults; a present but malformed file is an error.
    ///
    /// Environment overrides:
    /// - ONEFARMER_BROKER_URL: MQTT broker URL
    /// - ONEFARMER_BIND_ADDR: HTTP bind address
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let config_str = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&config_str)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            Config::default()
        };

        if let Ok(url) = std::env::var("ONEFARMER_BROKER_URL") {
            tracing::info!("Using ONEFARMER_BROKER_URL from environment");
            config.mqtt.broker_url = url;
        }
        if let Ok(addr) = std::env::var("ONEFARMER_BIND_ADDR") {
            tracing::info!("Using ONEFARMER_BIND_ADDR from environment");
            config.server.bind_addr = addr;
        }

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.mqtt.qos > 2 {
            anyhow::bail!(
                "Invalid MQTT QoS level: {} (must be 0, 1, or 2)",
                self.mqtt.qos
            );
        }

        if !self.mqtt.broker_url.starts_with("mqtt://")
            && !self.mqtt.broker_url.starts_with("mqtts://")
        {
            anyhow::bail!(
                "Invalid MQTT broker URL: {} (must start with mqtt:// or mqtts://)",
                self.mqtt.broker_url
            );
        }

        if self.mqtt.stale_after_secs == 0 {
            anyhow::bail!("mqtt.stale_after_secs must be greater than 0");
        }

        if self.storage.max_dose_entries == 0 {
            anyhow::bail!("storage.max_dose_entries must be greater than 0");
        }

        if self.storage.feed_capacity == 0 {
            anyhow::bail!("storage.feed_capacity must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.mqtt.qos = 3;
        assert!(config.validate().is_err());
        config.mqtt.qos = 1;
        assert!(config.validate().is_ok());

        config.mqtt.broker_url = "http://localhost:1883".to_string();
        assert!(config.validate().is_err());
        config.mqtt.broker_url = "mqtts://broker.local:8883".to_string();
        assert!(config.validate().is_ok());

        config.storage.max_dose_entries = 0;
        assert!(config.validate().is_err());
        config.storage.max_dose_entries = 100;

        config.storage.feed_capacity = 0;
        assert!(config.validate().is_err());
        config.storage.feed_capacity = 100;

        config.mqtt.stale_after_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [mqtt]
            broker_url = "mqtt://10.0.0.5:1883"
            "#,
        )
        .unwrap();
        assert_eq!(config.mqtt.broker_url, "mqtt://10.0.0.5:1883");
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.mqtt.qos, 0);
    }
}
