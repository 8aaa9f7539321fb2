use crate::error::{Result, ShiftboardError};
use crate::line::UpdateMode;
use crate::paths;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// MqttConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MqttConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_mqtt_host")]
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    #[serde(default = "default_mqtt_topic")]
    pub topic: String,
    #[serde(default = "default_mqtt_client_id")]
    pub client_id: String,
    /// Delay between per-line publishes so a slow display controller can
    /// keep up.
    #[serde(default = "default_publish_spacing_ms")]
    pub publish_spacing_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_mqtt_host() -> String {
    "localhost".to_string()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_mqtt_topic() -> String {
    "p10/table_data".to_string()
}

fn default_mqtt_client_id() -> String {
    "shiftboard".to_string()
}

fn default_publish_spacing_ms() -> u64 {
    100
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_mqtt_host(),
            port: default_mqtt_port(),
            topic: default_mqtt_topic(),
            client_id: default_mqtt_client_id(),
            publish_spacing_ms: default_publish_spacing_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// PenaltyConfig
// ---------------------------------------------------------------------------

/// The silence-decay mechanic is policy, not a fixed requirement: one
/// deployed revision of this system ran without it entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_penalty_interval_hours")]
    pub interval_hours: i64,
}

fn default_penalty_interval_hours() -> i64 {
    2
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_hours: default_penalty_interval_hours(),
        }
    }
}

impl PenaltyConfig {
    pub fn interval(&self) -> Duration {
        Duration::hours(self.interval_hours)
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub update_mode: UpdateMode,
    #[serde(default)]
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub penalty: PenaltyConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            update_mode: UpdateMode::default(),
            mqtt: MqttConfig::default(),
            penalty: PenaltyConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(ShiftboardError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
