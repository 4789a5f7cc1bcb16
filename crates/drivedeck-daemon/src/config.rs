//! Configuration loading and validation

use anyhow::Result;
use drivedeck_client::ReconnectPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub vendor_rules: VendorRulesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Inventory source (static device listing)
    #[serde(default = "default_inventory_url")]
    pub inventory_url: String,
    /// Health source (SMART telemetry)
    #[serde(default = "default_health_url")]
    pub health_url: String,
    /// Push channel for live updates
    #[serde(default = "default_live_url")]
    pub live_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            inventory_url: default_inventory_url(),
            health_url: default_health_url(),
            live_url: default_live_url(),
        }
    }
}

fn default_inventory_url() -> String {
    "http://127.0.0.1:8000/drives".to_string()
}

fn default_health_url() -> String {
    "http://127.0.0.1:8001/detailed-health".to_string()
}

fn default_live_url() -> String {
    "ws://127.0.0.1:9002/ws".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between poll cycles
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_poll_timeout")]
    pub timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
            timeout_secs: default_poll_timeout(),
        }
    }
}

fn default_poll_interval() -> u64 {
    30
}

fn default_poll_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Backoff ceiling in seconds
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    /// Multiplier applied per consecutive failure
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Maximum retry attempts (absent = retry forever)
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
            backoff_multiplier: default_backoff_multiplier(),
            max_attempts: None,
        }
    }
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_secs() -> u64 {
    60
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorRulesConfig {
    /// Path to a vendor rules file; built-in rules apply when missing
    #[serde(default = "default_vendor_rules_path")]
    pub path: String,
}

impl Default for VendorRulesConfig {
    fn default() -> Self {
        Self {
            path: default_vendor_rules_path(),
        }
    }
}

fn default_vendor_rules_path() -> String {
    "./vendor_rules.toml".to_string()
}

impl ReconnectConfig {
    /// Convert to the client crate's ReconnectPolicy
    pub fn to_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_secs(self.max_delay_secs),
            backoff_multiplier: self.backoff_multiplier,
            max_attempts: self.max_attempts,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}
