use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{MonitorError, Result};

const APP_URL_VARS: &[&str] = &["mainAppUrl", "MAIN_APP_URL"];
const WEBHOOK_VARS: &[&str] = &["discordWebhook", "DISCORD_WEBHOOK"];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default)]
    pub app_url: String,
    pub webhook_url: Option<String>,
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_webhook_username")]
    pub webhook_username: String,
    /// Status API port; the API is disabled when unset.
    pub api_port: Option<u16>,
    #[serde(default)]
    pub timing: Timing,
}

fn default_app_name() -> String { "Main app".into() }
fn default_webhook_username() -> String { "App Sentinel".into() }

/// Cadence and cooldown policy, all in seconds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Timing {
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_maintenance_exit_wait")]
    pub maintenance_exit_wait_secs: u64,
    #[serde(default = "default_maintenance_recheck_delay")]
    pub maintenance_recheck_delay_secs: u64,
    #[serde(default = "default_up_cooldown")]
    pub up_cooldown_secs: u64,
    #[serde(default = "default_heartbeat_cooldown")]
    pub heartbeat_cooldown_secs: u64,
    #[serde(default = "default_down_cooldown")]
    pub down_cooldown_secs: u64,
}

fn default_probe_interval() -> u64 { 45 }
fn default_probe_timeout() -> u64 { 15 }
fn default_maintenance_exit_wait() -> u64 { 30 }
fn default_maintenance_recheck_delay() -> u64 { 5 }
fn default_up_cooldown() -> u64 { 24 * 60 * 60 }
fn default_heartbeat_cooldown() -> u64 { 24 * 60 * 60 }
fn default_down_cooldown() -> u64 { 12 * 60 * 60 }

impl Default for Timing {
    fn default() -> Self {
        Self {
            probe_interval_secs: default_probe_interval(),
            probe_timeout_secs: default_probe_timeout(),
            maintenance_exit_wait_secs: default_maintenance_exit_wait(),
            maintenance_recheck_delay_secs: default_maintenance_recheck_delay(),
            up_cooldown_secs: default_up_cooldown(),
            heartbeat_cooldown_secs: default_heartbeat_cooldown(),
            down_cooldown_secs: default_down_cooldown(),
        }
    }
}

impl Timing {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn maintenance_exit_wait(&self) -> Duration {
        Duration::from_secs(self.maintenance_exit_wait_secs)
    }

    pub fn maintenance_recheck_delay(&self) -> Duration {
        Duration::from_secs(self.maintenance_recheck_delay_secs)
    }

    pub fn up_cooldown(&self) -> Duration {
        Duration::from_secs(self.up_cooldown_secs)
    }

    pub fn heartbeat_cooldown(&self) -> Duration {
        Duration::from_secs(self.heartbeat_cooldown_secs)
    }

    pub fn down_cooldown(&self) -> Duration {
        Duration::from_secs(self.down_cooldown_secs)
    }
}

impl MonitorConfig {
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into(),
            webhook_url: None,
            app_name: default_app_name(),
            webhook_username: default_webhook_username(),
            api_port: None,
            timing: Timing::default(),
        }
    }

    /// Read the optional JSON file, then overlay the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                MonitorError::config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let parsed: MonitorConfig = serde_json::from_str(&content).map_err(|e| {
                MonitorError::config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            info!("Loaded configuration from {}", path.display());
            parsed
        } else {
            debug!("{} not found, using defaults and environment", path.display());
            MonitorConfig::new("")
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| lookup(*k))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        if let Some(url) = first(APP_URL_VARS) {
            self.app_url = url;
        }
        if let Some(webhook) = first(WEBHOOK_VARS) {
            self.webhook_url = Some(webhook);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.app_url.trim().is_empty() {
            return Err(MonitorError::config(
                "monitored application URL is not set (app_url or mainAppUrl)",
            ));
        }
        if !(self.app_url.starts_with("http://") || self.app_url.starts_with("https://")) {
            return Err(MonitorError::config(format!(
                "app_url must be an http(s) URL, got {}",
                self.app_url
            )));
        }
        if self.timing.probe_interval_secs == 0 {
            return Err(MonitorError::config("probe_interval_secs must be positive"));
        }
        Ok(())
    }
}
