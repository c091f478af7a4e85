use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const GREEN: u32 = 0x00FF00;
pub const RED: u32 = 0xFF0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Up,
    Down,
}

/// Classification of a single health check attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The endpoint answered with a success status.
    Healthy,
    /// The endpoint answered with a non-success status.
    Unhealthy,
    /// Timeout or connection failure.
    Unreachable,
}

impl ProbeOutcome {
    pub fn is_healthy(self) -> bool {
        self == ProbeOutcome::Healthy
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub color: Option<u32>,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }
}

/// Liveness and maintenance bookkeeping for the monitored application.
///
/// Owned by [`crate::engine::Engine`]; nothing else mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorState {
    pub app_down: bool,
    pub maintenance_active: bool,
    pub server_running: bool,
    pub maintenance_exit_pending: bool,
    pub last_up_notified_at: Option<DateTime<Utc>>,
    pub last_down_notified_at: Option<DateTime<Utc>>,
    pub last_healthy_heartbeat_at: Option<DateTime<Utc>>,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            app_down: false,
            maintenance_active: false,
            server_running: true,
            maintenance_exit_pending: false,
            last_up_notified_at: None,
            last_down_notified_at: None,
            last_healthy_heartbeat_at: None,
        }
    }
}

impl MonitorState {
    pub fn status(&self) -> Status {
        if self.app_down {
            Status::Down
        } else {
            Status::Up
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub app_url: String,
    pub status: Status,
    pub maintenance_active: bool,
    pub maintenance_exit_pending: bool,
    pub server_running: bool,
    pub last_up_notified_at: Option<DateTime<Utc>>,
    pub last_down_notified_at: Option<DateTime<Utc>>,
    pub last_healthy_heartbeat_at: Option<DateTime<Utc>>,
    pub taken_at: DateTime<Utc>,
}

impl StatusSnapshot {
    pub fn from_state(app_url: &str, state: &MonitorState, taken_at: DateTime<Utc>) -> Self {
        Self {
            app_url: app_url.to_string(),
            status: state.status(),
            maintenance_active: state.maintenance_active,
            maintenance_exit_pending: state.maintenance_exit_pending,
            server_running: state.server_running,
            last_up_notified_at: state.last_up_notified_at,
            last_down_notified_at: state.last_down_notified_at,
            last_healthy_heartbeat_at: state.last_healthy_heartbeat_at,
            taken_at,
        }
    }
}
