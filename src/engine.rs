use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Timing;
use crate::lifecycle::Lifecycle;
use crate::models::{MonitorState, ProbeOutcome};
use crate::notifier::Notifier;

pub mod messages {
    use crate::models::{Notification, GREEN, RED};

    pub const STATUS_TITLE: &str = "App Status";

    pub fn started() -> Notification {
        Notification::new("Status app is up", "The status monitor is up and running")
    }

    pub fn recovered(app: &str) -> Notification {
        Notification::new(STATUS_TITLE, format!("{} is up and running again", app))
            .with_color(GREEN)
    }

    pub fn heartbeat(app: &str) -> Notification {
        Notification::new(STATUS_TITLE, format!("{} is up and running", app)).with_color(GREEN)
    }

    pub fn down(app: &str) -> Notification {
        Notification::new(STATUS_TITLE, format!("{} is down", app)).with_color(RED)
    }

    pub fn maintenance_started(app: &str) -> Notification {
        Notification::new(
            "Backend under maintenance",
            format!("Scheduled maintenance is taking place, {} is temporarily unavailable", app),
        )
    }

    pub fn maintenance_ended(app: &str) -> Notification {
        Notification::new(
            "Maintenance Ended",
            format!("The maintenance has been completed, and {} is up and running", app),
        )
    }

    pub fn up(app: &str) -> Notification {
        Notification::new(STATUS_TITLE, format!("{} is up", app))
    }
}

/// One-shot follow-up the scheduler must arm on the engine's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayedAction {
    /// Re-probe after maintenance started, then force a down announcement.
    MaintenanceRecheck,
    /// Leave maintenance and restart the application.
    MaintenanceExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    pub action: DelayedAction,
    pub after: Duration,
}

/// `true` when the category was never sent or its window has strictly elapsed.
fn cooldown_elapsed(last: Option<DateTime<Utc>>, window: Duration, now: DateTime<Utc>) -> bool {
    match last {
        None => true,
        Some(at) => (now - at)
            .to_std()
            .map(|elapsed| elapsed > window)
            .unwrap_or(false),
    }
}

/// Notification state machine for one monitored application.
pub struct Engine {
    state: MonitorState,
    notifier: Arc<dyn Notifier>,
    lifecycle: Arc<dyn Lifecycle>,
    timing: Timing,
    app_name: String,
}

impl Engine {
    pub fn new(
        app_name: impl Into<String>,
        timing: Timing,
        notifier: Arc<dyn Notifier>,
        lifecycle: Arc<dyn Lifecycle>,
    ) -> Self {
        Self {
            state: MonitorState::default(),
            notifier,
            lifecycle,
            timing,
            app_name: app_name.into(),
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub async fn announce_startup(&self) {
        self.notifier.notify(messages::started()).await;
    }

    pub async fn on_probe_result(&mut self, outcome: ProbeOutcome, now: DateTime<Utc>) {
        if outcome.is_healthy() {
            self.on_healthy(now).await;
        } else {
            self.on_failure(outcome, now).await;
        }
    }

    async fn on_healthy(&mut self, now: DateTime<Utc>) {
        if self.state.app_down {
            warn!("[CHANGE] {} is back up", self.app_name);
            self.state.app_down = false;

            if !self.state.maintenance_active {
                let window = self.timing.up_cooldown();
                if cooldown_elapsed(self.state.last_up_notified_at, window, now) {
                    self.notifier.notify(messages::recovered(&self.app_name)).await;
                    self.state.last_up_notified_at = Some(now);
                }
                self.state.last_healthy_heartbeat_at = Some(now);
            }
            return;
        }

        info!("{} is alive", self.app_name);
        if cooldown_elapsed(
            self.state.last_healthy_heartbeat_at,
            self.timing.heartbeat_cooldown(),
            now,
        ) {
            self.notifier.notify(messages::heartbeat(&self.app_name)).await;
            self.state.last_healthy_heartbeat_at = Some(now);
        }
    }

    async fn on_failure(&mut self, outcome: ProbeOutcome, now: DateTime<Utc>) {
        if self.state.app_down {
            debug!(?outcome, "{} still down", self.app_name);
            return;
        }

        match outcome {
            ProbeOutcome::Unreachable => error!("[CHANGE] {} is down (unreachable)", self.app_name),
            _ => error!("[CHANGE] {} is down (error response)", self.app_name),
        }
        self.state.app_down = true;

        if !self.state.maintenance_active {
            let window = self.timing.down_cooldown();
            if cooldown_elapsed(self.state.last_down_notified_at, window, now) {
                self.notifier.notify(messages::down(&self.app_name)).await;
                self.state.last_down_notified_at = Some(now);
            }
            self.state.last_healthy_heartbeat_at = None;
        }
    }

    /// Returns the re-probe to arm when the application was stopped.
    pub async fn on_enter_maintenance(&mut self) -> Option<Deferred> {
        if self.state.maintenance_active {
            info!("Maintenance mode is already enabled");
            return None;
        }

        self.state.maintenance_active = true;
        warn!("[CHANGE] Maintenance mode enabled");

        if !self.state.server_running {
            info!("{} is already stopped, skipping maintenance request", self.app_name);
            return None;
        }

        if !self.lifecycle.enter_maintenance().await {
            warn!("{} may still be serving during maintenance", self.app_name);
            return None;
        }

        self.state.server_running = false;
        self.notifier.notify(messages::maintenance_started(&self.app_name)).await;

        Some(Deferred {
            action: DelayedAction::MaintenanceRecheck,
            after: self.timing.maintenance_recheck_delay(),
        })
    }

    /// Re-runs the probe path, then announces the outage regardless of cooldown.
    pub async fn complete_maintenance_recheck(
        &mut self,
        outcome: ProbeOutcome,
        now: DateTime<Utc>,
    ) {
        info!("Performing health check after maintenance start");
        self.on_probe_result(outcome, now).await;
        self.notifier.notify(messages::down(&self.app_name)).await;
    }

    /// Returns the deferred exit to arm; a second request while one is
    /// pending is refused.
    pub fn on_exit_maintenance(&mut self) -> Option<Deferred> {
        if !self.state.maintenance_active {
            info!("Maintenance mode is not enabled");
            return None;
        }
        if self.state.maintenance_exit_pending {
            info!("Maintenance exit is already scheduled");
            return None;
        }

        self.state.maintenance_exit_pending = true;
        let after = self.timing.maintenance_exit_wait();
        info!("Maintenance ends in {}s", after.as_secs());

        Some(Deferred {
            action: DelayedAction::MaintenanceExit,
            after,
        })
    }

    pub async fn complete_maintenance_exit(&mut self, now: DateTime<Utc>) {
        self.state.maintenance_exit_pending = false;
        self.state.maintenance_active = false;
        warn!("[CHANGE] Maintenance mode has ended");

        if self.state.app_down {
            warn!("{} is still down, not restarting", self.app_name);
            return;
        }

        if self.lifecycle.start().await {
            self.state.server_running = true;
        }

        self.notifier.notify(messages::maintenance_ended(&self.app_name)).await;
        self.notifier.notify(messages::up(&self.app_name)).await;

        // Second announcement kept on purpose, gated by the heartbeat window.
        if cooldown_elapsed(
            self.state.last_healthy_heartbeat_at,
            self.timing.heartbeat_cooldown(),
            now,
        ) {
            self.notifier.notify(messages::up(&self.app_name)).await;
            self.state.last_healthy_heartbeat_at = Some(now);
        }
    }
}
