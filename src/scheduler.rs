//! Single actor that owns the [`Engine`].
//!
//! Probes and timers run in spawned tasks and only post [`Event`]s back to
//! the actor, which applies them strictly in arrival order. Nothing else
//! touches `MonitorState`, so no locking is involved.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::engine::{Deferred, DelayedAction, Engine};
use crate::error::{MonitorError, Result};
use crate::models::{ProbeOutcome, StatusSnapshot};
use crate::operator::OperatorCommand;
use crate::prober::Prober;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeOrigin {
    Periodic,
    MaintenanceRecheck,
}

#[derive(Debug)]
enum Event {
    ProbeCompleted { outcome: ProbeOutcome, origin: ProbeOrigin },
    Command(OperatorCommand),
    TimerFired(DelayedAction),
    Snapshot(oneshot::Sender<StatusSnapshot>),
}

#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::UnboundedSender<Event>,
}

impl SchedulerHandle {
    pub fn command(&self, command: OperatorCommand) -> Result<()> {
        self.tx
            .send(Event::Command(command))
            .map_err(|_| MonitorError::SchedulerClosed)
    }

    pub async fn snapshot(&self) -> Result<StatusSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Event::Snapshot(reply))
            .map_err(|_| MonitorError::SchedulerClosed)?;
        rx.await.map_err(|_| MonitorError::SchedulerClosed)
    }
}

pub struct Scheduler {
    engine: Engine,
    prober: Arc<dyn Prober>,
    interval: Duration,
    app_url: String,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    /// Periodic probe; a tick is skipped while it is unfinished.
    probe_task: Option<JoinHandle<()>>,
    pending: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(
        engine: Engine,
        prober: Arc<dyn Prober>,
        interval: Duration,
        app_url: impl Into<String>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            engine,
            prober,
            interval,
            app_url: app_url.into(),
            tx,
            rx,
            probe_task: None,
            pending: Vec::new(),
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle { tx: self.tx.clone() }
    }

    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            "Monitoring {} every {}s",
            self.app_url,
            self.interval.as_secs()
        );
        self.engine.announce_startup().await;

        // First tick completes immediately.
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.on_tick(),
                Some(event) = self.rx.recv() => self.handle_event(event).await,
            }
        }

        if let Some(task) = self.probe_task.take() {
            task.abort();
        }
        for task in self.pending.drain(..) {
            task.abort();
        }
        info!("Scheduler stopped");
    }

    fn on_tick(&mut self) {
        if self.probe_task.as_ref().is_some_and(|task| !task.is_finished()) {
            debug!("Previous probe still in flight, skipping tick");
            return;
        }
        self.probe_task = Some(self.spawn_probe(ProbeOrigin::Periodic));
    }

    fn spawn_probe(&self, origin: ProbeOrigin) -> JoinHandle<()> {
        let prober = Arc::clone(&self.prober);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = prober.probe().await;
            let _ = tx.send(Event::ProbeCompleted { outcome, origin });
        })
    }

    fn arm(&mut self, deferred: Deferred) {
        self.pending.retain(|task| !task.is_finished());

        let tx = self.tx.clone();
        debug!(
            action = ?deferred.action,
            after_secs = deferred.after.as_secs(),
            "arming timer"
        );
        self.pending.push(tokio::spawn(async move {
            tokio::time::sleep(deferred.after).await;
            let _ = tx.send(Event::TimerFired(deferred.action));
        }));
    }

    async fn handle_event(&mut self, event: Event) {
        match event {
            Event::ProbeCompleted { outcome, origin: ProbeOrigin::Periodic } => {
                self.engine.on_probe_result(outcome, Utc::now()).await;
            }
            Event::ProbeCompleted { outcome, origin: ProbeOrigin::MaintenanceRecheck } => {
                self.engine.complete_maintenance_recheck(outcome, Utc::now()).await;
            }
            Event::Command(OperatorCommand::EnterMaintenance) => {
                if let Some(deferred) = self.engine.on_enter_maintenance().await {
                    self.arm(deferred);
                }
            }
            Event::Command(OperatorCommand::ExitMaintenance) => {
                if let Some(deferred) = self.engine.on_exit_maintenance() {
                    self.arm(deferred);
                }
            }
            Event::TimerFired(DelayedAction::MaintenanceRecheck) => {
                self.pending.retain(|task| !task.is_finished());
                let task = self.spawn_probe(ProbeOrigin::MaintenanceRecheck);
                self.pending.push(task);
            }
            Event::TimerFired(DelayedAction::MaintenanceExit) => {
                self.engine.complete_maintenance_exit(Utc::now()).await;
            }
            Event::Snapshot(reply) => {
                let snapshot =
                    StatusSnapshot::from_state(&self.app_url, self.engine.state(), Utc::now());
                let _ = reply.send(snapshot);
            }
        }
    }
}
