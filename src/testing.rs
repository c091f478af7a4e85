//! In-memory collaborators for engine and scheduler tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::lifecycle::Lifecycle;
use crate::models::{Notification, ProbeOutcome};
use crate::notifier::Notifier;
use crate::prober::Prober;

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self, notification: &Notification) -> usize {
        self.sent.lock().unwrap().iter().filter(|n| *n == notification).count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

pub struct FakeLifecycle {
    accept_maintenance: AtomicBool,
    accept_start: AtomicBool,
    maintenance_calls: AtomicUsize,
    start_calls: AtomicUsize,
}

impl FakeLifecycle {
    pub fn accepting() -> Self {
        Self {
            accept_maintenance: AtomicBool::new(true),
            accept_start: AtomicBool::new(true),
            maintenance_calls: AtomicUsize::new(0),
            start_calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        let lifecycle = Self::rejecting_start();
        lifecycle.accept_maintenance.store(false, Ordering::SeqCst);
        lifecycle
    }

    /// Accepts the maintenance flag but refuses to start the application.
    pub fn rejecting_start() -> Self {
        let lifecycle = Self::accepting();
        lifecycle.accept_start.store(false, Ordering::SeqCst);
        lifecycle
    }

    pub fn maintenance_calls(&self) -> usize {
        self.maintenance_calls.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Lifecycle for FakeLifecycle {
    async fn enter_maintenance(&self) -> bool {
        self.maintenance_calls.fetch_add(1, Ordering::SeqCst);
        self.accept_maintenance.load(Ordering::SeqCst)
    }

    async fn start(&self) -> bool {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.accept_start.load(Ordering::SeqCst)
    }
}

/// Replays scripted outcomes, then keeps answering with the fallback.
pub struct ScriptedProber {
    script: Mutex<VecDeque<ProbeOutcome>>,
    fallback: Mutex<ProbeOutcome>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProber {
    pub fn new(script: impl IntoIterator<Item = ProbeOutcome>, fallback: ProbeOutcome) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback: Mutex::new(fallback),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_fallback(&self, outcome: ProbeOutcome) {
        *self.fallback.lock().unwrap() = outcome;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| *self.fallback.lock().unwrap())
    }
}
