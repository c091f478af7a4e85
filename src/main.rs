use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod api;
mod config;
mod engine;
mod error;
mod lifecycle;
mod models;
mod notifier;
mod operator;
mod prober;
mod scheduler;
#[cfg(test)]
mod testing;

use crate::config::MonitorConfig;
use crate::engine::Engine;
use crate::lifecycle::HttpLifecycle;
use crate::notifier::WebhookNotifier;
use crate::prober::HttpProber;
use crate::scheduler::Scheduler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::INFO.into()))
        .with_ansi(true)
        .init();

    let config_path = std::env::var("SENTINEL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = MonitorConfig::load(&config_path)
        .with_context(|| format!("Failed to load configuration ({})", config_path.display()))?;

    if config.webhook_url.is_none() {
        info!("No webhook configured, notifications will only be logged");
    }

    let notifier = Arc::new(WebhookNotifier::new(
        config.webhook_url.clone(),
        config.webhook_username.clone(),
    ));
    let lifecycle = Arc::new(HttpLifecycle::new(&config.app_url));
    let prober = Arc::new(HttpProber::new(config.app_url.clone(), config.timing.probe_timeout()));

    let engine = Engine::new(config.app_name.clone(), config.timing.clone(), notifier, lifecycle);
    let interval = config.timing.probe_interval();
    let scheduler = Scheduler::new(engine, prober, interval, config.app_url.clone());
    let handle = scheduler.handle();
    let shutdown = CancellationToken::new();

    if let Some(port) = config.api_port {
        let api_handle = handle.clone();
        let api_shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = api::start_server(port, api_handle, api_shutdown).await {
                error!("Status API failed: {}", e);
            }
        });
    }

    let reader_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        operator::run_command_reader(stdin, handle, reader_shutdown).await;
    });

    let monitor = tokio::spawn(scheduler.run(shutdown.clone()));

    signal::ctrl_c().await?;
    info!("Shutdown signal received. Stopping monitor...");
    shutdown.cancel();
    monitor.await.context("Monitor task panicked")?;

    Ok(())
}
