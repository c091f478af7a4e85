use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use crate::error::MonitorError;
use crate::models::ProbeOutcome;

#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self) -> ProbeOutcome;
}

/// Issues `GET <url>` with a per-request deadline.
pub struct HttpProber {
    http_client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    async fn check(&self) -> Result<(), MonitorError> {
        let response = self
            .http_client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MonitorError::ProbeTimeout {
                        url: self.url.clone(),
                        timeout_secs: self.timeout.as_secs(),
                    }
                } else {
                    MonitorError::ProbeTransport {
                        url: self.url.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(MonitorError::ProbeHttp {
                url: self.url.clone(),
                status: status.as_u16(),
            })
        }
    }
}

pub fn classify(result: &Result<(), MonitorError>) -> ProbeOutcome {
    match result {
        Ok(()) => ProbeOutcome::Healthy,
        Err(MonitorError::ProbeHttp { .. }) => ProbeOutcome::Unhealthy,
        Err(_) => ProbeOutcome::Unreachable,
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self) -> ProbeOutcome {
        let start = Instant::now();
        let result = self.check().await;
        let outcome = classify(&result);

        match &result {
            Ok(()) => debug!(
                url = %self.url,
                latency_ms = start.elapsed().as_secs_f64() * 1000.0,
                "probe ok"
            ),
            Err(e @ MonitorError::ProbeHttp { .. }) => warn!("Health check failed: {}", e),
            Err(e) => error!("Error fetching monitored app: {}", e),
        }
        outcome
    }
}
