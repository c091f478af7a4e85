use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info};

use crate::error::MonitorError;

const CONTROL_TIMEOUT: Duration = Duration::from_secs(15);

/// Control requests against the monitored application. `true` means the
/// application acknowledged the request with a success status.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Raise the remote maintenance flag, which stops the application.
    async fn enter_maintenance(&self) -> bool;
    async fn start(&self) -> bool;
}

pub struct HttpLifecycle {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpLifecycle {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(
        &self,
        action: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<(), MonitorError> {
        let response = request
            .timeout(CONTROL_TIMEOUT)
            .send()
            .await
            .map_err(|e| MonitorError::lifecycle(action, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::lifecycle(action, format!("HTTP error! Status: {}", status)));
        }
        Ok(())
    }
}

#[async_trait]
impl Lifecycle for HttpLifecycle {
    async fn enter_maintenance(&self) -> bool {
        let request = self
            .http_client
            .put(self.endpoint("maintenance"))
            .json(&serde_json::json!({ "maintenance": true }));

        match self.send("maintenance", request).await {
            Ok(()) => {
                info!("Monitored app has been shut down for maintenance");
                true
            }
            Err(e) => {
                error!("Error stopping monitored app: {}", e);
                false
            }
        }
    }

    async fn start(&self) -> bool {
        info!("Sending request to start monitored app");
        let request = self.http_client.post(self.endpoint("start"));

        match self.send("start", request).await {
            Ok(()) => {
                info!("Monitored app has been started");
                true
            }
            Err(e) => {
                error!("Error starting monitored app: {}", e);
                false
            }
        }
    }
}
