use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::MonitorError;
use crate::models::Notification;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Best-effort delivery of a notification. Implementations log failures
/// instead of returning them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    username: &'a str,
    embeds: [Embed<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<u32>,
    timestamp: String,
}

pub struct WebhookNotifier {
    http_client: reqwest::Client,
    webhook_url: Option<String>,
    username: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: Option<String>, username: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            webhook_url,
            username: username.into(),
        }
    }

    async fn send_webhook(
        &self,
        url: &str,
        notification: &Notification,
    ) -> Result<(), MonitorError> {
        let payload = WebhookPayload {
            username: &self.username,
            embeds: [Embed {
                title: &notification.title,
                description: &notification.description,
                color: notification.color,
                timestamp: Utc::now().to_rfc3339(),
            }],
        };

        let response = self
            .http_client
            .post(url)
            .timeout(WEBHOOK_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MonitorError::NotifyTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::NotifyTransport(format!(
                "HTTP error! Status: {}",
                status
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: Notification) {
        let Some(url) = &self.webhook_url else {
            debug!(
                title = %notification.title,
                "No webhook configured: {}", notification.description
            );
            return;
        };

        match self.send_webhook(url, &notification).await {
            Ok(()) => info!(title = %notification.title, "Notification sent"),
            Err(e) => {
                error!(title = %notification.title, "Error sending notification: {}", e)
            }
        }
    }
}
