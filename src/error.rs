use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Request timed out after {timeout_secs}s: {url}")]
    ProbeTimeout { url: String, timeout_secs: u64 },

    #[error("Probe transport error for {url}: {message}")]
    ProbeTransport { url: String, message: String },

    #[error("Probe returned HTTP {status} for {url}")]
    ProbeHttp { url: String, status: u16 },

    #[error("Webhook delivery failed: {0}")]
    NotifyTransport(String),

    #[error("Lifecycle request {action} failed: {message}")]
    LifecycleRequest { action: &'static str, message: String },

    #[error("Invalid input {0:?}. Type \"maintenance\" or \"maintenance done\"")]
    InvalidOperatorCommand(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scheduler is no longer running")]
    SchedulerClosed,
}

impl MonitorError {
    pub fn lifecycle<S: Into<String>>(action: &'static str, message: S) -> Self {
        Self::LifecycleRequest {
            action,
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
