use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {endpoint}")]
    Http { endpoint: String, status: u16 },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout error: request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DashError {
    /// Every variant a fetch can produce is retried on the next tick.
    pub fn is_transient(&self) -> bool {
        !matches!(self, DashError::Config(_))
    }
}

impl From<reqwest::Error> for DashError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DashError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            DashError::Http {
                endpoint: err.url().map(|u| u.path().to_string()).unwrap_or_default(),
                status: status.as_u16(),
            }
        } else {
            DashError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        DashError::Decode(err.to_string())
    }
}

impl From<anyhow::Error> for DashError {
    fn from(err: anyhow::Error) -> Self {
        DashError::Unknown(err.to_string())
    }
}
