use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Location of the remote depot API and the paths of each collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub branches_path: String,
    pub branch_clients_path: String,
    pub trucks_path: String,
    pub analytics_path: String,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            branches_path: "/branches".to_string(),
            branch_clients_path: "/branch-clients".to_string(),
            trucks_path: "/trucks".to_string(),
            analytics_path: "/requests/analytics".to_string(),
            request_timeout_ms: 3000,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Joins `base_url` and `path` with exactly one slash between them.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_file: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: "depot-dash.log".to_string(),
        }
    }
}
