// services/depot-dash/src/api.rs
//
// Remote depot API: the fetch capability the dashboard depends on, and the
// HTTP implementation of it.
//

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use svckit::config::ApiConfig;
use svckit::errors::DashError;
use svckit::metrics;
use svckit::types::{AnalyticsSnapshot, Branch, Client, Truck};
use tracing::debug;

/// Read-only access to the collections the dashboard shows.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn fetch_branches(&self) -> Result<Vec<Branch>, DashError>;

    async fn fetch_branch_clients(&self) -> Result<Vec<Client>, DashError>;

    async fn fetch_trucks(&self) -> Result<Vec<Truck>, DashError>;

    async fn fetch_analytics(&self) -> Result<AnalyticsSnapshot, DashError>;

    /// Shown in the header and the activity log.
    fn describe(&self) -> String;
}

pub struct ApiClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, DashError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(DashError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DashError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashError> {
        let url = self.config.url(path);
        let start = Instant::now();

        let result = async {
            let response = self.client.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(DashError::Http {
                    endpoint: path.to_string(),
                    status: status.as_u16(),
                });
            }
            let body = response.bytes().await?;
            Ok(serde_json::from_slice::<T>(&body)?)
        }
        .await;

        let elapsed = start.elapsed();
        metrics::record_fetch(path, result.is_ok(), elapsed.as_secs_f64());
        debug!("GET {} -> {} in {:?}", url, if result.is_ok() { "ok" } else { "error" }, elapsed);

        result
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn fetch_branches(&self) -> Result<Vec<Branch>, DashError> {
        self.get_json(&self.config.branches_path).await
    }

    async fn fetch_branch_clients(&self) -> Result<Vec<Client>, DashError> {
        self.get_json(&self.config.branch_clients_path).await
    }

    async fn fetch_trucks(&self) -> Result<Vec<Truck>, DashError> {
        self.get_json(&self.config.trucks_path).await
    }

    async fn fetch_analytics(&self) -> Result<AnalyticsSnapshot, DashError> {
        self.get_json(&self.config.analytics_path).await
    }

    fn describe(&self) -> String {
        self.config.base_url.clone()
    }
}

/// Runs `fetch` with an upper bound; running out of time is a `Timeout` error.
pub async fn with_timeout<T, F>(limit: Duration, fetch: F) -> Result<T, DashError>
where
    F: Future<Output = Result<T, DashError>>,
{
    tokio::time::timeout(limit, fetch)
        .await
        .unwrap_or_else(|_| Err(DashError::Timeout(limit)))
}
