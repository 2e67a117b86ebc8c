use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use svckit::config::{ApiConfig, ObservabilityConfig};
use svckit::retry::RetryPolicy;

use crate::chart::DisplayMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DepotDashConfig {
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub poll_interval_ms: u64,
    pub directory_retry_attempts: u32,
    pub directory_retry_delay_ms: u64,
    pub display_mode: DisplayMode,
    /// UI redraw / input tick.
    pub refresh_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5000,
            directory_retry_attempts: 3,
            directory_retry_delay_ms: 500,
            display_mode: DisplayMode::Light,
            refresh_ms: 100,
        }
    }
}

impl DashboardConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn directory_retry(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.directory_retry_attempts,
            Duration::from_millis(self.directory_retry_delay_ms),
        )
    }
}

/// Reads `path` (optional, any format the `config` crate knows) overlaid by
/// `DEPOT_DASH__SECTION__KEY` environment variables.
pub fn load_config(path: &str) -> Result<DepotDashConfig> {
    let config = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::with_prefix("DEPOT_DASH").separator("__"))
        .build()?;

    Ok(config.try_deserialize()?)
}

pub fn config_exists(path: &str) -> bool {
    let path = Path::new(path);
    path.exists() || path.with_extension("yaml").exists() || path.with_extension("yml").exists()
}
