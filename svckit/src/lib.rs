pub mod config;
pub mod errors;
pub mod metrics;
pub mod retry;
pub mod types;

pub use errors::DashError;
pub use retry::RetryPolicy;
