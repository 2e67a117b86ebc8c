// services/depot-dash/src/lib.rs
//
// Depot Dashboard - branch/client distribution, pending request statistics
// and drill-down over a polled depot API
//

pub mod aggregator;
pub mod api;
pub mod chart;
pub mod config;
pub mod drilldown;
pub mod mock;
pub mod poller;
pub mod selection;
pub mod state;

pub use aggregator::{compute_dataset, ChartDataset, DatasetKind, PendingStats};
pub use api::{ApiClient, DashboardApi};
pub use chart::{choose_style, ChartRenderer, ChartShape, ChartStyle, DisplayMode};
pub use drilldown::{DrillDownController, DrillDownPayload, DrillDownState};
pub use poller::{load_directory, AnalyticsPoller, DirectoryUpdate, PollHandle, PollStatus};
pub use selection::{BranchFilter, SelectionState};
pub use state::DashboardModel;
