// services/depot-dash/src/state.rs
//
// Dashboard state: the raw collections, the operator's selection, the
// current chart dataset and the drill-down controller, owned by one thread.
//

use chrono::{DateTime, Local};
use svckit::types::{AnalyticsSnapshot, Branch, Client, PendingRequest, RequestKind, Truck};
use tracing::{info, warn};

use crate::aggregator::{compute_dataset, ChartDataset, PendingStats};
use crate::chart::{choose_style, ChartRenderer, ChartStyle, DisplayMode};
use crate::drilldown::{DrillDownController, DrillDownPayload};
use crate::poller::DirectoryUpdate;
use crate::selection::{filter_requests, BranchFilter, RequestKey, SelectionState};

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug)]
pub struct DashboardModel {
    // Raw collections, each replaced whole
    branches: Vec<Branch>,
    clients: Vec<Client>,
    trucks: Vec<Truck>,
    analytics: Option<AnalyticsSnapshot>,

    selection: SelectionState,
    drilldown: DrillDownController,
    mode: DisplayMode,

    // Derived from the above, rebuilt by refresh()
    dataset: ChartDataset,

    pub activity_log: Vec<LogEntry>,
}

impl DashboardModel {
    pub fn new(mode: DisplayMode) -> Self {
        let selection = SelectionState::new();
        Self {
            branches: Vec::new(),
            clients: Vec::new(),
            trucks: Vec::new(),
            analytics: None,
            dataset: compute_dataset(&[], &[], selection.active_branch(), mode),
            selection,
            drilldown: DrillDownController::new(),
            mode,
            activity_log: Vec::new(),
        }
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn trucks(&self) -> &[Truck] {
        &self.trucks
    }

    pub fn analytics(&self) -> Option<&AnalyticsSnapshot> {
        self.analytics.as_ref()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn dataset(&self) -> &ChartDataset {
        &self.dataset
    }

    pub fn style(&self) -> ChartStyle {
        choose_style(self.selection.active_branch(), self.branches.len())
    }

    pub fn detail(&self) -> Option<&DrillDownPayload> {
        self.drilldown.payload()
    }

    pub fn pending_stats(&self) -> PendingStats {
        self.analytics
            .as_ref()
            .map(PendingStats::from_snapshot)
            .unwrap_or_default()
    }

    /// Name of the active branch, or "All branches".
    pub fn filter_label(&self) -> String {
        match self.selection.active_branch() {
            BranchFilter::All => "All branches".to_string(),
            BranchFilter::Branch(id) => self
                .branches
                .iter()
                .find(|b| b.id == id)
                .map(|b| b.name.clone())
                .unwrap_or_else(|| format!("Branch #{}", id)),
        }
    }

    pub fn render(&self, renderer: &mut dyn ChartRenderer) {
        renderer.render_chart(&self.dataset, self.style());
    }

    fn refresh(&mut self) {
        self.dataset = compute_dataset(
            &self.branches,
            &self.clients,
            self.selection.active_branch(),
            self.mode,
        );
    }

    /// Applies whichever collections loaded; failed ones keep their data.
    pub fn apply_directory(&mut self, update: DirectoryUpdate) {
        let complete = update.is_complete();
        if let Some(branches) = update.branches {
            self.branches = branches;
        }
        if let Some(clients) = update.clients {
            self.clients = clients;
        }
        if let Some(trucks) = update.trucks {
            self.trucks = trucks;
        }
        self.refresh();

        if complete {
            self.add_log(
                LogLevel::Info,
                &format!(
                    "Loaded {} branches, {} clients, {} trucks",
                    self.branches.len(),
                    self.clients.len(),
                    self.trucks.len()
                ),
            );
        } else {
            self.add_log(LogLevel::Warn, "Some collections failed to load, showing partial data");
        }
    }

    /// Replaces the analytics snapshot wholesale.
    pub fn apply_analytics(&mut self, snapshot: AnalyticsSnapshot) {
        let previous_total = self.analytics.as_ref().map(|s| s.total_pending);
        let keys: Vec<RequestKey> = snapshot
            .recent
            .appointments
            .iter()
            .map(|r| (RequestKind::Appointment, r.id))
            .chain(snapshot.recent.trucks.iter().map(|r| (RequestKind::Truck, r.id)))
            .collect();

        if previous_total != Some(snapshot.total_pending) {
            self.add_log(
                LogLevel::Info,
                &format!("Pending requests: {}", snapshot.total_pending),
            );
        }
        self.analytics = Some(snapshot);

        if self.selection.sync_selectable(keys) {
            self.add_log(LogLevel::Warn, "Request list changed, bulk selection cleared");
        }
    }

    pub fn on_filter_change(&mut self, filter: BranchFilter) {
        if !self.selection.set_active_branch(filter) {
            return;
        }
        // An open detail was resolved under the old filter.
        self.drilldown.close();
        self.refresh();
        info!("Branch filter set to {}", filter);
    }

    pub fn cycle_filter(&mut self, forward: bool) {
        let next = self.selection.next_branch(&self.branches, forward);
        self.on_filter_change(next);
    }

    pub fn on_chart_click(&mut self, index: Option<usize>) -> bool {
        self.drilldown.chart_click(
            index,
            &self.dataset,
            &self.branches,
            &self.clients,
            &self.trucks,
        )
    }

    /// Rows of a recent-request list as currently shown (search applied).
    pub fn visible_requests(&self, kind: RequestKind) -> Vec<&PendingRequest> {
        match &self.analytics {
            Some(snapshot) => filter_requests(snapshot.recent.list(kind), self.selection.search()),
            None => Vec::new(),
        }
    }

    pub fn on_request_click(&mut self, kind: RequestKind, index: Option<usize>) -> bool {
        let visible: Vec<PendingRequest> = self
            .visible_requests(kind)
            .into_iter()
            .cloned()
            .collect();
        let rows: Vec<&PendingRequest> = visible.iter().collect();
        self.drilldown.request_click(kind, index, &rows)
    }

    pub fn on_detail_close(&mut self) {
        self.drilldown.close();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.refresh();
    }

    pub fn set_search(&mut self, query: &str) {
        self.selection.set_search(query);
    }

    pub fn push_search_char(&mut self, c: char) {
        self.selection.push_search_char(c);
    }

    pub fn pop_search_char(&mut self) {
        self.selection.pop_search_char();
    }

    pub fn clear_search(&mut self) {
        self.selection.clear_search();
    }

    /// Toggles bulk selection of row `index` in the visible `kind` list.
    pub fn toggle_bulk(&mut self, kind: RequestKind, index: usize) -> bool {
        let id = self.visible_requests(kind).get(index).map(|r| r.id);
        match id {
            Some(id) => self.selection.toggle_bulk((kind, id)),
            None => false,
        }
    }

    pub fn select_all_bulk(&mut self) {
        self.selection.select_all_bulk();
    }

    pub fn clear_bulk(&mut self) {
        self.selection.clear_bulk();
    }

    pub fn add_log(&mut self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => info!("{}", message),
            LogLevel::Warn | LogLevel::Error => warn!("{}", message),
        }

        self.activity_log.push(LogEntry {
            timestamp: Local::now(),
            level,
            message: message.to_string(),
        });

        if self.activity_log.len() > MAX_LOG_ENTRIES {
            self.activity_log.remove(0);
        }
    }
}

impl Default for DashboardModel {
    fn default() -> Self {
        Self::new(DisplayMode::default())
    }
}
