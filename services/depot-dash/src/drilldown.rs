// services/depot-dash/src/drilldown.rs
//
// Drill-down: turns a click on a chart slice or a request row into the
// records behind it, and tracks whether the detail view is open.
//

use svckit::types::{Branch, BranchId, Client, ClientId, PendingRequest, RequestId, RequestKind, Truck};
use tracing::debug;

use crate::aggregator::{clients_of, trucks_of, ChartDataset, DatasetKind};

/// What a payload was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSource {
    Branch(BranchId),
    Client(ClientId),
    Request(RequestKind, RequestId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillDownPayload {
    pub source: DetailSource,
    pub title: String,
    pub clients: Vec<Client>,
    pub trucks: Vec<Truck>,
    pub requests: Vec<PendingRequest>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrillDownState {
    #[default]
    Closed,
    Open(DrillDownPayload),
}

#[derive(Debug, Default)]
pub struct DrillDownController {
    state: DrillDownState,
}

impl DrillDownController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrillDownState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DrillDownState::Open(_))
    }

    pub fn payload(&self) -> Option<&DrillDownPayload> {
        match &self.state {
            DrillDownState::Open(payload) => Some(payload),
            DrillDownState::Closed => None,
        }
    }

    /// Opens the records behind slice `index` of `dataset`, which must be the
    /// dataset currently on screen. `None` (a click between slices) and
    /// indices that no longer resolve leave the state untouched.
    pub fn chart_click(
        &mut self,
        index: Option<usize>,
        dataset: &ChartDataset,
        branches: &[Branch],
        clients: &[Client],
        trucks: &[Truck],
    ) -> bool {
        let Some(index) = index else {
            return false;
        };
        match resolve_chart_click(index, dataset, branches, clients, trucks) {
            Some(payload) => {
                debug!("Drill-down opened: {}", payload.title);
                self.state = DrillDownState::Open(payload);
                true
            }
            None => {
                debug!("Chart click at index {} did not resolve, ignoring", index);
                false
            }
        }
    }

    /// Opens row `index` of the request list the operator is looking at.
    pub fn request_click(
        &mut self,
        kind: RequestKind,
        index: Option<usize>,
        visible: &[&PendingRequest],
    ) -> bool {
        let Some(request) = index.and_then(|i| visible.get(i)) else {
            return false;
        };
        self.state = DrillDownState::Open(DrillDownPayload {
            source: DetailSource::Request(kind, request.id),
            title: format!("{} request: {}", kind.label(), request.display_name()),
            clients: Vec::new(),
            trucks: Vec::new(),
            requests: vec![(*request).clone()],
        });
        true
    }

    /// Always ends closed, however many times it is called.
    pub fn close(&mut self) {
        self.state = DrillDownState::Closed;
    }
}

pub fn resolve_chart_click(
    index: usize,
    dataset: &ChartDataset,
    branches: &[Branch],
    clients: &[Client],
    trucks: &[Truck],
) -> Option<DrillDownPayload> {
    let id = dataset.id_at(index)?;

    match dataset.kind() {
        DatasetKind::AllBranches => {
            let branch = branches.iter().find(|b| b.id == id)?;
            Some(DrillDownPayload {
                source: DetailSource::Branch(branch.id),
                title: branch.name.clone(),
                clients: clients_of(clients, branch.id).cloned().collect(),
                trucks: trucks_of(trucks, branch.id).cloned().collect(),
                requests: Vec::new(),
            })
        }
        DatasetKind::SingleBranch(branch_id) => {
            let client = clients
                .iter()
                .find(|c| c.id == id && c.branch_id == Some(branch_id))?;
            Some(DrillDownPayload {
                source: DetailSource::Client(client.id),
                title: client.name.clone(),
                clients: vec![client.clone()],
                trucks: Vec::new(),
                requests: Vec::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::compute_dataset;
    use crate::chart::DisplayMode;
    use crate::selection::BranchFilter;

    fn branches() -> Vec<Branch> {
        vec![
            Branch { id: 1, name: "Marilao".to_string(), client_count: 5 },
            Branch { id: 2, name: "Taguig".to_string(), client_count: 2 },
            Branch { id: 3, name: "Cebu".to_string(), client_count: 0 },
        ]
    }

    fn clients() -> Vec<Client> {
        vec![
            Client { id: 10, name: "Acme Freight".to_string(), branch_id: Some(1) },
            Client { id: 11, name: "Blue Line Cargo".to_string(), branch_id: Some(2) },
            Client { id: 12, name: "Delta Haulers".to_string(), branch_id: Some(2) },
        ]
    }

    fn trucks() -> Vec<Truck> {
        vec![
            Truck { id: 100, plate_number: "NBC 1234".to_string(), branch_id: Some(2), extra: Default::default() },
            Truck { id: 101, plate_number: "ABC 5678".to_string(), branch_id: Some(1), extra: Default::default() },
            Truck { id: 102, plate_number: "TGU 0001".to_string(), branch_id: Some(2), extra: Default::default() },
        ]
    }

    fn request(id: RequestId, name: &str) -> PendingRequest {
        PendingRequest {
            id,
            name: Some(name.to_string()),
            branch_id: None,
            status: None,
            created_at: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn test_branch_click_gathers_clients_and_trucks() {
        let (branches, clients, trucks) = (branches(), clients(), trucks());
        let dataset = compute_dataset(&branches, &clients, BranchFilter::All, DisplayMode::Light);
        let mut controller = DrillDownController::new();

        assert!(controller.chart_click(Some(1), &dataset, &branches, &clients, &trucks));

        let payload = controller.payload().unwrap();
        assert_eq!(payload.title, "Taguig");
        assert_eq!(payload.source, DetailSource::Branch(2));
        assert_eq!(payload.clients.iter().map(|c| c.id).collect::<Vec<_>>(), vec![11, 12]);
        assert_eq!(payload.trucks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![100, 102]);
    }

    #[test]
    fn test_client_click_has_no_trucks() {
        let (branches, clients, trucks) = (branches(), clients(), trucks());
        let dataset = compute_dataset(&branches, &clients, BranchFilter::Branch(2), DisplayMode::Light);
        let mut controller = DrillDownController::new();

        assert!(controller.chart_click(Some(1), &dataset, &branches, &clients, &trucks));

        let payload = controller.payload().unwrap();
        assert_eq!(payload.title, "Delta Haulers");
        assert_eq!(payload.clients.len(), 1);
        assert!(payload.trucks.is_empty());
    }

    #[test]
    fn test_index_resolves_against_given_dataset() {
        let (branches, clients, trucks) = (branches(), clients(), trucks());
        let overview = compute_dataset(&branches, &clients, BranchFilter::All, DisplayMode::Light);
        let single = compute_dataset(&branches, &clients, BranchFilter::Branch(2), DisplayMode::Light);

        let a = resolve_chart_click(0, &overview, &branches, &clients, &trucks).unwrap();
        let b = resolve_chart_click(0, &single, &branches, &clients, &trucks).unwrap();
        assert_eq!(a.title, "Marilao");
        assert_eq!(b.title, "Blue Line Cargo");
    }

    #[test]
    fn test_unresolvable_clicks_are_ignored() {
        let (branches, clients, trucks) = (branches(), clients(), trucks());
        let dataset = compute_dataset(&branches, &clients, BranchFilter::All, DisplayMode::Light);
        let mut controller = DrillDownController::new();

        assert!(!controller.chart_click(None, &dataset, &branches, &clients, &trucks));
        assert!(!controller.chart_click(Some(3), &dataset, &branches, &clients, &trucks));
        // Branch list replaced after the chart was drawn.
        assert!(!controller.chart_click(Some(0), &dataset, &[], &clients, &trucks));
        assert_eq!(controller.state(), &DrillDownState::Closed);
    }

    #[test]
    fn test_empty_branch_opens_with_no_records() {
        let (branches, clients, trucks) = (branches(), clients(), trucks());
        let dataset = compute_dataset(&branches, &clients, BranchFilter::All, DisplayMode::Light);
        let mut controller = DrillDownController::new();

        assert!(controller.chart_click(Some(2), &dataset, &branches, &clients, &trucks));
        let payload = controller.payload().unwrap();
        assert_eq!(payload.title, "Cebu");
        assert!(payload.clients.is_empty() && payload.trucks.is_empty());
    }

    #[test]
    fn test_close_is_idempotent() {
        let (branches, clients, trucks) = (branches(), clients(), trucks());
        let dataset = compute_dataset(&branches, &clients, BranchFilter::All, DisplayMode::Light);
        let mut controller = DrillDownController::new();

        controller.close();
        assert!(!controller.is_open());

        controller.chart_click(Some(0), &dataset, &branches, &clients, &trucks);
        assert!(controller.is_open());
        for _ in 0..3 {
            controller.close();
            assert_eq!(controller.state(), &DrillDownState::Closed);
        }
    }

    #[test]
    fn test_request_click() {
        let requests = vec![request(7, "J. Cruz"), request(8, "M. Reyes")];
        let visible: Vec<&PendingRequest> = requests.iter().collect();
        let mut controller = DrillDownController::new();

        assert!(!controller.request_click(RequestKind::Appointment, Some(5), &visible));
        assert!(!controller.is_open());

        assert!(controller.request_click(RequestKind::Appointment, Some(1), &visible));
        let payload = controller.payload().unwrap();
        assert_eq!(payload.title, "Appointment request: M. Reyes");
        assert_eq!(payload.source, DetailSource::Request(RequestKind::Appointment, 8));
        assert_eq!(payload.requests, vec![requests[1].clone()]);
    }
}
