// services/depot-dash/src/mock.rs
//
// Mock depot API for demo mode: a fixed directory of branches, clients and
// trucks, and an analytics feed that drifts on every poll.
//

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};
use svckit::errors::DashError;
use svckit::types::{AnalyticsSnapshot, Branch, Client, PendingRequest, RecentRequests, Truck};

use crate::api::DashboardApi;

const BRANCHES: [&str; 6] = ["Marilao", "Taguig", "Cebu", "Davao", "Iloilo", "Cagayan de Oro"];

const CLIENTS: [&str; 14] = [
    "Acme Freight",
    "Blue Line Cargo",
    "Coastal Movers",
    "Delta Haulers",
    "Eastwind Logistics",
    "Fairway Forwarding",
    "Golden Route Trading",
    "Harbor Point Supply",
    "Islandlink Express",
    "Jadestone Distribution",
    "Kalayaan Shipping",
    "Luzon Cold Chain",
    "Mindanao Agri Exports",
    "Northstar Warehousing",
];

const VISITORS: [&str; 8] = [
    "J. Cruz", "M. Reyes", "A. Lim", "R. Santos", "C. Garcia", "P. Mendoza", "L. Bautista", "E. Ramos",
];

const DRIVERS: [&str; 5] = ["D. Aquino", "F. Villanueva", "G. Torres", "H. Navarro", "K. Domingo"];

struct MockState {
    rng: StdRng,
    next_request_id: u64,
    appointments: Vec<PendingRequest>,
    trucks: Vec<PendingRequest>,
}

pub struct MockApi {
    branches: Vec<Branch>,
    clients: Vec<Client>,
    trucks: Vec<Truck>,
    state: Mutex<MockState>,
}

impl MockApi {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut clients = Vec::with_capacity(CLIENTS.len());
        for (i, name) in CLIENTS.iter().enumerate() {
            // A couple of clients are not assigned to any branch.
            let branch_id = if i % 7 == 6 {
                None
            } else {
                Some(rng.gen_range(1..=BRANCHES.len() as u64))
            };
            clients.push(Client {
                id: 100 + i as u64,
                name: name.to_string(),
                branch_id,
            });
        }

        let branches = BRANCHES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let id = i as u64 + 1;
                let assigned = clients.iter().filter(|c| c.branch_id == Some(id)).count() as u64;
                Branch {
                    id,
                    name: name.to_string(),
                    // The server aggregate also counts archived clients.
                    client_count: assigned + rng.gen_range(0..3),
                }
            })
            .collect();

        let trucks = (0..12)
            .map(|i| {
                let mut extra = Map::new();
                extra.insert(
                    "driver_name".to_string(),
                    Value::String(DRIVERS[i % DRIVERS.len()].to_string()),
                );
                Truck {
                    id: 500 + i as u64,
                    plate_number: format!(
                        "{}{}{} {:04}",
                        (b'A' + rng.gen_range(0..26)) as char,
                        (b'A' + rng.gen_range(0..26)) as char,
                        (b'A' + rng.gen_range(0..26)) as char,
                        rng.gen_range(1..10_000)
                    ),
                    branch_id: Some(rng.gen_range(1..=BRANCHES.len() as u64)),
                    extra,
                }
            })
            .collect();

        Self {
            branches,
            clients,
            trucks,
            state: Mutex::new(MockState {
                rng,
                next_request_id: 1000,
                appointments: Vec::new(),
                trucks: Vec::new(),
            }),
        }
    }

    fn next_snapshot(&self) -> Result<AnalyticsSnapshot, DashError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DashError::Unknown("mock state poisoned".to_string()))?;
        let state = &mut *state;

        // Requests get approved or rejected...
        state.appointments.retain(|_| !state.rng.gen_ratio(1, 5));
        state.trucks.retain(|_| !state.rng.gen_ratio(1, 4));

        // ...and new ones arrive.
        for _ in 0..state.rng.gen_range(0..3) {
            let id = state.next_request_id;
            state.next_request_id += 1;
            let name = VISITORS[state.rng.gen_range(0..VISITORS.len())];
            let branch_id = state.rng.gen_range(1..=BRANCHES.len() as u64);
            state.appointments.push(mock_request(id, name, branch_id, "appointment"));
        }
        if state.rng.gen_ratio(1, 2) {
            let id = state.next_request_id;
            state.next_request_id += 1;
            let truck = &self.trucks[state.rng.gen_range(0..self.trucks.len())];
            let branch_id = truck.branch_id.unwrap_or(1);
            state.trucks.push(mock_request(id, &truck.plate_number, branch_id, "truck_entry"));
        }

        let appointment_pending = state.appointments.len() as u64;
        let truck_pending = state.trucks.len() as u64;

        Ok(AnalyticsSnapshot {
            total_pending: appointment_pending + truck_pending,
            appointment_pending,
            truck_pending,
            recent: RecentRequests {
                appointments: state.appointments.iter().rev().take(10).cloned().collect(),
                trucks: state.trucks.iter().rev().take(10).cloned().collect(),
            },
        })
    }
}

fn mock_request(id: u64, name: &str, branch_id: u64, purpose: &str) -> PendingRequest {
    let mut extra = Map::new();
    extra.insert("purpose".to_string(), json!(purpose));
    PendingRequest {
        id,
        name: Some(name.to_string()),
        branch_id: Some(branch_id),
        status: Some("pending".to_string()),
        created_at: Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        extra,
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new(7)
    }
}

#[async_trait]
impl DashboardApi for MockApi {
    async fn fetch_branches(&self) -> Result<Vec<Branch>, DashError> {
        Ok(self.branches.clone())
    }

    async fn fetch_branch_clients(&self) -> Result<Vec<Client>, DashError> {
        Ok(self.clients.clone())
    }

    async fn fetch_trucks(&self) -> Result<Vec<Truck>, DashError> {
        Ok(self.trucks.clone())
    }

    async fn fetch_analytics(&self) -> Result<AnalyticsSnapshot, DashError> {
        self.next_snapshot()
    }

    fn describe(&self) -> String {
        "demo data".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_is_consistent() {
        let api = MockApi::new(42);
        let branches = api.fetch_branches().await.unwrap();
        let clients = api.fetch_branch_clients().await.unwrap();

        assert_eq!(branches.len(), BRANCHES.len());
        for branch in &branches {
            let listed = clients.iter().filter(|c| c.branch_id == Some(branch.id)).count() as u64;
            assert!(branch.client_count >= listed);
        }
        assert!(clients.iter().any(|c| c.branch_id.is_none()));
    }

    #[tokio::test]
    async fn test_same_seed_same_directory() {
        let a = MockApi::new(1).fetch_trucks().await.unwrap();
        let b = MockApi::new(1).fetch_trucks().await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_analytics_totals_add_up() {
        let api = MockApi::new(3);
        for _ in 0..20 {
            let snapshot = api.fetch_analytics().await.unwrap();
            assert_eq!(
                snapshot.total_pending,
                snapshot.appointment_pending + snapshot.truck_pending
            );
            assert!(snapshot.recent.appointments.len() <= 10);
            assert!(snapshot.recent.trucks.iter().all(|r| r.status.as_deref() == Some("pending")));
        }
    }
}
