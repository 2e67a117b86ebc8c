use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type BranchId = u64;
pub type ClientId = u64;
pub type TruckId = u64;
pub type RequestId = u64;

/// A depot branch. `client_count` is aggregated by the server and is taken
/// as-is, even when it disagrees with the client list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    #[serde(rename = "clientCount", default)]
    pub client_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Truck {
    pub id: TruckId,
    pub plate_number: String,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    /// Fields the dashboard does not interpret (driver, model, status...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Truck {
    /// Looks up an uninterpreted string field, e.g. `driver_name`.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Appointment,
    Truck,
}

impl RequestKind {
    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::Appointment => "Appointment",
            RequestKind::Truck => "Truck",
        }
    }
}

/// A pending appointment or truck-entry request from the analytics feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingRequest {
    pub id: RequestId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PendingRequest {
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Request #{}", self.id),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecentRequests {
    #[serde(default)]
    pub appointments: Vec<PendingRequest>,
    #[serde(default)]
    pub trucks: Vec<PendingRequest>,
}

impl RecentRequests {
    pub fn list(&self, kind: RequestKind) -> &[PendingRequest] {
        match kind {
            RequestKind::Appointment => &self.appointments,
            RequestKind::Truck => &self.trucks,
        }
    }
}

/// Full replacement snapshot of `/requests/analytics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    #[serde(default)]
    pub total_pending: u64,
    #[serde(default)]
    pub appointment_pending: u64,
    #[serde(default)]
    pub truck_pending: u64,
    #[serde(default)]
    pub recent: RecentRequests,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_wire_format() {
        let json = r#"[{"id":1,"name":"Marilao","clientCount":5},{"id":2,"name":"Taguig"}]"#;
        let branches: Vec<Branch> = serde_json::from_str(json).unwrap();
        assert_eq!(branches[0].client_count, 5);
        assert_eq!(branches[1].client_count, 0);
    }

    #[test]
    fn test_client_without_branch() {
        let json = r#"{"id":7,"name":"Acme Freight","branch_id":null}"#;
        let client: Client = serde_json::from_str(json).unwrap();
        assert_eq!(client.branch_id, None);
    }

    #[test]
    fn test_truck_keeps_extra_fields() {
        let json = r#"{"id":3,"plate_number":"NBC 1234","branch_id":2,"driver_name":"R. Santos"}"#;
        let truck: Truck = serde_json::from_str(json).unwrap();
        assert_eq!(truck.branch_id, Some(2));
        assert_eq!(truck.extra_str("driver_name"), Some("R. Santos"));
    }

    #[test]
    fn test_analytics_snapshot() {
        let json = r#"{
            "totalPending": 3,
            "appointmentPending": 2,
            "truckPending": 1,
            "recent": {
                "appointments": [{"id": 10, "name": "J. Cruz"}, {"id": 11}],
                "trucks": [{"id": 20, "name": "ABC 123", "status": "pending"}]
            }
        }"#;
        let snapshot: AnalyticsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.total_pending, 3);
        assert_eq!(snapshot.recent.list(RequestKind::Appointment).len(), 2);
        assert_eq!(snapshot.recent.appointments[1].display_name(), "Request #11");
        assert_eq!(snapshot.recent.trucks[0].status.as_deref(), Some("pending"));
    }
}
