// services/depot-dash/src/aggregator.rs
//
// Chart-ready datasets and pending-request statistics derived from raw
// collections. Everything here is recomputed from scratch on each change.
//

use svckit::types::{AnalyticsSnapshot, Branch, BranchId, Client, Truck};

use crate::chart::{slice_color, DisplayMode, HslColor};
use crate::selection::BranchFilter;

/// Which collection a dataset's indices point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    AllBranches,
    SingleBranch(BranchId),
}

impl From<BranchFilter> for DatasetKind {
    fn from(filter: BranchFilter) -> Self {
        match filter {
            BranchFilter::All => DatasetKind::AllBranches,
            BranchFilter::Branch(id) => DatasetKind::SingleBranch(id),
        }
    }
}

/// Parallel labels/values/colors plus the record id behind each entry.
/// Built only through `compute_dataset`, so the sequences always line up.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    kind: DatasetKind,
    labels: Vec<String>,
    values: Vec<u64>,
    colors: Vec<HslColor>,
    ids: Vec<u64>,
}

/// One row of a dataset, for legends and tables.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetEntry<'a> {
    pub label: &'a str,
    pub value: u64,
    pub color: HslColor,
    pub percent: String,
}

impl ChartDataset {
    pub fn empty(kind: DatasetKind) -> Self {
        Self {
            kind,
            labels: Vec::new(),
            values: Vec::new(),
            colors: Vec::new(),
            ids: Vec::new(),
        }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn colors(&self) -> &[HslColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Branch id (overview) or client id (single branch) of entry `index`.
    pub fn id_at(&self, index: usize) -> Option<u64> {
        self.ids.get(index).copied()
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }

    pub fn percentage_labels(&self) -> Vec<String> {
        let total = self.total();
        self.values
            .iter()
            .map(|value| percentage_label(*value, total))
            .collect()
    }

    pub fn entries(&self) -> Vec<DatasetEntry<'_>> {
        let total = self.total();
        self.labels
            .iter()
            .zip(&self.values)
            .zip(&self.colors)
            .map(|((label, value), color)| DatasetEntry {
                label,
                value: *value,
                color: *color,
                percent: percentage_label(*value, total),
            })
            .collect()
    }
}

/// `value / total * 100` with one decimal and a `%`, or empty when total is 0.
/// Ties round up (6.25 -> "6.3%").
pub fn percentage_label(value: u64, total: u64) -> String {
    if total == 0 {
        return String::new();
    }
    // Tenths of a percent in integers, so ties are exact.
    let (value, total) = (u128::from(value), u128::from(total));
    let tenths = (value * 2000 + total) / (total * 2);
    format!("{}.{}%", tenths / 10, tenths % 10)
}

pub fn compute_dataset(
    branches: &[Branch],
    clients: &[Client],
    filter: BranchFilter,
    mode: DisplayMode,
) -> ChartDataset {
    let kind = DatasetKind::from(filter);

    let rows: Vec<(String, u64, u64)> = match filter {
        BranchFilter::All => branches
            .iter()
            .map(|b| (b.name.clone(), b.client_count, b.id))
            .collect(),
        BranchFilter::Branch(branch_id) => clients_of(clients, branch_id)
            .map(|c| (c.name.clone(), 1, c.id))
            .collect(),
    };

    let count = rows.len();
    let mut dataset = ChartDataset::empty(kind);
    for (index, (label, value, id)) in rows.into_iter().enumerate() {
        dataset.labels.push(label);
        dataset.values.push(value);
        dataset.colors.push(slice_color(index, count, mode));
        dataset.ids.push(id);
    }
    dataset
}

pub fn clients_of(clients: &[Client], branch_id: BranchId) -> impl Iterator<Item = &Client> {
    clients.iter().filter(move |c| c.branch_id == Some(branch_id))
}

pub fn trucks_of(trucks: &[Truck], branch_id: BranchId) -> impl Iterator<Item = &Truck> {
    trucks.iter().filter(move |t| t.branch_id == Some(branch_id))
}

/// Headline numbers of the pending-requests panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingStats {
    pub total: u64,
    pub appointments: u64,
    pub trucks: u64,
    pub appointment_share: String,
    pub truck_share: String,
}

impl PendingStats {
    pub fn from_snapshot(snapshot: &AnalyticsSnapshot) -> Self {
        Self {
            total: snapshot.total_pending,
            appointments: snapshot.appointment_pending,
            trucks: snapshot.truck_pending,
            appointment_share: percentage_label(snapshot.appointment_pending, snapshot.total_pending),
            truck_share: percentage_label(snapshot.truck_pending, snapshot.total_pending),
        }
    }
}
