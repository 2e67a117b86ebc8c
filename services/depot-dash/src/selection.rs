// services/depot-dash/src/selection.rs
//
// Operator selection: branch filter, bulk-selected requests, search text
//

use std::collections::BTreeSet;
use std::fmt;

use svckit::types::{Branch, BranchId, Client, PendingRequest, RequestId, RequestKind};

/// Appointments and trucks number their requests independently.
pub type RequestKey = (RequestKind, RequestId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BranchFilter {
    #[default]
    All,
    Branch(BranchId),
}

impl BranchFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, BranchFilter::All)
    }

    /// Accepts `all` (any case) or a numeric branch id.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("all") {
            return Some(BranchFilter::All);
        }
        input.parse().ok().map(BranchFilter::Branch)
    }
}

impl fmt::Display for BranchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchFilter::All => write!(f, "all"),
            BranchFilter::Branch(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    active_branch: BranchFilter,
    bulk_selected: BTreeSet<RequestKey>,
    /// Requests currently offered for bulk selection, in list order.
    selectable: Vec<RequestKey>,
    search: String,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_branch(&self) -> BranchFilter {
        self.active_branch
    }

    /// Returns true when the filter actually changed.
    pub fn set_active_branch(&mut self, filter: BranchFilter) -> bool {
        if self.active_branch == filter {
            return false;
        }
        self.active_branch = filter;
        true
    }

    /// Next filter in the order `All, branches[0], .., branches[n-1], All`.
    /// A filter pointing at a branch that is no longer listed restarts at `All`.
    pub fn next_branch(&self, branches: &[Branch], forward: bool) -> BranchFilter {
        if branches.is_empty() {
            return BranchFilter::All;
        }
        let position = match self.active_branch {
            BranchFilter::All => None,
            BranchFilter::Branch(id) => match branches.iter().position(|b| b.id == id) {
                Some(pos) => Some(pos),
                None => return BranchFilter::All,
            },
        };

        let next = match (position, forward) {
            (None, true) => Some(0),
            (None, false) => Some(branches.len() - 1),
            (Some(pos), true) if pos + 1 < branches.len() => Some(pos + 1),
            (Some(_), true) => None,
            (Some(0), false) => None,
            (Some(pos), false) => Some(pos - 1),
        };

        next.map(|i| BranchFilter::Branch(branches[i].id))
            .unwrap_or(BranchFilter::All)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_string();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    pub fn matches_search(&self, text: &str) -> bool {
        matches_query(text, &self.search)
    }

    pub fn bulk_selected(&self) -> &BTreeSet<RequestKey> {
        &self.bulk_selected
    }

    pub fn is_bulk_selected(&self, kind: RequestKind, id: RequestId) -> bool {
        self.bulk_selected.contains(&(kind, id))
    }

    /// Toggles `key`; requests that are not currently selectable are ignored.
    pub fn toggle_bulk(&mut self, key: RequestKey) -> bool {
        if !self.selectable.contains(&key) {
            return false;
        }
        if !self.bulk_selected.remove(&key) {
            self.bulk_selected.insert(key);
        }
        true
    }

    pub fn select_all_bulk(&mut self) {
        self.bulk_selected = self.selectable.iter().copied().collect();
    }

    pub fn clear_bulk(&mut self) {
        self.bulk_selected.clear();
    }

    /// Replaces the selectable list. A different list drops the bulk
    /// selection so it never refers to ids that went away. Returns true
    /// when a non-empty selection was dropped.
    pub fn sync_selectable(&mut self, keys: Vec<RequestKey>) -> bool {
        if keys == self.selectable {
            return false;
        }
        self.selectable = keys;
        let had_selection = !self.bulk_selected.is_empty();
        self.bulk_selected.clear();
        had_selection
    }
}

fn matches_query(text: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || text.to_lowercase().contains(&query.to_lowercase())
}

pub fn filter_clients<'a>(clients: &'a [Client], query: &str) -> Vec<&'a Client> {
    clients
        .iter()
        .filter(|c| matches_query(&c.name, query))
        .collect()
}

/// Matches on the display name or the numeric id.
pub fn filter_requests<'a>(requests: &'a [PendingRequest], query: &str) -> Vec<&'a PendingRequest> {
    requests
        .iter()
        .filter(|r| matches_query(&r.display_name(), query) || matches_query(&r.id.to_string(), query))
        .collect()
}
