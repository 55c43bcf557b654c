//! Resolved issue data.

use std::collections::HashMap;

use crate::ticket::TicketId;

/// Summaries of successfully resolved tickets.
///
/// A ticket missing from the map failed to resolve; renderers show it
/// without a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueMap {
    summaries: HashMap<TicketId, String>,
}

impl IssueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: TicketId, summary: impl Into<String>) {
        self.summaries.insert(id, summary.into());
    }

    pub fn get(&self, id: &TicketId) -> Option<&str> {
        self.summaries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &TicketId) -> bool {
        self.summaries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(TicketId, S)> for IssueMap {
    fn from_iter<I: IntoIterator<Item = (TicketId, S)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (id, summary) in iter {
            map.insert(id, summary);
        }
        map
    }
}
