//! Ticket identifier types.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A project-key-prefixed issue reference such as `PROJ-123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TicketId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TicketId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Document-wide set of ticket ids, kept in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct TicketSet {
    order: Vec<TicketId>,
    seen: HashSet<TicketId>,
}

impl TicketSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an id; returns false if it was already present.
    pub fn insert(&mut self, id: TicketId) -> bool {
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: &TicketId) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TicketId> {
        self.order.iter()
    }
}

impl Extend<TicketId> for TicketSet {
    fn extend<I: IntoIterator<Item = TicketId>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl FromIterator<TicketId> for TicketSet {
    fn from_iter<I: IntoIterator<Item = TicketId>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
