//! Mock issue lookup for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::issue::{IssueLookup, IssueLookupError};
use crate::ticket::TicketId;

/// Mock implementation of the IssueLookup trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable summaries per ticket id
/// - Track lookups for assertions
/// - Simulate per-id failures and slow responses
///
/// Unknown ids fail with `IssueLookupError::NotFound`.
///
/// # Example
///
/// ```rust,ignore
/// use changelog_jira_core::testing::MockIssueLookup;
///
/// let lookup = MockIssueLookup::new();
/// lookup.add_issue("PROJ-12", "Single sign-on").await;
///
/// let summary = lookup.summary(&TicketId::from("PROJ-12")).await?;
/// assert_eq!(summary, "Single sign-on");
/// assert_eq!(lookup.lookup_count().await, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockIssueLookup {
    /// Summaries by ticket id.
    issues: Arc<RwLock<HashMap<String, String>>>,
    /// Errors returned by the next lookup of a ticket id.
    failures: Arc<RwLock<HashMap<String, IssueLookupError>>>,
    /// Recorded lookups, in call order.
    lookups: Arc<RwLock<Vec<TicketId>>>,
    /// Simulated latency per lookup.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockIssueLookup {
    /// Create a new mock with no issues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock pre-populated with `(id, summary)` pairs.
    pub async fn with_issues(issues: &[(&str, &str)]) -> Self {
        let lookup = Self::new();
        for (id, summary) in issues {
            lookup.add_issue(id, summary).await;
        }
        lookup
    }

    /// Register an issue summary.
    pub async fn add_issue(&self, id: &str, summary: &str) {
        self.issues
            .write()
            .await
            .insert(id.to_string(), summary.to_string());
    }

    /// Make the next lookup of `id` fail with `error`.
    pub async fn fail_issue(&self, id: &str, error: IssueLookupError) {
        self.failures.write().await.insert(id.to_string(), error);
    }

    /// Delay every lookup by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// All lookups made so far.
    pub async fn recorded_lookups(&self) -> Vec<TicketId> {
        self.lookups.read().await.clone()
    }

    /// Number of lookups made so far.
    pub async fn lookup_count(&self) -> usize {
        self.lookups.read().await.len()
    }

    /// Forget recorded lookups.
    pub async fn clear_lookups(&self) {
        self.lookups.write().await.clear();
    }
}

#[async_trait]
impl IssueLookup for MockIssueLookup {
    fn name(&self) -> &str {
        "mock"
    }

    async fn summary(&self, id: &TicketId) -> Result<String, IssueLookupError> {
        self.lookups.write().await.push(id.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.write().await.remove(id.as_str()) {
            return Err(error);
        }

        self.issues
            .read()
            .await
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| IssueLookupError::NotFound(id.to_string()))
    }
}
