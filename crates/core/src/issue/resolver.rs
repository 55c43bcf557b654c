//! Concurrent resolution of a document's ticket ids.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::metrics::{ISSUE_LOOKUPS, ISSUE_LOOKUP_DURATION};
use crate::ticket::{TicketId, TicketSet};

use super::{IssueLookup, IssueMap};

/// Resolves every distinct ticket id with one lookup each.
///
/// Lookups run concurrently and are joined before returning. A failed
/// lookup is logged and left out of the result; it never fails the batch
/// and is not retried.
pub struct IssueResolver<L: IssueLookup + ?Sized> {
    lookup: Arc<L>,
}

impl<L: IssueLookup + ?Sized> IssueResolver<L> {
    pub fn new(lookup: Arc<L>) -> Self {
        Self { lookup }
    }

    pub async fn resolve(&self, tickets: &TicketSet) -> IssueMap {
        let service = self.lookup.name().to_string();
        info!("Fetching {} issues...", tickets.len());

        let lookups = tickets.iter().map(|id| {
            let service = service.as_str();
            async move {
                let start = Instant::now();
                let result = self.lookup.summary(id).await;
                ISSUE_LOOKUP_DURATION
                    .with_label_values(&[service])
                    .observe(start.elapsed().as_secs_f64());
                (id, result)
            }
        });

        let results = join_all(lookups).await;

        let mut issues = IssueMap::new();
        let mut failed = 0usize;
        for (id, result) in results {
            match result {
                Ok(summary) => {
                    debug!(ticket = %id, summary = %summary, "Issue resolved");
                    ISSUE_LOOKUPS
                        .with_label_values(&[service.as_str(), "resolved"])
                        .inc();
                    issues.insert(TicketId::clone(id), summary);
                }
                Err(e) => {
                    warn!(ticket = %id, error = %e, "Issue lookup failed");
                    ISSUE_LOOKUPS
                        .with_label_values(&[service.as_str(), "failed"])
                        .inc();
                    failed += 1;
                }
            }
        }

        info!(
            resolved = issues.len(),
            failed = failed,
            "All issues fetched"
        );

        issues
    }
}
