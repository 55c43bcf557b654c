//! Issue tracker integration.
//!
//! The pipeline only needs one capability from the tracker: turning a
//! ticket id into its summary line. `JiraClient` implements it over the
//! Jira REST API; `IssueResolver` fans lookups out for a whole document.

mod jira;
mod resolver;
mod types;

pub use jira::JiraClient;
pub use resolver::IssueResolver;
pub use types::IssueMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::ticket::TicketId;

/// Errors that can occur when looking up an issue.
#[derive(Debug, Error)]
pub enum IssueLookupError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Issue does not exist or is not visible to the configured user.
    #[error("Issue not found: {0}")]
    NotFound(String),

    /// Credentials rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing credentials, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Resolves ticket ids to human-readable summaries.
#[async_trait]
pub trait IssueLookup: Send + Sync {
    /// Name of the backing service, for logs.
    fn name(&self) -> &str;

    /// Fetch the summary of a single issue.
    async fn summary(&self, id: &TicketId) -> Result<String, IssueLookupError>;
}
