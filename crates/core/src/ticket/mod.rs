//! Jira ticket identifiers embedded in changelog entries.

mod extract;
mod types;

pub use extract::{ReferencePattern, TicketExtractor};
pub use types::{TicketId, TicketSet};

use thiserror::Error;

/// Errors building ticket patterns from configuration.
#[derive(Debug, Error)]
pub enum PatternError {
    /// Reference template lacks the `{key}` placeholder.
    #[error("Reference pattern must contain {{key}}: {0}")]
    MissingKey(String),

    /// Pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {reason}")]
    Invalid { pattern: String, reason: String },
}

impl PatternError {
    pub(crate) fn invalid(pattern: impl Into<String>, err: regex_lite::Error) -> Self {
        Self::Invalid {
            pattern: pattern.into(),
            reason: err.to_string(),
        }
    }
}
