//! Testing utilities and mock implementations.
//!
//! This module provides a mock of the issue lookup service plus changelog
//! fixtures, allowing pipeline tests without a real Jira instance.
//!
//! # Example
//!
//! ```rust,ignore
//! use changelog_jira_core::testing::{fixtures, MockIssueLookup};
//!
//! let lookup = MockIssueLookup::with_issues(&[("PROJ-12", "Single sign-on")]).await;
//! let config = fixtures::config("PROJ");
//! ```

mod mock_issue_lookup;

pub use mock_issue_lookup::MockIssueLookup;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::config::{ChangelogConfig, Config, JiraConfig, MetricsConfig};

    /// Create a valid config for the given project key with default
    /// changelog conventions.
    pub fn config(project_key: &str) -> Config {
        Config {
            jira: JiraConfig {
                host: "jira.example.com".to_string(),
                username: "bot".to_string(),
                password: "token".to_string(),
                project_key: project_key.to_string(),
                base_url: None,
                api_version: "2".to_string(),
                timeout_secs: 5,
            },
            changelog: ChangelogConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }

    /// A changelog in the default `### Pull Requests` convention with two
    /// releases, a shared ticket and an entry without a type marker.
    pub fn changelog() -> &'static str {
        "# Changelog\n\
         \n\
         ## v1.1.0\n\
         ### Pull Requests\n\
         \n\
         - feat/login: add SSO (#PROJ-12)\n\
         - fix: null deref (#PROJ-12)\n\
         - chore: bump deps\n\
         \n\
         ## v1.0.0\n\
         ### Pull Requests\n\
         \n\
         - breaking-changes/api: drop v1 endpoints (#PROJ-3)\n\
         \n\
         Generated by the changelog bot.\n"
    }
}
