//! Jira REST API client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::JiraConfig;
use crate::ticket::TicketId;

use super::{IssueLookup, IssueLookupError};

/// Jira issue lookup over `GET /rest/api/{version}/issue/{id}`.
pub struct JiraClient {
    client: Client,
    base_url: String,
    api_version: String,
    username: String,
    password: String,
}

impl JiraClient {
    /// Create a new Jira client.
    pub fn new(config: &JiraConfig) -> Result<Self, IssueLookupError> {
        if config.username.is_empty() || config.password.is_empty() {
            return Err(IssueLookupError::NotConfigured(
                "Jira username and password are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.rest_base_url(),
            api_version: config.api_version.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn issue_url(&self, id: &TicketId) -> String {
        format!(
            "{}/rest/api/{}/issue/{}",
            self.base_url,
            self.api_version,
            urlencoding::encode(id.as_str())
        )
    }
}

#[async_trait]
impl IssueLookup for JiraClient {
    fn name(&self) -> &str {
        "jira"
    }

    async fn summary(&self, id: &TicketId) -> Result<String, IssueLookupError> {
        let url = self.issue_url(id);

        debug!(ticket = %id, "Jira issue lookup");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("fields", "summary")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(IssueLookupError::Unauthorized(format!(
                "HTTP {} for {}",
                status.as_u16(),
                id
            )));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(IssueLookupError::NotFound(id.to_string()));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(IssueLookupError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IssueLookupError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let issue: JiraIssue = response.json().await.map_err(|e| {
            IssueLookupError::ParseError(format!("Failed to parse issue {}: {}", id, e))
        })?;

        Ok(issue.fields.summary)
    }
}

// Jira API response types

#[derive(Debug, Deserialize)]
struct JiraIssue {
    #[allow(dead_code)]
    key: Option<String>,
    fields: JiraIssueFields,
}

#[derive(Debug, Deserialize)]
struct JiraIssueFields {
    summary: String,
}
