//! Story sync Pivotal Tracker adapter.
//!
//! Implements the [`pipeline::LinkedIssueResolver`] trait over the Tracker
//! REST API v5. A story is linked to a GitHub issue through Tracker's
//! integration feature, which stores the issue number in the story's
//! `external_id` field.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, authentication and response parsing
//! live here. The [`pipeline`] crate sees only
//! [`pipeline::LinkedIssueResolver`]. No retries are performed; a failed call
//! is reported once and the caller decides what to do.

use async_trait::async_trait;
use pipeline::{IssueNumber, LinkedIssueResolver, ProjectId, ServiceError, StoryId};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Public Tracker endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.pivotaltracker.com";

const TOKEN_HEADER: &str = "X-TrackerToken";

/// Errors produced by [`TrackerClient`].
#[derive(Debug, Error)]
pub enum TrackerApiError {
    #[error("Tracker API request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Tracker API at {url} returned status {status}")]
    Status { url: String, status: StatusCode },

    #[error("Tracker API at {url} returned a body which cannot be parsed: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Tracker API at {url} returned non-integer external_id: {value}")]
    InvalidExternalId { url: String, value: String },
}

impl From<TrackerApiError> for ServiceError {
    fn from(err: TrackerApiError) -> Self {
        ServiceError::new("tracker", err)
    }
}

/// The only story field the relay reads.
#[derive(Debug, Deserialize)]
struct StoryResponse {
    #[serde(default)]
    external_id: Option<String>,
}

/// Client for the Tracker REST API.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl TrackerClient {
    /// Creates a client for the public Tracker endpoint.
    ///
    /// `http` carries the request timeout and may be shared with other clients.
    pub fn new(http: reqwest::Client, api_token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: api_token.into(),
        }
    }

    /// Points the client at another Tracker host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the GitHub issue linked to `story`, or `None` if it is not linked.
    #[instrument(skip(self))]
    pub async fn linked_issue(
        &self,
        project: ProjectId,
        story: StoryId,
    ) -> Result<Option<IssueNumber>, TrackerApiError> {
        let url = format!(
            "{}/services/v5/projects/{project}/stories/{story}",
            self.base_url
        );

        let response = self
            .http
            .get(&url)
            .header(TOKEN_HEADER, &self.api_token)
            .send()
            .await
            .map_err(|source| TrackerApiError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TrackerApiError::Status { url, status });
        }

        let body: StoryResponse =
            response
                .json()
                .await
                .map_err(|source| TrackerApiError::Decode {
                    url: url.clone(),
                    source,
                })?;

        let external_id = body.external_id.unwrap_or_default();
        if external_id.is_empty() {
            debug!("Story has no external_id");
            return Ok(None);
        }

        let number: u64 = external_id
            .parse()
            .map_err(|_| TrackerApiError::InvalidExternalId {
                url,
                value: external_id.clone(),
            })?;
        Ok((number != 0).then(|| IssueNumber::new(number)))
    }
}

#[async_trait]
impl LinkedIssueResolver for TrackerClient {
    async fn resolve_linked_issue(
        &self,
        project: ProjectId,
        story: StoryId,
    ) -> Result<Option<IssueNumber>, ServiceError> {
        Ok(self.linked_issue(project, story).await?)
    }
}
