//! Story sync GitHub infrastructure adapter.
//!
//! Implements the [`pipeline::IssueTracker`] trait over the GitHub REST issues
//! API for one configured repository.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! Authentication, headers and response decoding are handled here; the
//! [`pipeline`] crate never sees them.
//!
//! Updates are sent as `PATCH` requests whose body carries only the fields set
//! on the [`pipeline::MutationRequest`]; GitHub leaves every omitted field
//! unchanged.

use async_trait::async_trait;
use pipeline::{IssueNumber, IssueSnapshot, IssueTracker, MutationRequest, ServiceError};
use reqwest::{header, RequestBuilder, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Public GitHub REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("story-sync/", env!("CARGO_PKG_VERSION"));

/// Errors produced by [`GitHubClient`].
#[derive(Debug, Error)]
pub enum GitHubApiError {
    #[error("GitHub API request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub API at {url} returned status {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("GitHub API at {url} returned a body which cannot be parsed: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<GitHubApiError> for ServiceError {
    fn from(err: GitHubApiError) -> Self {
        ServiceError::new("github", err)
    }
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    #[serde(default)]
    labels: Vec<LabelResponse>,
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    name: String,
}

/// Client for the issues of one GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    org: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    /// Creates a client for `org/repo` on github.com.
    pub fn new(
        http: reqwest::Client,
        org: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            org: org.into(),
            repo: repo.into(),
            token: token.into(),
        }
    }

    /// Points the client at another API host (GitHub Enterprise, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Reads the label names of `issue`.
    #[instrument(skip(self))]
    pub async fn get_issue(&self, issue: IssueNumber) -> Result<IssueSnapshot, GitHubApiError> {
        let url = self.issue_url(issue);
        let response = self.send(self.http.get(&url), &url).await?;

        let body: IssueResponse = response
            .json()
            .await
            .map_err(|source| GitHubApiError::Decode { url, source })?;

        Ok(IssueSnapshot {
            labels: body.labels.into_iter().map(|l| l.name).collect(),
        })
    }

    /// Sends `request` as a partial issue update.
    #[instrument(skip(self, request))]
    pub async fn edit_issue(
        &self,
        issue: IssueNumber,
        request: &MutationRequest,
    ) -> Result<(), GitHubApiError> {
        let url = self.issue_url(issue);
        self.send(self.http.patch(&url).json(request), &url).await?;
        debug!("Issue updated");
        Ok(())
    }

    fn issue_url(&self, issue: IssueNumber) -> String {
        format!(
            "{}/repos/{}/{}/issues/{issue}",
            self.base_url, self.org, self.repo
        )
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> Result<Response, GitHubApiError> {
        let response = builder
            .bearer_auth(&self.token)
            .header(header::ACCEPT, ACCEPT)
            .header(header::USER_AGENT, USER_AGENT)
            .header(API_VERSION_HEADER, API_VERSION)
            .send()
            .await
            .map_err(|source| GitHubApiError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubApiError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn fetch_issue(&self, issue: IssueNumber) -> Result<IssueSnapshot, ServiceError> {
        Ok(self.get_issue(issue).await?)
    }

    async fn update_issue(
        &self,
        issue: IssueNumber,
        request: &MutationRequest,
    ) -> Result<(), ServiceError> {
        Ok(self.edit_issue(issue, request).await?)
    }
}
