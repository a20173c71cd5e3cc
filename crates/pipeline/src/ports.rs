//! Port traits for the two external services.
//!
//! Production implementations live in the `tracker` and `github` crates. The
//! domain only sees these traits, which keeps the processor testable with
//! in-memory doubles.

use async_trait::async_trait;

use crate::{IssueNumber, IssueSnapshot, MutationRequest, ProjectId, ServiceError, StoryId};

/// Finds the GitHub issue a Tracker story is linked to.
#[async_trait]
pub trait LinkedIssueResolver: Send + Sync {
    /// Returns the linked issue, or `None` if the story is not linked.
    async fn resolve_linked_issue(
        &self,
        project: ProjectId,
        story: StoryId,
    ) -> Result<Option<IssueNumber>, ServiceError>;
}

/// Reads and updates GitHub issues in the configured repository.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Reads the current labels of `issue`.
    async fn fetch_issue(&self, issue: IssueNumber) -> Result<IssueSnapshot, ServiceError>;

    /// Applies `request` as a partial update. Unset fields must not be sent.
    async fn update_issue(
        &self,
        issue: IssueNumber,
        request: &MutationRequest,
    ) -> Result<(), ServiceError>;
}
