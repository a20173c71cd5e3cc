//! The downstream side: what is read from a GitHub issue and what is written back.

use serde::{Deserialize, Serialize};

use crate::{GitHubUsername, LabelSet};

/// The parts of a GitHub issue read before reconciling.
///
/// Only the labels are needed; every other issue field is write-only from the
/// relay's point of view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueSnapshot {
    pub labels: LabelSet,
}

/// Open/closed state of a GitHub issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

/// A PATCH-style issue update.
///
/// Every field left as `None` is omitted from the serialised request and so
/// leaves the corresponding issue field untouched. `Some(vec![])` for
/// `assignees` is an explicit clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MutationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<GitHubUsername>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueState>,
}

impl MutationRequest {
    /// Returns `true` if the request would change nothing.
    pub fn is_empty(&self) -> bool {
        self.labels.is_none()
            && self.assignees.is_none()
            && self.title.is_none()
            && self.body.is_none()
            && self.state.is_none()
    }
}
