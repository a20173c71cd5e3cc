//! In-memory doubles of the port traits, recording every call.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::ports::{IssueTracker, LinkedIssueResolver};
use crate::{
    Change, IssueNumber, IssueSnapshot, MutationRequest, ProjectId, ServiceError, StoryId,
};

pub(crate) fn change(value: Value) -> Change {
    serde_json::from_value(value).expect("test change must parse")
}

#[derive(Default)]
pub(crate) struct FakeResolver {
    links: HashMap<StoryId, Option<IssueNumber>>,
    failing: HashSet<StoryId>,
    calls: Mutex<Vec<(ProjectId, StoryId)>>,
}

impl FakeResolver {
    pub fn link(mut self, story: u64, issue: u64) -> Self {
        self.links.insert(StoryId::new(story), Some(IssueNumber::new(issue)));
        self
    }

    pub fn fail(mut self, story: u64) -> Self {
        self.failing.insert(StoryId::new(story));
        self
    }

    pub fn calls(&self) -> Vec<(ProjectId, StoryId)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LinkedIssueResolver for FakeResolver {
    async fn resolve_linked_issue(
        &self,
        project: ProjectId,
        story: StoryId,
    ) -> Result<Option<IssueNumber>, ServiceError> {
        self.calls.lock().unwrap().push((project, story));
        if self.failing.contains(&story) {
            return Err(ServiceError::new("tracker", "fake error from Tracker"));
        }
        Ok(self.links.get(&story).copied().flatten())
    }
}

#[derive(Default)]
pub(crate) struct FakeIssues {
    labels: HashMap<IssueNumber, Vec<&'static str>>,
    failing_fetch: HashSet<IssueNumber>,
    failing_update: HashSet<IssueNumber>,
    fetches: Mutex<Vec<IssueNumber>>,
    updates: Mutex<Vec<(IssueNumber, MutationRequest)>>,
}

impl FakeIssues {
    pub fn with_issue(mut self, issue: u64, labels: &[&'static str]) -> Self {
        self.labels.insert(IssueNumber::new(issue), labels.to_vec());
        self
    }

    pub fn fail_fetch(mut self, issue: u64) -> Self {
        self.failing_fetch.insert(IssueNumber::new(issue));
        self
    }

    pub fn fail_update(mut self, issue: u64) -> Self {
        self.failing_update.insert(IssueNumber::new(issue));
        self
    }

    pub fn fetches(&self) -> Vec<IssueNumber> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(IssueNumber, MutationRequest)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTracker for FakeIssues {
    async fn fetch_issue(&self, issue: IssueNumber) -> Result<IssueSnapshot, ServiceError> {
        self.fetches.lock().unwrap().push(issue);
        if self.failing_fetch.contains(&issue) {
            return Err(ServiceError::new("github", "fake error from GitHub"));
        }
        let labels = self.labels.get(&issue).cloned().unwrap_or_default();
        Ok(IssueSnapshot {
            labels: labels.into_iter().collect(),
        })
    }

    async fn update_issue(
        &self,
        issue: IssueNumber,
        request: &MutationRequest,
    ) -> Result<(), ServiceError> {
        self.updates.lock().unwrap().push((issue, request.clone()));
        if self.failing_update.contains(&issue) {
            return Err(ServiceError::new("github", "fake error from GitHub"));
        }
        Ok(())
    }
}
