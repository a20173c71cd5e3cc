//! Tracker owner to GitHub assignee mapping.

use std::collections::HashMap;

use serde::Deserialize;

use crate::{GitHubUsername, TrackerUserId};

/// Configured mapping from Tracker person ids to GitHub logins.
///
/// Read-only after loading. When no mapping is configured at all, owner
/// changes are never propagated to issue assignees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct OwnerMapping(HashMap<TrackerUserId, GitHubUsername>);

impl OwnerMapping {
    /// Returns the GitHub login configured for `owner`.
    ///
    /// An entry with an empty login counts as unmapped.
    pub fn username_for(&self, owner: TrackerUserId) -> Option<&GitHubUsername> {
        self.0.get(&owner).filter(|u| !u.as_str().is_empty())
    }

    /// Maps every owner that has a login, preserving order and dropping the rest.
    ///
    /// Each login appears once, even when several owners map to it.
    pub fn usernames_for(&self, owners: &[TrackerUserId]) -> Vec<GitHubUsername> {
        let mut usernames: Vec<GitHubUsername> = Vec::with_capacity(owners.len());
        for username in owners.iter().filter_map(|owner| self.username_for(*owner)) {
            if !usernames.contains(username) {
                usernames.push(username.clone());
            }
        }
        usernames
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(TrackerUserId, GitHubUsername)> for OwnerMapping {
    fn from_iter<I: IntoIterator<Item = (TrackerUserId, GitHubUsername)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_and_blank_owners_are_dropped() {
        let mapping: OwnerMapping = serde_json::from_str(
            r#"{"3344177": "github-user1", "3344175": "github-user2", "1": ""}"#,
        )
        .unwrap();

        let usernames = mapping.usernames_for(&[
            TrackerUserId::new(3344175),
            TrackerUserId::new(99),
            TrackerUserId::new(1),
            TrackerUserId::new(3344177),
        ]);
        let logins: Vec<&str> = usernames.iter().map(GitHubUsername::as_str).collect();
        assert_eq!(logins, ["github-user2", "github-user1"]);
    }

    #[test]
    fn owners_sharing_a_login_yield_it_once() {
        let mapping: OwnerMapping =
            serde_json::from_str(r#"{"1": "same", "2": "same", "3": "other"}"#).unwrap();

        let usernames = mapping.usernames_for(&[
            TrackerUserId::new(1),
            TrackerUserId::new(3),
            TrackerUserId::new(2),
        ]);
        let logins: Vec<&str> = usernames.iter().map(GitHubUsername::as_str).collect();
        assert_eq!(logins, ["same", "other"]);
    }
}
