//! Per-story change processing.
//!
//! [`ChangeProcessor::process`] takes one [`Change`] from an activity event
//! through lookup, fetch, planning and update. [`plan_mutation`] is the pure
//! part: it decides what the issue update should contain from the change and
//! the issue's current labels.

use tracing::{debug, info, instrument};

use crate::ports::{IssueTracker, LinkedIssueResolver};
use crate::reconcile::{reconcile, Transition};
use crate::taxonomy::{Dimension, ACCEPTED_STATE};
use crate::{
    Change, ChangeType, ChangedValues, GitHubUsername, IssueNumber, IssueSnapshot, IssueState,
    MutationRequest, OptionalField, OwnerMapping, ProjectId, SyncError, TrackerUserId,
};

/// Why a change led to no outbound calls (or stopped before the update).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The change is about something other than a story.
    NotAStory,
    /// Deleted stories cannot be queried in Tracker, so their link is unknown.
    Deleted,
    /// The story has no linked GitHub issue.
    NotLinked,
}

/// What processing one change did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome {
    Skipped(SkipReason),
    /// The issue was read but already matched the story.
    Unchanged { issue: IssueNumber },
    /// The issue was updated with `request`.
    Updated {
        issue: IssueNumber,
        request: MutationRequest,
    },
}

/// Processes the changes of one delivery against the two external services.
pub struct ChangeProcessor<'a> {
    resolver: &'a dyn LinkedIssueResolver,
    issues: &'a dyn IssueTracker,
    owners: Option<&'a OwnerMapping>,
}

impl<'a> ChangeProcessor<'a> {
    pub fn new(
        resolver: &'a dyn LinkedIssueResolver,
        issues: &'a dyn IssueTracker,
        owners: Option<&'a OwnerMapping>,
    ) -> Self {
        Self {
            resolver,
            issues,
            owners,
        }
    }

    /// Reconciles the issue linked to `change`, issuing at most one lookup,
    /// one fetch and one update.
    #[instrument(skip_all, fields(story = %change.id, change_type = %change.change_type))]
    pub async fn process(
        &self,
        project: ProjectId,
        change: &Change,
    ) -> Result<EntityOutcome, SyncError> {
        if !change.is_story() {
            debug!(kind = %change.kind, "Ignoring change that is not about a story");
            return Ok(EntityOutcome::Skipped(SkipReason::NotAStory));
        }

        if change.change_type == ChangeType::Delete {
            info!("Story was deleted, skipping");
            return Ok(EntityOutcome::Skipped(SkipReason::Deleted));
        }

        let linked = self
            .resolver
            .resolve_linked_issue(project, change.id)
            .await
            .map_err(|source| SyncError::Lookup {
                story: change.id,
                source,
            })?;
        let Some(issue) = linked else {
            info!("Story is not linked to a GitHub issue");
            return Ok(EntityOutcome::Skipped(SkipReason::NotLinked));
        };
        info!(%issue, "Story is linked to GitHub issue");

        let snapshot = self
            .issues
            .fetch_issue(issue)
            .await
            .map_err(|source| SyncError::Fetch { issue, source })?;
        debug!(%issue, labels = %snapshot.labels, "Issue labels before update");

        let request = plan_mutation(change, &snapshot, self.owners);
        if request.is_empty() {
            info!(%issue, "No updates planned, skipping GitHub update");
            return Ok(EntityOutcome::Unchanged { issue });
        }

        info!(%issue, ?request, "Updating GitHub issue");
        self.issues
            .update_issue(issue, &request)
            .await
            .map_err(|source| SyncError::Update { issue, source })?;

        Ok(EntityOutcome::Updated { issue, request })
    }
}

/// Builds the dimension transitions named by `values`.
///
/// State and type count only when non-empty. The estimate counts whenever it
/// is present, so an explicit `null` (unestimated) strips the estimate labels.
pub fn transitions(values: &ChangedValues) -> Vec<Transition> {
    let mut transitions = Vec::new();

    if let Some(state) = values.lifecycle_state() {
        transitions.push(Transition::to(Dimension::LifecycleState, state));
    }
    if let Some(item_type) = values.item_type() {
        transitions.push(Transition::to(Dimension::ItemType, item_type));
    }
    match &values.estimate {
        OptionalField::Absent => {}
        OptionalField::ExplicitNull => transitions.push(Transition::cleared(Dimension::Estimate)),
        OptionalField::Value(points) => {
            transitions.push(Transition::to(Dimension::Estimate, points.to_string()))
        }
    }

    transitions
}

/// Decides the issue update for `change` given the issue's current labels.
///
/// Every field that should not change is left unset.
pub fn plan_mutation(
    change: &Change,
    snapshot: &IssueSnapshot,
    owners: Option<&OwnerMapping>,
) -> MutationRequest {
    let values = &change.new_values;

    let reconciliation = reconcile(&snapshot.labels, &transitions(values));
    let labels = if reconciliation.changed {
        Some(reconciliation.labels)
    } else {
        debug!("No label updates needed");
        None
    };

    MutationRequest {
        labels,
        assignees: owners.and_then(|owners| plan_assignees(change, owners)),
        title: values.title().map(str::to_owned),
        body: values.description().map(str::to_owned),
        state: plan_state(change),
    }
}

/// Tracker reports an empty owner list on every story creation, so owner
/// changes are only honoured for other change types.
fn plan_assignees(change: &Change, owners: &OwnerMapping) -> Option<Vec<GitHubUsername>> {
    if change.change_type == ChangeType::Create {
        return None;
    }

    let new_owners: &[TrackerUserId] = match &change.new_values.owner_ids {
        OptionalField::Absent => return None,
        OptionalField::ExplicitNull => &[],
        OptionalField::Value(ids) => ids.as_slice(),
    };

    if new_owners.is_empty() {
        info!("All story owners were removed, clearing issue assignees");
        return Some(Vec::new());
    }

    let assignees = owners.usernames_for(new_owners);
    if assignees.is_empty() {
        info!(
            ?new_owners,
            "None of the new story owners have a GitHub username configured, leaving assignees"
        );
        return None;
    }
    Some(assignees)
}

/// Accepting a story closes its issue; moving it out of accepted reopens it.
fn plan_state(change: &Change) -> Option<IssueState> {
    let new_state = change.new_values.lifecycle_state()?;
    if new_state == ACCEPTED_STATE {
        return Some(IssueState::Closed);
    }
    (change.original_values.lifecycle_state() == Some(ACCEPTED_STATE)).then_some(IssueState::Open)
}
