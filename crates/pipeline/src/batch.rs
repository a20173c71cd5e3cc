//! Batch driver: processes every change of one delivery.
//!
//! Changes are handled one after another in the order Tracker listed them, so
//! outbound calls happen in event order. A failing change never stops the
//! others; its error is recorded and the delivery as a whole is reported as a
//! gateway failure once every change has been processed.

use tracing::{error, info, instrument};

use crate::processor::{ChangeProcessor, EntityOutcome};
use crate::{ChangeEvent, DeliveryId, ErrorCategory, StoryId, SyncError, Timestamp};

/// The result of processing one delivery.
#[derive(Debug)]
pub struct BatchReport {
    pub delivery: DeliveryId,
    pub received_at: Timestamp,
    /// Outcomes of the changes that succeeded, in event order.
    pub outcomes: Vec<(StoryId, EntityOutcome)>,
    /// Errors of the changes that failed, in event order.
    pub failures: Vec<(StoryId, SyncError)>,
}

impl BatchReport {
    /// Returns `true` if every change was processed without error.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Category of the first failure, which decides the reported message.
    pub fn first_failure_category(&self) -> Option<ErrorCategory> {
        self.failures.iter().find_map(|(_, err)| err.category())
    }

    /// Number of issues that were actually updated.
    pub fn updated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, EntityOutcome::Updated { .. }))
            .count()
    }
}

/// Runs every change of `event` through `processor`.
#[instrument(skip_all, fields(%delivery, project = %event.project_id(), kind = %event.kind))]
pub async fn process_event(
    processor: &ChangeProcessor<'_>,
    delivery: DeliveryId,
    event: &ChangeEvent,
) -> BatchReport {
    let mut report = BatchReport {
        delivery,
        received_at: Timestamp::now(),
        outcomes: Vec::with_capacity(event.changes.len()),
        failures: Vec::new(),
    };

    for change in &event.changes {
        match processor.process(event.project_id(), change).await {
            Ok(outcome) => report.outcomes.push((change.id, outcome)),
            Err(err) => {
                error!(story = %change.id, error = %err, "Failed to sync story");
                report.failures.push((change.id, err));
            }
        }
    }

    info!(
        received_at = %report.received_at,
        changes = event.changes.len(),
        updated = report.updated_count(),
        failed = report.failures.len(),
        "Processed activity event"
    );
    report
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::processor::SkipReason;
    use crate::testing::{FakeIssues, FakeResolver};
    use crate::{IssueNumber, ProjectId};

    fn two_story_event() -> ChangeEvent {
        serde_json::from_value(json!({
            "kind": "label_create_activity",
            "project": {"id": 2453999},
            "changes": [
                {
                    "kind": "story",
                    "change_type": "update",
                    "id": 176669667,
                    "new_values": {"story_type": "feature"}
                },
                {
                    "kind": "label",
                    "change_type": "create",
                    "id": 555
                },
                {
                    "kind": "story",
                    "change_type": "update",
                    "id": 176669670,
                    "new_values": {"story_type": "bug"}
                }
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn failed_lookup_does_not_block_later_stories() {
        let resolver = FakeResolver::default().fail(176669667).link(176669670, 43);
        let issues = FakeIssues::default().with_issue(43, &["initial-unrelated-label2"]);
        let processor = ChangeProcessor::new(&resolver, &issues, None);

        let report = process_event(&processor, DeliveryId::new_random(), &two_story_event()).await;

        assert!(!report.is_success());
        assert_eq!(report.first_failure_category(), Some(ErrorCategory::Lookup));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, StoryId::new(176669667));

        let updates = issues.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, IssueNumber::new(43));
        assert_eq!(report.updated_count(), 1);
    }

    #[tokio::test]
    async fn stories_are_processed_in_event_order() {
        let resolver = FakeResolver::default();
        let issues = FakeIssues::default();
        let processor = ChangeProcessor::new(&resolver, &issues, None);

        let report = process_event(&processor, DeliveryId::new_random(), &two_story_event()).await;

        let project = ProjectId::new(2453999);
        assert_eq!(
            resolver.calls(),
            vec![
                (project, StoryId::new(176669667)),
                (project, StoryId::new(176669670)),
            ]
        );
        assert!(report.is_success());
        assert_eq!(
            report.outcomes[1],
            (StoryId::new(555), EntityOutcome::Skipped(SkipReason::NotAStory))
        );
    }

    #[tokio::test]
    async fn report_is_stamped_with_the_delivery() {
        let resolver = FakeResolver::default();
        let issues = FakeIssues::default();
        let processor = ChangeProcessor::new(&resolver, &issues, None);
        let delivery = DeliveryId::new_random();

        let before = Timestamp::now();
        let report = process_event(&processor, delivery, &two_story_event()).await;

        assert_eq!(report.delivery, delivery);
        assert!(report.received_at >= before);
        assert!(report.received_at <= Timestamp::now());
    }

    #[tokio::test]
    async fn first_failure_decides_the_category() {
        let resolver = FakeResolver::default().link(176669667, 42).link(176669670, 43);
        let issues = FakeIssues::default().fail_update(42).fail_fetch(43);
        let processor = ChangeProcessor::new(&resolver, &issues, None);

        let report = process_event(&processor, DeliveryId::new_random(), &two_story_event()).await;

        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.first_failure_category(), Some(ErrorCategory::Update));
        assert_eq!(issues.fetches().len(), 2);
    }
}
