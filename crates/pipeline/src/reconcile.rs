//! Label reconciliation.
//!
//! Given the labels currently on an issue and the dimension values a story
//! moved to, computes the label set the issue should carry. Labels that no
//! dimension owns are never touched.

use tracing::warn;

use crate::taxonomy::{Dimension, LabelTaxonomy};
use crate::LabelSet;

/// A story moving to a new value in one dimension.
///
/// `value` is `None` when the dimension was explicitly cleared (an
/// unestimated story): the owned labels are stripped and nothing is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub dimension: Dimension,
    pub value: Option<String>,
}

impl Transition {
    pub fn to(dimension: Dimension, value: impl Into<String>) -> Self {
        Self {
            dimension,
            value: Some(value.into()),
        }
    }

    pub fn cleared(dimension: Dimension) -> Self {
        Self {
            dimension,
            value: None,
        }
    }
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub labels: LabelSet,
    /// `true` iff `labels` differs from the input as a set.
    pub changed: bool,
}

/// Applies `transitions` in order to `current` using the global taxonomy.
pub fn reconcile(current: &LabelSet, transitions: &[Transition]) -> Reconciliation {
    LabelTaxonomy::global().reconcile(current, transitions)
}

impl LabelTaxonomy {
    /// Applies `transitions` in order to `current`.
    ///
    /// For each transition every label owned by its dimension is removed, then
    /// the labels mapped to the new value are appended. An unmapped value
    /// strips without replacing. If a dimension appears twice the last one wins.
    pub fn reconcile(&self, current: &LabelSet, transitions: &[Transition]) -> Reconciliation {
        let mut labels = current.clone();

        for transition in transitions {
            let owned = self.owned_labels(transition.dimension);
            labels.retain(|label| !owned.contains(label));

            let Some(value) = transition.value.as_deref() else {
                continue;
            };
            match self.labels_for(transition.dimension, value) {
                Some(add) => {
                    for label in add {
                        labels.insert(*label);
                    }
                }
                None => warn!(
                    dimension = %transition.dimension,
                    value,
                    "No labels mapped for value; stripped the dimension's labels without replacement"
                ),
            }
        }

        let changed = !labels.same_members(current);
        Reconciliation { labels, changed }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn set(labels: &[&str]) -> LabelSet {
        labels.iter().copied().collect()
    }

    #[test]
    fn new_story_gets_state_and_type_labels() {
        let result = reconcile(
            &set(&["initial-unrelated-label"]),
            &[
                Transition::to(Dimension::LifecycleState, "unscheduled"),
                Transition::to(Dimension::ItemType, "feature"),
            ],
        );
        assert!(result.changed);
        assert_eq!(
            result.labels,
            set(&["initial-unrelated-label", "priority/undecided", "enhancement"])
        );
    }

    #[test]
    fn type_change_replaces_only_the_type_label() {
        let result = reconcile(
            &set(&["initial-unrelated-label", "enhancement", "priority/backlog"]),
            &[Transition::to(Dimension::ItemType, "bug")],
        );
        assert!(result.changed);
        assert_eq!(
            result.labels,
            set(&["initial-unrelated-label", "priority/backlog", "bug"])
        );
    }

    #[test]
    fn accepting_drops_backlog_and_progress_labels() {
        let result = reconcile(
            &set(&["x", "enhancement", "priority/backlog", "estimate/XXL", "state/delivered"]),
            &[Transition::to(Dimension::LifecycleState, "accepted")],
        );
        assert_eq!(result.labels, set(&["x", "enhancement", "estimate/XXL", "state/accepted"]));
    }

    #[test]
    fn target_already_present_is_unchanged() {
        let current = set(&["initial-unrelated-label", "estimate/XXL", "enhancement", "priority/backlog"]);
        let result = reconcile(&current, &[Transition::to(Dimension::Estimate, "8")]);
        assert!(!result.changed);
        assert!(result.labels.same_members(&current));
    }

    #[test]
    fn cleared_estimate_strips_all_estimate_labels() {
        let result = reconcile(
            &set(&["estimate/XS", "estimate/XXL", "bug"]),
            &[Transition::cleared(Dimension::Estimate)],
        );
        assert!(result.changed);
        assert_eq!(result.labels, set(&["bug"]));
    }

    #[test]
    fn unmapped_value_strips_without_replacement() {
        let result = reconcile(
            &set(&["priority/backlog", "state/started", "chore"]),
            &[Transition::to(Dimension::LifecycleState, "archived")],
        );
        assert!(result.changed);
        assert_eq!(result.labels, set(&["chore"]));
    }

    #[test]
    fn no_transitions_is_a_no_op() {
        let current = set(&["a", "b"]);
        let result = reconcile(&current, &[]);
        assert!(!result.changed);
        assert_eq!(result.labels, current);
    }

    #[test]
    fn second_pass_with_no_transitions_is_stable() {
        let transitions = [
            Transition::to(Dimension::LifecycleState, "started"),
            Transition::to(Dimension::Estimate, "3"),
        ];
        let first = reconcile(&set(&["priority/undecided", "unrelated"]), &transitions);
        let second = reconcile(&first.labels, &[]);
        assert!(!second.changed);
        assert_eq!(second.labels, first.labels);
    }

    #[test]
    fn repeating_a_transition_is_idempotent() {
        let current = set(&["priority/undecided", "enhancement", "estimate/S"]);
        let once = reconcile(&current, &[Transition::to(Dimension::LifecycleState, "finished")]);
        let twice = reconcile(
            &current,
            &[
                Transition::to(Dimension::LifecycleState, "finished"),
                Transition::to(Dimension::LifecycleState, "finished"),
            ],
        );
        assert_eq!(once, twice);

        let again = reconcile(&once.labels, &[Transition::to(Dimension::LifecycleState, "finished")]);
        assert!(!again.changed);
    }

    #[test]
    fn last_transition_for_a_dimension_wins() {
        let result = reconcile(
            &LabelSet::new(),
            &[
                Transition::to(Dimension::ItemType, "feature"),
                Transition::to(Dimension::ItemType, "chore"),
            ],
        );
        assert_eq!(result.labels, set(&["chore"]));
    }
}
