//! Static label taxonomy.
//!
//! Each of the three dimensions maps a Tracker value to the complete set of
//! GitHub labels that should be on a linked issue while the story has that
//! value. The labels are assumed to already exist in the GitHub repository.
//!
//! When a story moves to a new value in a dimension, every label the dimension
//! ever assigns (its *owned* labels) is removed first, and then the labels for
//! the new value are added.

use std::collections::BTreeSet;
use std::sync::LazyLock;

/// The lifecycle state in which a story is finished. Its issue is closed.
pub const ACCEPTED_STATE: &str = "accepted";

/// Labels per story state.
///
/// `planned` only appears with Tracker's manual planning mode and is treated
/// like `unstarted`.
const LIFECYCLE_STATE_LABELS: &[(&str, &[&str])] = &[
    ("unscheduled", &["priority/undecided"]),
    ("unstarted", &["priority/backlog"]),
    ("planned", &["priority/backlog"]),
    ("started", &["priority/backlog", "state/started"]),
    ("finished", &["priority/backlog", "state/finished"]),
    ("delivered", &["priority/backlog", "state/delivered"]),
    ("rejected", &["priority/backlog", "state/rejected"]),
    (ACCEPTED_STATE, &["state/accepted"]),
];

/// Labels per story type. An empty entry only removes the other type labels.
const ITEM_TYPE_LABELS: &[(&str, &[&str])] = &[
    ("feature", &["enhancement"]),
    ("bug", &["bug"]),
    ("chore", &["chore"]),
    ("release", &[]),
];

/// Labels per point estimate (Fibonacci scale).
const ESTIMATE_LABELS: &[(&str, &[&str])] = &[
    ("0", &["estimate/XS"]),
    ("1", &["estimate/S"]),
    ("2", &["estimate/M"]),
    ("3", &["estimate/L"]),
    ("5", &["estimate/XL"]),
    ("8", &["estimate/XXL"]),
];

static TAXONOMY: LazyLock<LabelTaxonomy> = LazyLock::new(|| LabelTaxonomy {
    lifecycle_state: DimensionTable::new(LIFECYCLE_STATE_LABELS),
    item_type: DimensionTable::new(ITEM_TYPE_LABELS),
    estimate: DimensionTable::new(ESTIMATE_LABELS),
});

/// One of the independent classification axes of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    LifecycleState,
    ItemType,
    Estimate,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LifecycleState => write!(f, "lifecycle_state"),
            Self::ItemType => write!(f, "item_type"),
            Self::Estimate => write!(f, "estimate"),
        }
    }
}

#[derive(Debug)]
struct DimensionTable {
    values: &'static [(&'static str, &'static [&'static str])],
    owned: BTreeSet<&'static str>,
}

impl DimensionTable {
    fn new(values: &'static [(&'static str, &'static [&'static str])]) -> Self {
        let owned = values
            .iter()
            .flat_map(|(_, labels)| labels.iter().copied())
            .collect();
        Self { values, owned }
    }

    fn labels_for(&self, value: &str) -> Option<&'static [&'static str]> {
        self.values
            .iter()
            .find(|(key, _)| *key == value)
            .map(|(_, labels)| *labels)
    }
}

/// The process-wide, read-only label taxonomy.
#[derive(Debug)]
pub struct LabelTaxonomy {
    lifecycle_state: DimensionTable,
    item_type: DimensionTable,
    estimate: DimensionTable,
}

impl LabelTaxonomy {
    /// Returns the shared taxonomy. Built on first use, never modified.
    pub fn global() -> &'static LabelTaxonomy {
        &TAXONOMY
    }

    /// Returns the labels to assert for `value`, or `None` if the value is unmapped.
    pub fn labels_for(&self, dimension: Dimension, value: &str) -> Option<&'static [&'static str]> {
        self.table(dimension).labels_for(value)
    }

    /// Returns every label the dimension may assign.
    pub fn owned_labels(&self, dimension: Dimension) -> &BTreeSet<&'static str> {
        &self.table(dimension).owned
    }

    fn table(&self, dimension: Dimension) -> &DimensionTable {
        match dimension {
            Dimension::LifecycleState => &self.lifecycle_state,
            Dimension::ItemType => &self.item_type,
            Dimension::Estimate => &self.estimate,
        }
    }
}
