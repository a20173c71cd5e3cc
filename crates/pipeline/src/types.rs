//! Shared value types for the story sync domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. a [`LabelSet`] never holds the same
//! label twice) and participate in reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Three-state optional fields
// ---------------------------------------------------------------------------

/// A payload field that may be missing, explicitly `null`, or set.
///
/// Tracker distinguishes between a field that is not mentioned in an activity
/// payload (no opinion) and a field that is present with `null` (the value was
/// cleared). The two must never be conflated: an explicit clear triggers a
/// downstream action, absence must not.
///
/// Use with `#[serde(default)]` on the containing field so that a missing key
/// becomes [`OptionalField::Absent`]; a JSON `null` deserialises to
/// [`OptionalField::ExplicitNull`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OptionalField<T> {
    /// The field did not appear in the payload.
    #[default]
    Absent,
    /// The field appeared with the value `null`.
    ExplicitNull,
    /// The field appeared with a concrete value.
    Value(T),
}

impl<T> OptionalField<T> {
    /// Returns `true` if the field appeared in the payload, `null` or not.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Returns the concrete value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Absent | Self::ExplicitNull => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for OptionalField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only called when the key is present; a missing key goes through Default.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Self::Value(v),
            None => Self::ExplicitNull,
        })
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// An insertion-ordered set of GitHub label names.
///
/// Membership is what matters for reconciliation; the order is kept only so
/// the labels written back to GitHub stay stable (existing labels first, in
/// the order GitHub reported them, then newly added ones).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    /// Creates an empty [`LabelSet`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `label` is a member.
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    /// Appends `label` unless it is already a member. Returns `true` if added.
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.contains(&label) {
            return false;
        }
        self.0.push(label);
        true
    }

    /// Keeps only the labels for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|l| keep(l));
    }

    /// Returns `true` if both sets have exactly the same members, ignoring order.
    pub fn same_members(&self, other: &LabelSet) -> bool {
        self.len() == other.len() && self.iter().all(|l| other.contains(l))
    }

    /// Iterates over the labels in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no labels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

impl std::fmt::Display for LabelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// When a delivery was received, in UTC. Rendered as RFC 3339 in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
