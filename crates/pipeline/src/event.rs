//! Inbound Tracker activity events.
//!
//! These types mirror the subset of Tracker's activity webhook payload that the
//! relay acts on. They carry no logic beyond field accessors; everything they
//! decide is decided in [`crate::processor`].

use serde::Deserialize;

use crate::{OptionalField, ProjectId, StoryId, SyncError, TrackerUserId};

/// The only entity kind the relay acts on.
pub const STORY_KIND: &str = "story";

/// A Tracker activity notification: one or more changes in one project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeEvent {
    /// Activity kind tag (e.g. `"story_update_activity"`). Informational only.
    pub kind: String,

    /// The project all changes belong to.
    pub project: Project,

    /// Changes in the order Tracker reported them.
    #[serde(default)]
    pub changes: Vec<Change>,
}

impl ChangeEvent {
    /// Parses an activity payload.
    ///
    /// A payload that does not parse is fatal for the whole delivery.
    pub fn from_json(body: &[u8]) -> Result<Self, SyncError> {
        serde_json::from_slice(body).map_err(|e| SyncError::MalformedEvent {
            message: e.to_string(),
        })
    }

    /// Returns the project identifier.
    pub fn project_id(&self) -> ProjectId {
        self.project.id
    }
}

/// The project reference embedded in an activity payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: ProjectId,
}

/// One mutation applied to one Tracker entity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Change {
    /// Entity kind (`"story"`, `"comment"`, `"task"`, ...).
    pub kind: String,

    /// Identifier of the entity in Tracker.
    pub id: StoryId,

    pub change_type: ChangeType,

    #[serde(default)]
    pub original_values: ChangedValues,

    #[serde(default)]
    pub new_values: ChangedValues,
}

impl Change {
    /// Returns `true` if this change concerns a story.
    pub fn is_story(&self) -> bool {
        self.kind == STORY_KIND
    }
}

/// What happened to the entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
    /// Any change type the relay has no special handling for. Treated like an update.
    Other(String),
}

impl From<String> for ChangeType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            _ => Self::Other(value),
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Other(other) => write!(f, "{other}"),
        }
    }
}

/// A snapshot of the story fields mentioned by one change.
///
/// The plain string fields treat an empty string the same as a missing key.
/// `estimate` and `owner_ids` keep the three-state distinction because an
/// explicit `null` means "cleared" for them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChangedValues {
    #[serde(default, rename = "name")]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, rename = "story_type")]
    pub item_type: Option<String>,

    #[serde(default, rename = "current_state")]
    pub lifecycle_state: Option<String>,

    #[serde(default)]
    pub estimate: OptionalField<i64>,

    #[serde(default)]
    pub owner_ids: OptionalField<Vec<TrackerUserId>>,
}

impl ChangedValues {
    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }

    pub fn item_type(&self) -> Option<&str> {
        non_empty(&self.item_type)
    }

    pub fn lifecycle_state(&self) -> Option<&str> {
        non_empty(&self.lifecycle_state)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
