//! Error types for the story sync domain.
//!
//! [`SyncError`] covers every condition the relay reports. Entity-local
//! failures (lookup, fetch, update) are isolated to one change within a
//! delivery; [`SyncError::MalformedEvent`] is fatal for the whole delivery.
//!
//! [`ServiceError`] is what the port traits in [`crate::ports`] return. Adapter
//! crates convert their own transport errors into it.

use thiserror::Error;

use crate::{IssueNumber, StoryId};

// ---------------------------------------------------------------------------
// Port-level errors
// ---------------------------------------------------------------------------

/// A failed call to an external service.
#[derive(Debug, Error)]
#[error("{service} call failed: {message}")]
pub struct ServiceError {
    /// Short name of the remote service (e.g. `"tracker"`, `"github"`).
    pub service: &'static str,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ServiceError {
    pub fn new(service: &'static str, message: impl std::fmt::Display) -> Self {
        Self {
            service,
            message: message.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error categories
// ---------------------------------------------------------------------------

/// Category of an entity-local failure.
///
/// Each category has a fixed message that is reported to the webhook caller;
/// details stay in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Resolving the issue linked to a story failed.
    Lookup,
    /// Reading the linked issue failed.
    Fetch,
    /// Writing the issue update failed.
    Update,
}

impl ErrorCategory {
    /// The fixed message reported for this category.
    pub fn message(self) -> &'static str {
        match self {
            Self::Lookup => "can't get GitHub issue id from Tracker",
            Self::Fetch => "can't get GitHub issue details from GitHub",
            Self::Update => "can't update GitHub issue via GitHub API",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

/// Errors reported while handling one delivery.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Tracker could not tell which issue the story is linked to.
    #[error("Could not resolve the issue linked to story {story}: {source}")]
    Lookup {
        story: StoryId,
        #[source]
        source: ServiceError,
    },

    /// The linked issue could not be read.
    #[error("Could not read issue #{issue}: {source}")]
    Fetch {
        issue: IssueNumber,
        #[source]
        source: ServiceError,
    },

    /// The issue update was rejected or never arrived.
    #[error("Could not update issue #{issue}: {source}")]
    Update {
        issue: IssueNumber,
        #[source]
        source: ServiceError,
    },

    /// The inbound payload is not a valid activity event.
    ///
    /// Produced before any change is processed.
    #[error("Malformed activity event: {message}")]
    MalformedEvent { message: String },

    /// The relay configuration is invalid.
    ///
    /// Produced at load time; the relay never starts with an invalid config.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl SyncError {
    /// Returns the category of an entity-local failure, `None` otherwise.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Lookup { .. } => Some(ErrorCategory::Lookup),
            Self::Fetch { .. } => Some(ErrorCategory::Fetch),
            Self::Update { .. } => Some(ErrorCategory::Update),
            Self::MalformedEvent { .. } | Self::Configuration { .. } => None,
        }
    }
}
