//! Core domain for story sync.
//!
//! Story sync relays Pivotal Tracker activity to the GitHub issues linked to
//! Tracker stories: labels follow the story's state, type and estimate;
//! assignees follow its owners; title, body and open/closed state follow the
//! story. This crate contains the event model, the label taxonomy, the
//! reconciliation logic and the port traits the infrastructure crates
//! implement. Infrastructure crates never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`StoryId`, `IssueNumber`, etc.) |
//! | [`types`] | Shared value types (`OptionalField`, `LabelSet`, `Timestamp`) |
//! | [`event`] | Inbound activity event model |
//! | [`issue`] | Issue snapshot and PATCH-style mutation request |
//! | [`taxonomy`] | Static label tables per dimension |
//! | [`reconcile`] | Label reconciliation |
//! | [`owners`] | Tracker owner to GitHub login mapping |
//! | [`ports`] | Traits for the Tracker and GitHub services |
//! | [`processor`] | Per-story processing |
//! | [`batch`] | Per-delivery batch driver |
//! | [`errors`] | Error types |

pub mod batch;
pub mod errors;
pub mod event;
pub mod identifiers;
pub mod issue;
pub mod owners;
pub mod ports;
pub mod processor;
pub mod reconcile;
pub mod taxonomy;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use batch::{process_event, BatchReport};
pub use errors::{ErrorCategory, ServiceError, SyncError};
pub use event::{Change, ChangeEvent, ChangeType, ChangedValues, Project};
pub use identifiers::{DeliveryId, GitHubUsername, IssueNumber, ProjectId, StoryId, TrackerUserId};
pub use issue::{IssueSnapshot, IssueState, MutationRequest};
pub use owners::OwnerMapping;
pub use ports::{IssueTracker, LinkedIssueResolver};
pub use processor::{ChangeProcessor, EntityOutcome, SkipReason};
pub use reconcile::{reconcile, Reconciliation, Transition};
pub use taxonomy::{Dimension, LabelTaxonomy};
pub use types::{LabelSet, OptionalField, Timestamp};
