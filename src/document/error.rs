use std::fmt;

use super::version::Status;
use crate::validation::ValidationErrors;

/// Lifecycle step requested of a stored version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Draft to published
    Publish,
    /// Published to archived, as a side effect of publishing its successor
    Archive,
    /// Published to retracted
    Retract,
    /// New draft based on this version
    DeriveDraft,
    /// Change the content of a draft
    Edit,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Publish => "publish",
            ActionKind::Archive => "archive",
            ActionKind::Retract => "retract",
            ActionKind::DeriveDraft => "derive a draft from",
            ActionKind::Edit => "edit",
        };
        f.write_str(name)
    }
}

/// Errors from lifecycle transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The transition is not allowed from the current status
    #[error("Cannot {action} a {from} version")]
    InvalidTransition {
        /// Status of the version the transition was applied to
        from: Status,
        /// The requested transition
        action: ActionKind,
    },

    /// Publishing requires a non-empty commit message
    #[error("Publishing requires a commit message")]
    MissingCommitMessage,

    /// Retracting requires a non-empty retract message
    #[error("Retracting requires a retract message")]
    MissingRetractMessage,

    /// Entities without durable keys, by field path
    #[error("Cannot publish while entities lack keys: {}", .0.join(", "))]
    UnresolvedKeys(Vec<String>),

    /// The version passed as the current publication does not precede the draft
    #[error("Version {previous} cannot be superseded by draft version {draft}")]
    NotPredecessor {
        /// Version number of the published version
        previous: u32,
        /// Version number of the draft
        draft: u32,
    },

    /// The source already carries the largest representable version number
    #[error("Version {0} has no successor")]
    VersionOverflow(u32),
}

/// Errors from the JSON convenience functions
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Input is not JSON, or output could not be serialized
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Input is JSON but not a valid document
    #[error("Invalid document: {0}")]
    ValidationError(#[from] ValidationErrors),
}
