//! Version state machine.
//!
//! ```text
//! create        ->  draft (version 1)
//! draft         ->  published       publish; the previous publication becomes archived
//! published     ->  retracted       retract
//! published, archived, retracted
//!               ->  new draft       derive_draft (version + 1, source unchanged)
//! ```
//!
//! All transitions are pure: they take the current version by reference and
//! return new records. Persisting them, and serializing concurrent
//! transitions of one document, is left to the storage layer.

use chrono::{DateTime, Utc};
use log::info;

use super::error::{ActionKind, LifecycleError};
use super::keyed::{KeyCompleteness, KeySource, VersionedDocument};
use super::version::{Status, VersionInfo};

fn non_blank(message: Option<&str>) -> Option<&str> {
    message.filter(|m| !m.trim().is_empty())
}

fn require_status<T>(document: &VersionedDocument<T>, status: Status, action: ActionKind) -> Result<(), LifecycleError> {
    if document.status() == status {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition {
            from: document.status(),
            action,
        })
    }
}

impl<T> VersionedDocument<T> {
    /// Mutable access to the content, only granted to drafts.
    pub fn edit(&mut self) -> Result<&mut T, LifecycleError> {
        require_status(self, Status::Draft, ActionKind::Edit)?;
        Ok(&mut self.body)
    }
}

/// Start a new document as draft version 1.
pub fn create<T>(
    body: T,
    keys: &mut dyn KeySource,
    now: DateTime<Utc>,
    commit_message: Option<String>,
) -> VersionedDocument<T> {
    let key = keys.next_key();
    info!("Created draft {} (version 1)", key);
    VersionedDocument {
        key,
        version_info: VersionInfo::draft(1, now, commit_message),
        body,
    }
}

/// Start a new draft from a published, archived or retracted version.
///
/// The draft gets a fresh key and the next version number; `source` itself
/// is not changed.
pub fn derive_draft<T>(
    source: &VersionedDocument<T>,
    body: T,
    keys: &mut dyn KeySource,
    now: DateTime<Utc>,
    commit_message: Option<String>,
) -> Result<VersionedDocument<T>, LifecycleError> {
    if source.status() == Status::Draft {
        return Err(LifecycleError::InvalidTransition {
            from: Status::Draft,
            action: ActionKind::DeriveDraft,
        });
    }

    let version = source
        .version()
        .checked_add(1)
        .ok_or(LifecycleError::VersionOverflow(source.version()))?;
    let key = keys.next_key();
    info!("Derived draft {} (version {}) from {}", key, version, source.key());
    Ok(VersionedDocument {
        key,
        version_info: VersionInfo::draft(version, now, commit_message),
        body,
    })
}

/// Replace the content of a draft in place, keeping key and version.
pub fn update_draft<T>(
    draft: &mut VersionedDocument<T>,
    body: T,
    now: DateTime<Utc>,
    commit_message: Option<String>,
) -> Result<(), LifecycleError> {
    *draft.edit()? = body;
    draft.version_info.created_on = now;
    if commit_message.is_some() {
        draft.version_info.commit_message = commit_message;
    }
    Ok(())
}

/// Outcome of publishing a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication<T> {
    /// The draft, now published
    pub published: VersionedDocument<T>,
    /// The previous publication, now archived
    pub archived: Option<VersionedDocument<T>>,
}

/// Publish `draft`, archiving `previous` if the document had been published
/// before.
///
/// `commit_message` replaces the draft's message when given; one of the two
/// must be non-empty. Every entity in the draft must be keyed.
pub fn publish<T: Clone + KeyCompleteness>(
    draft: &VersionedDocument<T>,
    previous: Option<&VersionedDocument<T>>,
    commit_message: Option<&str>,
) -> Result<Publication<T>, LifecycleError> {
    require_status(draft, Status::Draft, ActionKind::Publish)?;

    if let Some(previous) = previous {
        require_status(previous, Status::Published, ActionKind::Archive)?;
        if previous.version() >= draft.version() {
            return Err(LifecycleError::NotPredecessor {
                previous: previous.version(),
                draft: draft.version(),
            });
        }
    }

    let message = non_blank(commit_message)
        .or_else(|| non_blank(draft.version_info.commit_message.as_deref()))
        .ok_or(LifecycleError::MissingCommitMessage)?
        .to_string();

    let unresolved = draft.body.unresolved_keys();
    if !unresolved.is_empty() {
        return Err(LifecycleError::UnresolvedKeys(
            unresolved.iter().map(ToString::to_string).collect(),
        ));
    }

    let mut published = draft.clone();
    published.version_info.status = Status::Published;
    published.version_info.commit_message = Some(message);

    let archived = previous.map(|previous| {
        let mut archived = previous.clone();
        archived.version_info.status = Status::Archived;
        info!("Archived {} (version {})", archived.key(), archived.version());
        archived
    });

    info!("Published {} (version {})", published.key(), published.version());
    Ok(Publication { published, archived })
}

/// Withdraw a published version.
pub fn retract<T: Clone>(document: &VersionedDocument<T>, retract_message: &str) -> Result<VersionedDocument<T>, LifecycleError> {
    require_status(document, Status::Published, ActionKind::Retract)?;
    let message = non_blank(Some(retract_message)).ok_or(LifecycleError::MissingRetractMessage)?;

    let mut retracted = document.clone();
    retracted.version_info.status = Status::Retracted;
    retracted.version_info.retract_message = Some(message.to_string());
    info!("Retracted {} (version {})", retracted.key(), retracted.version());
    Ok(retracted)
}

/// A lifecycle step together with its arguments.
#[derive(Debug, Clone)]
pub enum Action<T> {
    /// See [`publish`]
    Publish {
        /// Overrides the draft's commit message
        commit_message: Option<String>,
        /// The currently published version, to be archived
        previous: Option<VersionedDocument<T>>,
    },
    /// See [`retract`]
    Retract {
        /// Why the version is withdrawn
        retract_message: String,
    },
    /// See [`derive_draft`]
    DeriveDraft {
        /// Content of the new draft
        body: T,
        /// Message describing the edit
        commit_message: Option<String>,
    },
}

impl<T> Action<T> {
    /// The kind of step.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Publish { .. } => ActionKind::Publish,
            Action::Retract { .. } => ActionKind::Retract,
            Action::DeriveDraft { .. } => ActionKind::DeriveDraft,
        }
    }
}

/// Environment of a transition.
pub struct TransitionContext<'k> {
    /// Timestamp for newly created versions
    pub now: DateTime<Utc>,
    /// Source of keys for newly created versions
    pub keys: &'k mut dyn KeySource,
}

/// Records produced by one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<T> {
    /// The new record for the document the action was applied to, or the
    /// derived draft
    pub document: VersionedDocument<T>,
    /// A version archived as a side effect
    pub archived: Option<VersionedDocument<T>>,
}

/// Apply `action` to `document`.
pub fn transition<T: Clone + KeyCompleteness>(
    document: &VersionedDocument<T>,
    action: Action<T>,
    context: TransitionContext<'_>,
) -> Result<Transition<T>, LifecycleError> {
    match action {
        Action::Publish {
            commit_message,
            previous,
        } => {
            let publication = publish(document, previous.as_ref(), commit_message.as_deref())?;
            Ok(Transition {
                document: publication.published,
                archived: publication.archived,
            })
        }
        Action::Retract { retract_message } => Ok(Transition {
            document: retract(document, &retract_message)?,
            archived: None,
        }),
        Action::DeriveDraft { body, commit_message } => Ok(Transition {
            document: derive_draft(document, body, context.keys, context.now, commit_message)?,
            archived: None,
        }),
    }
}
