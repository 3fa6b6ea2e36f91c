//! # Versioned documents
//!
//! A dataset (an [`LtpSet`]) bundles a header, bibliographic references,
//! states and the processes between them. It passes through several shapes:
//!
//! - [`NewLtpDocument`]: as first uploaded, nothing keyed yet.
//! - [`EditedLtpDocument`]: an update of a stored dataset; the set and the
//!   process infos it carries over keep their keys, new ones have none.
//! - [`LtpDocument`]: as stored, a [`VersionedDocument`] with cached species
//!   renderings and versioned process infos.
//! - [`LtpMixture`]: processes drawn from several stored datasets, each info
//!   listing the sets it belongs to.
//!
//! Stored versions move through the lifecycle described below:
//!
//! ```rust
//! use chrono::Utc;
//! use ltpschema::document::{create, publish, retract, SequentialKeySource, SetHeader, Status};
//!
//! let header = SetHeader {
//!     contributor: String::from("Example Lab"),
//!     name: String::from("Argon"),
//!     published_in: None,
//!     description: String::from("Electron scattering cross sections for argon"),
//!     complete: false,
//! };
//!
//! let mut keys = SequentialKeySource::new("set");
//! let draft = create(header, &mut keys, Utc::now(), None);
//!
//! let publication = publish(&draft, None, Some("Initial upload")).unwrap();
//! assert_eq!(publication.published.status(), Status::Published);
//!
//! let retracted = retract(&publication.published, "Superseded by a corrected set").unwrap();
//! assert_eq!(retracted.status(), Status::Retracted);
//! assert!(retract(&draft, "reason").is_err());
//! ```
//!
//! ## Lifecycle
//!
//! Only drafts can change. Publishing a draft archives the previously
//! published version of the same document; a published version can be
//! retracted; editing a published, archived or retracted version derives a
//! new draft with the next version number and leaves the source untouched.

use log::warn;
use serde::Serialize;
use serde_json::Value;

mod error;
mod header;
mod keyed;
mod lifecycle;
mod ltp;
mod version;

#[cfg(test)]
mod tests;

pub use error::{ActionKind, DocumentError, LifecycleError};
pub use header::{Contributor, Reference, SetHeader};
pub use keyed::{KeyCompleteness, KeySource, Keyed, PartialKeyed, SequentialKeySource, UuidKeySource, VersionedDocument};
pub use lifecycle::{
    create, derive_draft, publish, retract, transition, update_draft, Action, Publication, Transition, TransitionContext,
};
pub use ltp::{
    AuthoredInfo, DraftContent, EditedLtpDocument, LtpBody, LtpDocument, LtpMixture, LtpSet, MixtureInfo,
    NewLtpDocument, SetReferenced, VersionedInfo,
};
pub use version::{Status, VersionInfo};

use crate::config::ValidationConfig;
use crate::relation::{validate_relations, RelationGraph};
use crate::validation::payload::FromPayload;
use crate::validation::{decode, ValidationErrors};

/// Decode `value`, then check the relations of the decoded document.
fn validate_related<T: FromPayload>(
    family: &str,
    value: &Value,
    config: &ValidationConfig,
    graph: impl FnOnce(&T) -> RelationGraph,
) -> Result<T, ValidationErrors> {
    let document: T = decode(family, value, config)?;
    let report = validate_relations(&graph(&document));
    match report.to_validation_errors() {
        None => Ok(document),
        Some(errors) => {
            warn!("Rejected {} with {} relation violation(s)", family, errors.len());
            Err(errors)
        }
    }
}

/// Validate a newly authored dataset with the default [`ValidationConfig`].
pub fn validate_new_document(value: &Value) -> Result<NewLtpDocument, ValidationErrors> {
    validate_new_document_with_config(value, &ValidationConfig::default())
}

/// Validate a newly authored dataset: structure, species and relations.
pub fn validate_new_document_with_config(
    value: &Value,
    config: &ValidationConfig,
) -> Result<NewLtpDocument, ValidationErrors> {
    validate_related("new document", value, config, RelationGraph::from_new_document)
}

/// Validate an edited dataset with the default [`ValidationConfig`].
pub fn validate_edited_document(value: &Value) -> Result<EditedLtpDocument, ValidationErrors> {
    validate_edited_document_with_config(value, &ValidationConfig::default())
}

/// Validate an edited dataset: structure, species and relations.
pub fn validate_edited_document_with_config(
    value: &Value,
    config: &ValidationConfig,
) -> Result<EditedLtpDocument, ValidationErrors> {
    validate_related("edited document", value, config, |document: &EditedLtpDocument| {
        let set = document.item();
        RelationGraph::from_set(document.key().unwrap_or(set.header.name.as_str()), set)
    })
}

/// Validate a stored dataset with the default [`ValidationConfig`].
pub fn validate_document(value: &Value) -> Result<LtpDocument, ValidationErrors> {
    validate_document_with_config(value, &ValidationConfig::default())
}

/// Validate a stored dataset: structure, species, version info and relations.
pub fn validate_document_with_config(value: &Value, config: &ValidationConfig) -> Result<LtpDocument, ValidationErrors> {
    validate_related("document", value, config, RelationGraph::from_document)
}

/// Validate a mixture with the default [`ValidationConfig`].
pub fn validate_mixture(value: &Value) -> Result<LtpMixture, ValidationErrors> {
    validate_mixture_with_config(value, &ValidationConfig::default())
}

/// Validate a mixture: structure, species, set memberships and relations.
pub fn validate_mixture_with_config(value: &Value, config: &ValidationConfig) -> Result<LtpMixture, ValidationErrors> {
    validate_related("mixture", value, config, RelationGraph::from_mixture)
}

/// Parse and validate a newly authored dataset from JSON text.
pub fn new_document_from_json(json: &str) -> Result<NewLtpDocument, DocumentError> {
    let value: Value = serde_json::from_str(json)?;
    Ok(validate_new_document(&value)?)
}

/// Parse and validate a stored dataset from JSON text.
pub fn document_from_json(json: &str) -> Result<LtpDocument, DocumentError> {
    let value: Value = serde_json::from_str(json)?;
    Ok(validate_document(&value)?)
}

/// Parse and validate a mixture from JSON text.
pub fn mixture_from_json(json: &str) -> Result<LtpMixture, DocumentError> {
    let value: Value = serde_json::from_str(json)?;
    Ok(validate_mixture(&value)?)
}

/// Serialize any document shape to pretty-printed JSON.
pub fn to_json<T: Serialize>(document: &T) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(document)?)
}
