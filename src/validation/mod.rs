//! # Field-level validation errors
//!
//! Every `validate_*` entry point in this crate walks a loosely-typed
//! [`serde_json::Value`] payload and either produces a strongly-typed value or
//! the complete list of problems it found. Errors are never raised for
//! well-formed-but-invalid input: they are collected, each tagged with the
//! [`FieldPath`] of the offending field and an [`ErrorKind`] from the error
//! taxonomy, and returned together as [`ValidationErrors`].

use std::fmt;

use log::{debug, warn};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::config::ValidationConfig;
use payload::{Context, FromPayload};

pub(crate) mod payload;

#[cfg(test)]
mod tests;

/// A single step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Named object member
    Field(String),
    /// Array position
    Index(usize),
}

/// Location of a field inside a payload, e.g. `electronic.config.core.term.S`
/// or `processes[2].info[0].data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The payload root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of the member `name` below this path.
    pub fn field(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.to_string()));
        Self(segments)
    }

    /// Path of the array element `index` below this path.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Returns true for the payload root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The individual segments of this path.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }

        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if position == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Payload does not match any declared shape (missing field, wrong JSON type)
    #[serde(rename = "StructuralError")]
    Structural,
    /// The `type` tag names no declared species family
    UnknownVariant,
    /// Element, count or charge rules violated
    #[serde(rename = "CompositionError")]
    Composition,
    /// A component-level quantum number constraint is violated
    #[serde(rename = "QuantumNumberError")]
    QuantumNumber,
    /// No data shape matched a process data payload
    AmbiguousOrInvalidData,
    /// Dangling or cyclic relation between entities
    #[serde(rename = "ReferentialIntegrityError")]
    ReferentialIntegrity,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Structural => "StructuralError",
            ErrorKind::UnknownVariant => "UnknownVariant",
            ErrorKind::Composition => "CompositionError",
            ErrorKind::QuantumNumber => "QuantumNumberError",
            ErrorKind::AmbiguousOrInvalidData => "AmbiguousOrInvalidData",
            ErrorKind::ReferentialIntegrity => "ReferentialIntegrityError",
        };
        f.write_str(name)
    }
}

/// One violated constraint, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Location of the offending field
    pub path: FieldPath,
    /// Failure category
    pub kind: ErrorKind,
    /// Human-readable explanation, surfaced verbatim to authors
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(path: FieldPath, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.path, self.message)
    }
}

/// The exhaustive list of problems found in one payload. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("validation failed with {} error(s): {}", .0.len(), render_list(.0))]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

fn render_list(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Wrap a list of errors; returns `None` when the list is empty.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the collected errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Returns true if any error has the given kind.
    pub fn contains_kind(&self, kind: ErrorKind) -> bool {
        self.0.iter().any(|e| e.kind == kind)
    }

    /// Borrow the errors as a slice.
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    /// Unwrap into the underlying list.
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Decode `value` as `T`, logging the outcome under the entity `family` name.
pub(crate) fn decode<T: FromPayload>(family: &str, value: &Value, config: &ValidationConfig) -> Result<T, ValidationErrors> {
    debug!("Validating {} payload", family);
    let mut ctx = Context::new(config);
    let decoded = T::from_payload(value, &FieldPath::root(), &mut ctx);
    let result = ctx.finish(decoded);
    if let Err(errors) = &result {
        warn!("Rejected {} payload with {} error(s)", family, errors.len());
    }
    result
}
