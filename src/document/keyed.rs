//! Durable identity of stored entities.
//!
//! Freshly authored entities have no key ([`PartialKeyed`] with `_key`
//! absent). A key is assigned exactly once, when the entity is first
//! accepted, and never changes afterwards ([`Keyed`]). Stored documents
//! additionally carry their [`VersionInfo`] ([`VersionedDocument`]).

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::version::{Status, VersionInfo};
use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::FieldPath;

/// Source of fresh, never reused entity keys.
pub trait KeySource {
    /// A key that has not been handed out before.
    fn next_key(&mut self) -> String;
}

/// Random UUID v4 keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeySource;

impl KeySource for UuidKeySource {
    fn next_key(&mut self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic keys `prefix-1`, `prefix-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialKeySource {
    prefix: String,
    issued: u64,
}

impl SequentialKeySource {
    /// Start a new sequence.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: 0,
        }
    }
}

impl KeySource for SequentialKeySource {
    fn next_key(&mut self) -> String {
        self.issued += 1;
        format!("{}-{}", self.prefix, self.issued)
    }
}

/// Reports entities that still lack a durable key.
pub trait KeyCompleteness {
    /// Append the path of every unkeyed entity below `path`.
    fn collect_unresolved(&self, path: &FieldPath, unresolved: &mut Vec<FieldPath>);

    /// Paths of every unkeyed entity; empty when fully keyed.
    fn unresolved_keys(&self) -> Vec<FieldPath> {
        let mut unresolved = Vec::new();
        self.collect_unresolved(&FieldPath::root(), &mut unresolved);
        unresolved
    }
}

fn decode_key(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<String> {
    payload::non_empty_string(value, path, ctx)
}

/// An entity with a durable key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyed<T> {
    #[serde(rename = "_key")]
    key: String,
    #[serde(flatten)]
    item: T,
}

impl<T> Keyed<T> {
    /// Attach `key` to `item`.
    pub fn new(key: impl Into<String>, item: T) -> Self {
        Self { key: key.into(), item }
    }

    /// The durable key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The keyed entity.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Split into key and entity.
    pub fn into_parts(self) -> (String, T) {
        (self.key, self.item)
    }
}

impl<T> KeyCompleteness for Keyed<T> {
    fn collect_unresolved(&self, _path: &FieldPath, _unresolved: &mut Vec<FieldPath>) {}
}

impl<T: FromPayload> FromPayload for Keyed<T> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let key = payload::required(map, "_key", path, ctx).and_then(|v| decode_key(v, &path.field("_key"), ctx));
        let item = T::from_payload(value, path, ctx);
        Some(Keyed { key: key?, item: item? })
    }
}

/// An entity that may or may not have been keyed yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialKeyed<T> {
    #[serde(rename = "_key", skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(flatten)]
    item: T,
}

impl<T> PartialKeyed<T> {
    /// An entity without a key.
    pub fn unkeyed(item: T) -> Self {
        Self { key: None, item }
    }

    /// An entity that already has `key`.
    pub fn keyed(key: impl Into<String>, item: T) -> Self {
        Self {
            key: Some(key.into()),
            item,
        }
    }

    /// The key, if assigned.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The entity.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Assign a key from `keys` unless one is already present; returns the key.
    pub fn assign_key(&mut self, keys: &mut dyn KeySource) -> &str {
        self.key.get_or_insert_with(|| keys.next_key())
    }

    /// Key the entity, keeping an existing key.
    pub fn into_keyed(mut self, keys: &mut dyn KeySource) -> Keyed<T> {
        self.assign_key(keys);
        let key = self.key.unwrap_or_default();
        Keyed { key, item: self.item }
    }
}

impl<T> KeyCompleteness for PartialKeyed<T> {
    fn collect_unresolved(&self, path: &FieldPath, unresolved: &mut Vec<FieldPath>) {
        if self.key.is_none() {
            unresolved.push(path.clone());
        }
    }
}

impl<T: FromPayload> FromPayload for PartialKeyed<T> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let key = payload::optional_with(map, "_key", path, ctx, decode_key);
        let item = T::from_payload(value, path, ctx);
        Some(PartialKeyed { key: key?, item: item? })
    }
}

/// A stored version of an entity: key, version metadata and content.
///
/// Only drafts hand out mutable access to their content; see
/// [`VersionedDocument::edit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionedDocument<T> {
    #[serde(rename = "_key")]
    pub(crate) key: String,
    #[serde(rename = "versionInfo")]
    pub(crate) version_info: VersionInfo,
    #[serde(flatten)]
    pub(crate) body: T,
}

impl<T> VersionedDocument<T> {
    /// Durable key of this version.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Version metadata.
    pub fn version_info(&self) -> &VersionInfo {
        &self.version_info
    }

    /// Version number.
    pub fn version(&self) -> u32 {
        self.version_info.version
    }

    /// Lifecycle status.
    pub fn status(&self) -> Status {
        self.version_info.status
    }

    /// The content.
    pub fn body(&self) -> &T {
        &self.body
    }

    /// Split into key, version metadata and content.
    pub fn into_parts(self) -> (String, VersionInfo, T) {
        (self.key, self.version_info, self.body)
    }
}

impl<T: KeyCompleteness> KeyCompleteness for VersionedDocument<T> {
    fn collect_unresolved(&self, path: &FieldPath, unresolved: &mut Vec<FieldPath>) {
        self.body.collect_unresolved(path, unresolved);
    }
}

impl<T: FromPayload> FromPayload for VersionedDocument<T> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let key = payload::required(map, "_key", path, ctx).and_then(|v| decode_key(v, &path.field("_key"), ctx));
        let version_info = payload::required(map, "versionInfo", path, ctx)
            .and_then(|v| VersionInfo::from_payload(v, &path.field("versionInfo"), ctx));
        let body = T::from_payload(value, path, ctx);
        Some(VersionedDocument {
            key: key?,
            version_info: version_info?,
            body: body?,
        })
    }
}
