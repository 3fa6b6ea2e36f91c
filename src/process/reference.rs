use serde::Serialize;
use serde_json::Value;

use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::FieldPath;

/// Anything that points at an entry of a document's `references` map.
pub trait ReferenceKey {
    /// Key into the `references` map.
    fn reference_key(&self) -> &str;
}

impl ReferenceKey for String {
    fn reference_key(&self) -> &str {
        self
    }
}

/// A citation of a bibliographic reference, optionally with comments
/// specific to this use of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ReferenceRef {
    /// Plain reference key
    Key(String),
    /// Reference key with comments
    WithComments {
        /// Reference key
        id: String,
        /// Comments on how the reference applies
        comments: Vec<String>,
    },
}

impl ReferenceRef {
    /// Comments attached to this citation; empty for a plain key.
    pub fn comments(&self) -> &[String] {
        match self {
            ReferenceRef::Key(_) => &[],
            ReferenceRef::WithComments { comments, .. } => comments,
        }
    }
}

impl ReferenceKey for ReferenceRef {
    fn reference_key(&self) -> &str {
        match self {
            ReferenceRef::Key(key) => key,
            ReferenceRef::WithComments { id, .. } => id,
        }
    }
}

impl From<&str> for ReferenceRef {
    fn from(key: &str) -> Self {
        ReferenceRef::Key(key.to_string())
    }
}

impl FromPayload for ReferenceRef {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        if value.is_string() {
            return payload::non_empty_string(value, path, ctx).map(ReferenceRef::Key);
        }
        let map = payload::object(value, path, ctx)?;
        let id = payload::required_non_empty(map, "id", path, ctx);
        let comments =
            payload::required(map, "comments", path, ctx).and_then(|v| payload::string_list(v, &path.field("comments"), ctx));
        Some(ReferenceRef::WithComments {
            id: id?,
            comments: comments?,
        })
    }
}
