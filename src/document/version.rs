use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::{ErrorKind, FieldPath};

/// Position of a version in the document lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Being authored; the only mutable state
    Draft,
    /// The current public version
    Published,
    /// A public version superseded by a newer one
    Archived,
    /// Withdrawn from public use
    Retracted,
}

impl Status {
    /// Name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Published => "published",
            Status::Archived => "archived",
            Status::Retracted => "retracted",
        }
    }

    /// Archived and retracted versions never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Archived | Status::Retracted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromPayload for Status {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        match payload::string(value, path, ctx)?.as_str() {
            "draft" => Some(Status::Draft),
            "published" => Some(Status::Published),
            "archived" => Some(Status::Archived),
            "retracted" => Some(Status::Retracted),
            other => {
                ctx.push(path, ErrorKind::UnknownVariant, format!("unknown status \"{}\"", other));
                None
            }
        }
    }
}

/// Version metadata of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// Starts at 1 and increases by one per derived draft
    pub version: u32,
    /// When this version was created or last edited as a draft
    pub created_on: DateTime<Utc>,
    /// Lifecycle status
    pub status: Status,
    /// What changed since the previous version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    /// Why the version was retracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retract_message: Option<String>,
}

impl VersionInfo {
    /// Version info of a fresh draft.
    pub fn draft(version: u32, created_on: DateTime<Utc>, commit_message: Option<String>) -> Self {
        Self {
            version,
            created_on,
            status: Status::Draft,
            commit_message,
            retract_message: None,
        }
    }
}

fn decode_timestamp(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<DateTime<Utc>> {
    let text = payload::string(value, path, ctx)?;
    match DateTime::parse_from_rfc3339(&text) {
        Ok(timestamp) => Some(timestamp.with_timezone(&Utc)),
        Err(e) => {
            ctx.structural(path, format!("expected RFC 3339 timestamp: {}", e));
            None
        }
    }
}

impl FromPayload for VersionInfo {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let version_path = path.field("version");
        let version = payload::required(map, "version", path, ctx)
            .and_then(|v| payload::unsigned(v, &version_path, ErrorKind::Structural, ctx))
            .and_then(|version| {
                if version == 0 {
                    ctx.structural(&version_path, "version must be at least 1");
                    None
                } else {
                    Some(version)
                }
            });
        let created_on =
            payload::required(map, "createdOn", path, ctx).and_then(|v| decode_timestamp(v, &path.field("createdOn"), ctx));
        let status = payload::required(map, "status", path, ctx).and_then(|v| Status::from_payload(v, &path.field("status"), ctx));
        let commit_message = payload::optional_with(map, "commitMessage", path, ctx, payload::non_empty_string);
        let retract_message = payload::optional_with(map, "retractMessage", path, ctx, payload::non_empty_string);
        Some(VersionInfo {
            version: version?,
            created_on: created_on?,
            status: status?,
            commit_message: commit_message?,
            retract_message: retract_message?,
        })
    }
}
