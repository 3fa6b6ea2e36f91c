use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::FieldPath;

/// Bibliographic record in CSL-JSON form.
///
/// Only `id`, `type` and `title` are interpreted; every other CSL field is
/// kept as-is for the citation formatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    /// Citation identifier
    pub id: String,
    /// CSL item type, e.g. `article-journal`
    #[serde(rename = "type")]
    pub kind: String,
    /// Title of the work
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Remaining CSL fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FromPayload for Reference {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let id = payload::required_non_empty(map, "id", path, ctx);
        let kind = payload::required_non_empty(map, "type", path, ctx);
        let title = payload::optional_with(map, "title", path, ctx, payload::string);
        let extra = map
            .iter()
            .filter(|(name, _)| !matches!(name.as_str(), "id" | "type" | "title"))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Some(Reference {
            id: id?,
            kind: kind?,
            title: title?,
            extra,
        })
    }
}

/// Organization that contributed a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    /// Organization name
    pub name: String,
    /// About the organization
    pub description: String,
    /// Contact address
    pub contact: String,
    /// How datasets of this contributor should be cited
    pub how_to_reference: String,
}

impl FromPayload for Contributor {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let name = payload::required_non_empty(map, "name", path, ctx);
        let description = payload::required_string(map, "description", path, ctx);
        let contact = payload::required_string(map, "contact", path, ctx);
        let how_to_reference = payload::required_string(map, "howToReference", path, ctx);
        Some(Contributor {
            name: name?,
            description: description?,
            contact: contact?,
            how_to_reference: how_to_reference?,
        })
    }
}

/// Descriptive header of a dataset. Authors name the contributor by
/// organization name; stored sets embed the full [`Contributor`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetHeader<C> {
    /// Contributing organization
    pub contributor: C,
    /// Dataset name
    pub name: String,
    /// Key into `references` of the paper presenting the dataset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_in: Option<String>,
    /// About the dataset
    pub description: String,
    /// Whether the dataset is a complete set for its species
    pub complete: bool,
}

impl<C: FromPayload> FromPayload for SetHeader<C> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let contributor =
            payload::required(map, "contributor", path, ctx).and_then(|v| C::from_payload(v, &path.field("contributor"), ctx));
        let name = payload::required_non_empty(map, "name", path, ctx);
        let published_in = payload::optional_with(map, "publishedIn", path, ctx, payload::non_empty_string);
        let description = payload::required_string(map, "description", path, ctx);
        let complete = payload::required_bool(map, "complete", path, ctx);
        Some(SetHeader {
            contributor: contributor?,
            name: name?,
            published_in: published_in?,
            description: description?,
            complete: complete?,
        })
    }
}
