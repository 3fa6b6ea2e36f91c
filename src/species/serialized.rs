use serde::Serialize;
use serde_json::Value;

use super::summary::StateSummary;
use super::Species;
use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::FieldPath;

/// A species stored together with its rendering at the time it was stored.
///
/// The `serialized` snapshot is never recomputed: reading a stored pair keeps
/// whatever text was written, even if rendering rules have changed since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedSpecies {
    detailed: Species,
    serialized: StateSummary,
}

impl SerializedSpecies {
    /// Render `species` once and store both together.
    pub fn new(species: Species) -> Self {
        let serialized = species.render();
        Self {
            detailed: species,
            serialized,
        }
    }

    /// The structured species.
    pub fn detailed(&self) -> &Species {
        &self.detailed
    }

    /// The cached rendering.
    pub fn serialized(&self) -> &StateSummary {
        &self.serialized
    }

    /// Plain-text form from the cached rendering.
    pub fn summary(&self) -> &str {
        &self.serialized.summary
    }

    /// Returns true if the cached text still matches the current rendering rules.
    pub fn is_current(&self) -> bool {
        self.detailed.render() == self.serialized
    }

    /// Split into the species and its cached rendering.
    pub fn into_parts(self) -> (Species, StateSummary) {
        (self.detailed, self.serialized)
    }
}

impl From<Species> for SerializedSpecies {
    fn from(species: Species) -> Self {
        Self::new(species)
    }
}

fn decode_snapshot(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<StateSummary> {
    match serde_json::from_value::<StateSummary>(value.clone()) {
        Ok(summary) => Some(summary),
        Err(e) => {
            ctx.structural(path, format!("invalid rendering snapshot: {}", e));
            None
        }
    }
}

impl FromPayload for SerializedSpecies {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let detailed = payload::required(map, "detailed", path, ctx)
            .and_then(|v| Species::from_payload(v, &path.field("detailed"), ctx));
        let serialized = payload::required(map, "serialized", path, ctx)
            .and_then(|v| decode_snapshot(v, &path.field("serialized"), ctx));
        Some(SerializedSpecies {
            detailed: detailed?,
            serialized: serialized?,
        })
    }
}
