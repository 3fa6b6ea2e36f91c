use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::{ErrorKind, FieldPath};

/// Classification tags of a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[allow(missing_docs)]
pub enum ReactionTypeTag {
    Elastic,
    Effective,
    MomentumTransfer,
    Excitation,
    Electronic,
    Vibrational,
    Rotational,
    Attachment,
    Ionization,
    Dissociative,
}

impl ReactionTypeTag {
    /// Every tag, in declaration order.
    pub const ALL: [ReactionTypeTag; 10] = [
        ReactionTypeTag::Elastic,
        ReactionTypeTag::Effective,
        ReactionTypeTag::MomentumTransfer,
        ReactionTypeTag::Excitation,
        ReactionTypeTag::Electronic,
        ReactionTypeTag::Vibrational,
        ReactionTypeTag::Rotational,
        ReactionTypeTag::Attachment,
        ReactionTypeTag::Ionization,
        ReactionTypeTag::Dissociative,
    ];

    /// Name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionTypeTag::Elastic => "Elastic",
            ReactionTypeTag::Effective => "Effective",
            ReactionTypeTag::MomentumTransfer => "MomentumTransfer",
            ReactionTypeTag::Excitation => "Excitation",
            ReactionTypeTag::Electronic => "Electronic",
            ReactionTypeTag::Vibrational => "Vibrational",
            ReactionTypeTag::Rotational => "Rotational",
            ReactionTypeTag::Attachment => "Attachment",
            ReactionTypeTag::Ionization => "Ionization",
            ReactionTypeTag::Dissociative => "Dissociative",
        }
    }
}

impl fmt::Display for ReactionTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromPayload for ReactionTypeTag {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let name = payload::string(value, path, ctx)?;
        let found = Self::ALL.into_iter().find(|tag| tag.as_str() == name);
        if found.is_none() {
            ctx.push(path, ErrorKind::UnknownVariant, format!("unknown reaction type tag \"{}\"", name));
        }
        found
    }
}

/// How a participant takes part in a reaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Consumed on the left-hand side or produced on the right-hand side
    #[default]
    Ordinary,
    /// Takes part without being consumed
    Catalyst,
    /// Present but not taking part
    Spectator,
}

impl Role {
    /// Returns true for [`Role::Ordinary`].
    pub fn is_ordinary(&self) -> bool {
        *self == Role::Ordinary
    }
}

impl FromPayload for Role {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        match payload::string(value, path, ctx)?.as_str() {
            "ordinary" => Some(Role::Ordinary),
            "catalyst" => Some(Role::Catalyst),
            "spectator" => Some(Role::Spectator),
            other => {
                ctx.structural(
                    path,
                    format!("role must be \"ordinary\", \"catalyst\" or \"spectator\", found \"{}\"", other),
                );
                None
            }
        }
    }
}

/// One side entry of a reaction: `count` copies of `state`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReactionEntry<S> {
    /// Stoichiometric count, at least 1
    pub count: u32,
    /// The participating state, usually a key into the document's states
    pub state: S,
    /// Participation role
    #[serde(default, skip_serializing_if = "Role::is_ordinary")]
    pub role: Role,
}

impl<S> ReactionEntry<S> {
    /// An ordinary participant.
    pub fn new(count: u32, state: S) -> Self {
        Self {
            count,
            state,
            role: Role::Ordinary,
        }
    }
}

impl<S: FromPayload> FromPayload for ReactionEntry<S> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let count_path = path.field("count");
        let count = payload::required(map, "count", path, ctx)
            .and_then(|v| payload::unsigned(v, &count_path, ErrorKind::Structural, ctx))
            .and_then(|count| {
                if count == 0 {
                    ctx.structural(&count_path, "count must be at least 1");
                    None
                } else {
                    Some(count)
                }
            });
        let state = payload::required(map, "state", path, ctx).and_then(|v| S::from_payload(v, &path.field("state"), ctx));
        let role = payload::optional_with(map, "role", path, ctx, Role::from_payload);
        Some(ReactionEntry {
            count: count?,
            state: state?,
            role: role?.unwrap_or_default(),
        })
    }
}

/// A reaction between states of type `S`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction<S> {
    /// Left-hand side
    pub lhs: Vec<ReactionEntry<S>>,
    /// Right-hand side
    pub rhs: Vec<ReactionEntry<S>>,
    /// Whether the reverse reaction is described by the same data
    pub reversible: bool,
    /// Classification tags
    pub type_tags: Vec<ReactionTypeTag>,
}

impl<S> Reaction<S> {
    /// Ordinary participants of the left-hand side.
    pub fn reactants(&self) -> impl Iterator<Item = &ReactionEntry<S>> {
        self.lhs.iter().filter(|entry| entry.role.is_ordinary())
    }

    /// Ordinary participants of the right-hand side.
    pub fn products(&self) -> impl Iterator<Item = &ReactionEntry<S>> {
        self.rhs.iter().filter(|entry| entry.role.is_ordinary())
    }

    /// Every state mentioned on either side, in order, with repeats.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.lhs.iter().chain(&self.rhs).map(|entry| &entry.state)
    }

    /// Convert the state handles, e.g. from local keys to stored keys.
    pub fn map_states<T>(self, mut f: impl FnMut(S) -> T) -> Reaction<T> {
        let mut convert = |entries: Vec<ReactionEntry<S>>| {
            entries
                .into_iter()
                .map(|entry| ReactionEntry {
                    count: entry.count,
                    state: f(entry.state),
                    role: entry.role,
                })
                .collect::<Vec<_>>()
        };
        let lhs = convert(self.lhs);
        let rhs = convert(self.rhs);
        Reaction {
            lhs,
            rhs,
            reversible: self.reversible,
            type_tags: self.type_tags,
        }
    }
}

impl<S: fmt::Display> fmt::Display for Reaction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn side<S: fmt::Display>(entries: &[ReactionEntry<S>]) -> String {
            entries
                .iter()
                .map(|entry| match entry.count {
                    1 => entry.state.to_string(),
                    n => format!("{}{}", n, entry.state),
                })
                .collect::<Vec<_>>()
                .join(" + ")
        }
        let arrow = if self.reversible { "<->" } else { "->" };
        write!(f, "{} {} {}", side(&self.lhs), arrow, side(&self.rhs))
    }
}

impl<S: FromPayload> FromPayload for Reaction<S> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let side = |name: &str, ctx: &mut Context<'_>| {
            let side_path = path.field(name);
            payload::required(map, name, path, ctx)
                .and_then(|v| payload::array(v, &side_path, ctx))
                .and_then(|items| payload::each(items, &side_path, ctx, ReactionEntry::<S>::from_payload))
        };
        let lhs = side("lhs", ctx);
        let rhs = side("rhs", ctx);
        let reversible = payload::required_bool(map, "reversible", path, ctx);
        let tags_path = path.field("typeTags");
        let type_tags = payload::required(map, "typeTags", path, ctx)
            .and_then(|v| payload::array(v, &tags_path, ctx))
            .and_then(|items| payload::each(items, &tags_path, ctx, ReactionTypeTag::from_payload));
        Some(Reaction {
            lhs: lhs?,
            rhs: rhs?,
            reversible: reversible?,
            type_tags: type_tags?,
        })
    }
}
