//! # Species taxonomy
//!
//! Every chemical entity that can take part in a process is a [`Species`]:
//! a tagged union over particle, atom and molecule families. Each variant
//! carries a [`Composition`] (or a particle token), an integer charge and the
//! quantum-state components its family requires.
//!
//! ## Validation
//!
//! [`validate_species`] walks a loosely-typed JSON payload and returns either
//! a strongly-typed species or every problem found, each tagged with the
//! field path it concerns:
//!
//! ```rust
//! use ltpschema::species::validate_species;
//! use serde_json::json;
//!
//! let helium = validate_species(&json!({
//!     "type": "AtomLS",
//!     "composition": [["He", 1]],
//!     "charge": 0,
//!     "electronic": { "config": [], "term": { "L": 0, "S": 0, "P": 1, "J": 0 } }
//! }))
//! .unwrap();
//!
//! assert_eq!(helium.render().summary, "He{^1S_0}");
//! ```
//!
//! ## Rendering
//!
//! [`Species::render`] produces the canonical plain-text and LaTeX forms
//! (composition, then electronic, vibrational and rotational components).
//! Rendering is pure, so the result can be cached in a [`SerializedSpecies`].

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

pub mod atom;
pub mod composition;
pub mod element;
pub mod molecule;
pub mod quantum;
mod serialized;
pub mod summary;


pub use atom::{
    AtomicElectronic, J1l2Descriptor, Ls1Descriptor, LsDescriptor, LsTerm, LsjDescriptor, LsjTerm,
    TwoTermDescriptor,
};
pub use composition::{charge_latex, charge_summary, Composition, Constituent, TriatomShape};
pub use element::{Element, ParseElementError};
pub use molecule::{
    HeteronuclearDiatomElectronic, HomonuclearDiatomElectronic, LinearTriatomElectronic,
    TriatomC2vElectronic,
};
pub use quantum::{HalfInteger, Parity, MAX_ANGULAR_MOMENTUM};
pub use serialized::SerializedSpecies;
pub use summary::{Component, ComponentSummaries, ComponentSummary, StateSummary, SummarizedComponent};

use crate::config::ValidationConfig;
use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::{ErrorKind, FieldPath, ValidationErrors};

// =============================================================================
// Variant table
// =============================================================================

/// Broad classification of a species variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpeciesFamily {
    /// Electrons and other elementary particles
    Particle,
    /// Any composition without state detail
    Unspecified,
    /// Single atoms and atomic ions
    Atom,
    /// Diatomic and triatomic molecules
    Molecule,
}

/// Wire tag of a species variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpeciesType {
    /// The electron
    Electron,
    /// Another elementary particle, e.g. a photon or proton
    SimpleParticle,
    /// Arbitrary composition without electronic structure
    Unspecified,
    /// Atom with a free-text electronic label
    AtomUnspecified,
    /// Atom with an LS term without J
    AtomLSUncoupled,
    /// Atom with an LS term including J
    AtomLS,
    /// Atom in LS1 (LK) coupling
    AtomLS1,
    /// Atom in J1L2 (jK) coupling
    AtomJ1L2,
    /// Atom with a core LS term and an excited shell, LS term
    AtomLSTwoTerm,
    /// Atom with a core LS term and an excited shell, LSJ term
    AtomLSJTwoTerm,
    /// Diatomic molecule of one element
    HomonuclearDiatom,
    /// Diatomic molecule of two distinct elements
    HeteronuclearDiatom,
    /// Linear triatomic molecule with an inversion centre, e.g. CO2
    LinearTriatomInversionCenter,
    /// Bent triatomic molecule of C2v symmetry, e.g. H2O
    TriatomC2v,
}

struct SpeciesTypeEntry {
    species_type: SpeciesType,
    tag: &'static str,
    family: SpeciesFamily,
}

const fn entry(species_type: SpeciesType, tag: &'static str, family: SpeciesFamily) -> SpeciesTypeEntry {
    SpeciesTypeEntry {
        species_type,
        tag,
        family,
    }
}

/// Indexed by `SpeciesType as usize`.
static SPECIES_TYPES: [SpeciesTypeEntry; 14] = [
    entry(SpeciesType::Electron, "Electron", SpeciesFamily::Particle),
    entry(SpeciesType::SimpleParticle, "SimpleParticle", SpeciesFamily::Particle),
    entry(SpeciesType::Unspecified, "Unspecified", SpeciesFamily::Unspecified),
    entry(SpeciesType::AtomUnspecified, "AtomUnspecified", SpeciesFamily::Atom),
    entry(SpeciesType::AtomLSUncoupled, "AtomLSUncoupled", SpeciesFamily::Atom),
    entry(SpeciesType::AtomLS, "AtomLS", SpeciesFamily::Atom),
    entry(SpeciesType::AtomLS1, "AtomLS1", SpeciesFamily::Atom),
    entry(SpeciesType::AtomJ1L2, "AtomJ1L2", SpeciesFamily::Atom),
    entry(SpeciesType::AtomLSTwoTerm, "AtomLSTwoTerm", SpeciesFamily::Atom),
    entry(SpeciesType::AtomLSJTwoTerm, "AtomLSJTwoTerm", SpeciesFamily::Atom),
    entry(SpeciesType::HomonuclearDiatom, "HomonuclearDiatom", SpeciesFamily::Molecule),
    entry(SpeciesType::HeteronuclearDiatom, "HeteronuclearDiatom", SpeciesFamily::Molecule),
    entry(
        SpeciesType::LinearTriatomInversionCenter,
        "LinearTriatomInversionCenter",
        SpeciesFamily::Molecule,
    ),
    entry(SpeciesType::TriatomC2v, "TriatomC2v", SpeciesFamily::Molecule),
];

impl SpeciesType {
    /// Every variant, in table order.
    pub fn all() -> impl Iterator<Item = SpeciesType> {
        SPECIES_TYPES.iter().map(|e| e.species_type)
    }

    fn entry(self) -> &'static SpeciesTypeEntry {
        &SPECIES_TYPES[self as usize]
    }

    /// The `type` tag used on the wire.
    pub fn as_str(self) -> &'static str {
        self.entry().tag
    }

    /// The family this variant belongs to.
    pub fn family(self) -> SpeciesFamily {
        self.entry().family
    }

    /// Look up a wire tag; tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        SPECIES_TYPES.iter().find(|e| e.tag == tag).map(|e| e.species_type)
    }
}

impl fmt::Display for SpeciesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeciesType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| format!("unknown species type \"{}\"", s))
    }
}

// =============================================================================
// Variant bodies
// =============================================================================

/// The electron: composition `"e"`, charge -1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Electron;

impl Serialize for Electron {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Electron", 2)?;
        state.serialize_field("composition", "e")?;
        state.serialize_field("charge", &-1)?;
        state.end()
    }
}

/// A particle identified by a token such as `p` or `photon`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SimpleParticle {
    /// Particle token
    pub composition: String,
    /// Charge in elementary charges
    pub charge: i32,
}

/// Any composition, optionally with a free-text electronic label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnspecifiedSpecies {
    /// Element breakdown, may be nested
    pub composition: Composition,
    /// Charge in elementary charges
    pub charge: i32,
    /// Free-text electronic label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electronic: Option<String>,
}

/// An atom or atomic ion with electronic slot `E`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Atom<E> {
    /// Always a single `(element, 1)` pair
    pub composition: Composition,
    /// Charge in elementary charges
    pub charge: i32,
    /// Electronic state(s)
    pub electronic: E,
}

/// A molecule or molecular ion with electronic slot `E`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Molecule<E> {
    /// Element breakdown matching the variant's shape
    pub composition: Composition,
    /// Charge in elementary charges
    pub charge: i32,
    /// Electronic state(s), with nested vibrational and rotational detail
    pub electronic: E,
}

/// A validated species, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
#[allow(missing_docs)]
pub enum Species {
    Electron(Electron),
    SimpleParticle(SimpleParticle),
    Unspecified(UnspecifiedSpecies),
    AtomUnspecified(Atom<String>),
    AtomLSUncoupled(Atom<AtomicElectronic<LsDescriptor>>),
    AtomLS(Atom<AtomicElectronic<LsjDescriptor>>),
    AtomLS1(Atom<AtomicElectronic<Ls1Descriptor>>),
    AtomJ1L2(Atom<AtomicElectronic<J1l2Descriptor>>),
    AtomLSTwoTerm(Atom<AtomicElectronic<TwoTermDescriptor<LsTerm>>>),
    AtomLSJTwoTerm(Atom<AtomicElectronic<TwoTermDescriptor<LsjTerm>>>),
    HomonuclearDiatom(Molecule<HomonuclearDiatomElectronic>),
    HeteronuclearDiatom(Molecule<HeteronuclearDiatomElectronic>),
    LinearTriatomInversionCenter(Molecule<LinearTriatomElectronic>),
    TriatomC2v(Molecule<TriatomC2vElectronic>),
}

fn free_text(label: &str) -> ComponentSummaries {
    ComponentSummaries::Singular(ComponentSummary::new(label, format!("\\mathrm{{{}}}", label)))
}

impl Species {
    /// The variant tag.
    pub fn species_type(&self) -> SpeciesType {
        match self {
            Species::Electron(_) => SpeciesType::Electron,
            Species::SimpleParticle(_) => SpeciesType::SimpleParticle,
            Species::Unspecified(_) => SpeciesType::Unspecified,
            Species::AtomUnspecified(_) => SpeciesType::AtomUnspecified,
            Species::AtomLSUncoupled(_) => SpeciesType::AtomLSUncoupled,
            Species::AtomLS(_) => SpeciesType::AtomLS,
            Species::AtomLS1(_) => SpeciesType::AtomLS1,
            Species::AtomJ1L2(_) => SpeciesType::AtomJ1L2,
            Species::AtomLSTwoTerm(_) => SpeciesType::AtomLSTwoTerm,
            Species::AtomLSJTwoTerm(_) => SpeciesType::AtomLSJTwoTerm,
            Species::HomonuclearDiatom(_) => SpeciesType::HomonuclearDiatom,
            Species::HeteronuclearDiatom(_) => SpeciesType::HeteronuclearDiatom,
            Species::LinearTriatomInversionCenter(_) => SpeciesType::LinearTriatomInversionCenter,
            Species::TriatomC2v(_) => SpeciesType::TriatomC2v,
        }
    }

    /// Charge in elementary charges.
    pub fn charge(&self) -> i32 {
        match self {
            Species::Electron(_) => -1,
            Species::SimpleParticle(p) => p.charge,
            Species::Unspecified(u) => u.charge,
            Species::AtomUnspecified(a) => a.charge,
            Species::AtomLSUncoupled(a) => a.charge,
            Species::AtomLS(a) => a.charge,
            Species::AtomLS1(a) => a.charge,
            Species::AtomJ1L2(a) => a.charge,
            Species::AtomLSTwoTerm(a) => a.charge,
            Species::AtomLSJTwoTerm(a) => a.charge,
            Species::HomonuclearDiatom(m) => m.charge,
            Species::HeteronuclearDiatom(m) => m.charge,
            Species::LinearTriatomInversionCenter(m) => m.charge,
            Species::TriatomC2v(m) => m.charge,
        }
    }

    /// Element breakdown; `None` for particles.
    pub fn composition(&self) -> Option<&Composition> {
        match self {
            Species::Electron(_) | Species::SimpleParticle(_) => None,
            Species::Unspecified(u) => Some(&u.composition),
            Species::AtomUnspecified(a) => Some(&a.composition),
            Species::AtomLSUncoupled(a) => Some(&a.composition),
            Species::AtomLS(a) => Some(&a.composition),
            Species::AtomLS1(a) => Some(&a.composition),
            Species::AtomJ1L2(a) => Some(&a.composition),
            Species::AtomLSTwoTerm(a) => Some(&a.composition),
            Species::AtomLSJTwoTerm(a) => Some(&a.composition),
            Species::HomonuclearDiatom(m) => Some(&m.composition),
            Species::HeteronuclearDiatom(m) => Some(&m.composition),
            Species::LinearTriatomInversionCenter(m) => Some(&m.composition),
            Species::TriatomC2v(m) => Some(&m.composition),
        }
    }

    /// Distinct elements in order of first appearance; empty for particles.
    pub fn unique_elements(&self) -> Vec<Element> {
        self.composition().map(Composition::unique_elements).unwrap_or_default()
    }

    /// Rendering of composition and charge alone, e.g. `P^+`.
    pub fn composition_summary(&self) -> SummarizedComponent {
        let charge = self.charge();
        match self {
            Species::Electron(_) => SummarizedComponent {
                summary: format!("e{}", charge_summary(charge)),
                latex: format!("\\mathrm{{e}}{}", charge_latex(charge)),
            },
            Species::SimpleParticle(p) => SummarizedComponent {
                summary: format!("{}{}", p.composition, charge_summary(charge)),
                latex: format!("\\mathrm{{{}}}{}", p.composition, charge_latex(charge)),
            },
            other => match other.composition() {
                Some(composition) => SummarizedComponent {
                    summary: composition.summary(charge),
                    latex: composition.latex(charge),
                },
                None => SummarizedComponent {
                    summary: charge_summary(charge),
                    latex: charge_latex(charge),
                },
            },
        }
    }

    /// Rendering of the electronic slot and everything nested below it.
    pub fn electronic_summaries(&self) -> Option<ComponentSummaries> {
        match self {
            Species::Electron(_) | Species::SimpleParticle(_) => None,
            Species::Unspecified(u) => u.electronic.as_deref().map(free_text),
            Species::AtomUnspecified(a) => Some(free_text(&a.electronic)),
            Species::AtomLSUncoupled(a) => Some(a.electronic.summaries()),
            Species::AtomLS(a) => Some(a.electronic.summaries()),
            Species::AtomLS1(a) => Some(a.electronic.summaries()),
            Species::AtomJ1L2(a) => Some(a.electronic.summaries()),
            Species::AtomLSTwoTerm(a) => Some(a.electronic.summaries()),
            Species::AtomLSJTwoTerm(a) => Some(a.electronic.summaries()),
            Species::HomonuclearDiatom(m) => Some(m.electronic.summaries()),
            Species::HeteronuclearDiatom(m) => Some(m.electronic.summaries()),
            Species::LinearTriatomInversionCenter(m) => Some(m.electronic.summaries()),
            Species::TriatomC2v(m) => Some(m.electronic.summaries()),
        }
    }

    /// Canonical plain-text and LaTeX rendering.
    pub fn render(&self) -> StateSummary {
        StateSummary::assemble(self.composition_summary(), self.electronic_summaries())
    }
}

/// Render a species; see [`Species::render`].
pub fn render(species: &Species) -> StateSummary {
    species.render()
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render().summary)
    }
}

// =============================================================================
// Decoding
// =============================================================================

fn decode_charge(map: &Map<String, Value>, path: &FieldPath, ctx: &mut Context<'_>) -> Option<i32> {
    let field = path.field("charge");
    let charge = payload::required(map, "charge", path, ctx).and_then(|v| payload::integer(v, &field, ctx))?;
    match i32::try_from(charge) {
        Ok(charge) => Some(charge),
        Err(_) => {
            ctx.push(&field, ErrorKind::Composition, format!("charge {} is out of range", charge));
            None
        }
    }
}

/// Decode `composition` and apply the family's shape rule to it.
fn decode_composition<T>(
    map: &Map<String, Value>,
    path: &FieldPath,
    ctx: &mut Context<'_>,
    shape: impl FnOnce(&Composition) -> Result<T, String>,
) -> Option<Composition> {
    let field = path.field("composition");
    let composition =
        payload::required(map, "composition", path, ctx).and_then(|v| Composition::from_payload(v, &field, ctx))?;
    match shape(&composition) {
        Ok(_) => Some(composition),
        Err(message) => {
            ctx.push(&field, ErrorKind::Composition, message);
            None
        }
    }
}

fn decode_electronic<E: FromPayload>(map: &Map<String, Value>, path: &FieldPath, ctx: &mut Context<'_>) -> Option<E> {
    payload::required(map, "electronic", path, ctx).and_then(|v| E::from_payload(v, &path.field("electronic"), ctx))
}

fn decode_atom<E: FromPayload>(map: &Map<String, Value>, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Atom<E>> {
    let composition = decode_composition(map, path, ctx, Composition::as_atom);
    let charge = decode_charge(map, path, ctx);
    let electronic = decode_electronic(map, path, ctx);
    Some(Atom {
        composition: composition?,
        charge: charge?,
        electronic: electronic?,
    })
}

fn decode_molecule<E: FromPayload, T>(
    map: &Map<String, Value>,
    path: &FieldPath,
    ctx: &mut Context<'_>,
    shape: impl FnOnce(&Composition) -> Result<T, String>,
) -> Option<Molecule<E>> {
    let composition = decode_composition(map, path, ctx, shape);
    let charge = decode_charge(map, path, ctx);
    let electronic = decode_electronic(map, path, ctx);
    Some(Molecule {
        composition: composition?,
        charge: charge?,
        electronic: electronic?,
    })
}

fn decode_electron(map: &Map<String, Value>, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Electron> {
    let composition = payload::required_string(map, "composition", path, ctx);
    let charge = decode_charge(map, path, ctx);
    let (composition, charge) = (composition?, charge?);

    let mark = ctx.error_count();
    if composition != "e" {
        ctx.push(
            &path.field("composition"),
            ErrorKind::Composition,
            format!("electron composition must be \"e\", found \"{}\"", composition),
        );
    }
    if charge != -1 {
        ctx.push(
            &path.field("charge"),
            ErrorKind::Composition,
            format!("electron charge must be -1, found {}", charge),
        );
    }
    (ctx.error_count() == mark).then_some(Electron)
}

impl FromPayload for Species {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let tag = payload::required_string(map, "type", path, ctx)?;
        let Some(species_type) = SpeciesType::from_tag(&tag) else {
            ctx.push(
                &path.field("type"),
                ErrorKind::UnknownVariant,
                format!("unknown species type \"{}\"", tag),
            );
            return None;
        };

        let species = match species_type {
            SpeciesType::Electron => Species::Electron(decode_electron(map, path, ctx)?),
            SpeciesType::SimpleParticle => {
                let composition = payload::required_non_empty(map, "composition", path, ctx);
                let charge = decode_charge(map, path, ctx);
                Species::SimpleParticle(SimpleParticle {
                    composition: composition?,
                    charge: charge?,
                })
            }
            SpeciesType::Unspecified => {
                let composition = decode_composition(map, path, ctx, |_| Ok(()));
                let charge = decode_charge(map, path, ctx);
                let electronic = payload::optional_with(map, "electronic", path, ctx, String::from_payload);
                Species::Unspecified(UnspecifiedSpecies {
                    composition: composition?,
                    charge: charge?,
                    electronic: electronic?,
                })
            }
            SpeciesType::AtomUnspecified => Species::AtomUnspecified(decode_atom(map, path, ctx)?),
            SpeciesType::AtomLSUncoupled => Species::AtomLSUncoupled(decode_atom(map, path, ctx)?),
            SpeciesType::AtomLS => Species::AtomLS(decode_atom(map, path, ctx)?),
            SpeciesType::AtomLS1 => Species::AtomLS1(decode_atom(map, path, ctx)?),
            SpeciesType::AtomJ1L2 => Species::AtomJ1L2(decode_atom(map, path, ctx)?),
            SpeciesType::AtomLSTwoTerm => Species::AtomLSTwoTerm(decode_atom(map, path, ctx)?),
            SpeciesType::AtomLSJTwoTerm => Species::AtomLSJTwoTerm(decode_atom(map, path, ctx)?),
            SpeciesType::HomonuclearDiatom => Species::HomonuclearDiatom(decode_molecule(
                map,
                path,
                ctx,
                Composition::as_homonuclear_diatom,
            )?),
            SpeciesType::HeteronuclearDiatom => Species::HeteronuclearDiatom(decode_molecule(
                map,
                path,
                ctx,
                Composition::as_heteronuclear_diatom,
            )?),
            SpeciesType::LinearTriatomInversionCenter => {
                Species::LinearTriatomInversionCenter(decode_molecule(map, path, ctx, Composition::as_triatom)?)
            }
            SpeciesType::TriatomC2v => Species::TriatomC2v(decode_molecule(map, path, ctx, Composition::as_triatom)?),
        };
        Some(species)
    }
}

impl<'de> Deserialize<'de> for Species {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        validate_species(&value).map_err(serde::de::Error::custom)
    }
}

/// Validate a species payload with the default [`ValidationConfig`].
pub fn validate_species(value: &Value) -> Result<Species, ValidationErrors> {
    validate_species_with_config(value, &ValidationConfig::default())
}

/// Validate a species payload, returning every violated constraint on failure.
pub fn validate_species_with_config(value: &Value, config: &ValidationConfig) -> Result<Species, ValidationErrors> {
    debug!("Validating species payload");
    let mut ctx = Context::new(config);
    let species = Species::from_payload(value, &FieldPath::root(), &mut ctx);

    match ctx.finish(species) {
        Ok(species) => {
            debug!("Validated {} species {}", species.species_type(), species);
            Ok(species)
        }
        Err(errors) => {
            warn!("Rejected species payload with {} error(s)", errors.len());
            Err(errors)
        }
    }
}
