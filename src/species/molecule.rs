//! Molecular electronic, vibrational and rotational states.
//!
//! A molecular `electronic` slot holds either one electronic state (which may
//! nest a `vibrational` slot, which in turn may nest a `rotational` slot), a
//! compound list of two or more electronic states, or a free-text label.
//! Vibrational and rotational slots follow the same pattern, except that
//! compound entries may themselves be free text.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::quantum::{decode_bounded, decode_half_integer, HalfInteger};
use super::summary::{Component, ComponentSummaries, ComponentSummary};
use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::{ErrorKind, FieldPath};

/// Largest projected orbital angular momentum with a term letter (Γ).
pub const MAX_LAMBDA: u32 = 4;

const MOLECULAR_ORBITALS: [&str; 5] = ["S", "P", "D", "F", "G"];
const MOLECULAR_ORBITALS_LATEX: [&str; 5] = ["\\Sigma", "\\Pi", "\\Delta", "\\Phi", "\\Gamma"];

fn molecular_orbital(lambda: u32) -> &'static str {
    MOLECULAR_ORBITALS.get(lambda as usize).copied().unwrap_or("?")
}

fn molecular_orbital_latex(lambda: u32) -> &'static str {
    MOLECULAR_ORBITALS_LATEX.get(lambda as usize).copied().unwrap_or("?")
}

/// Symmetry under inversion through the centre of mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InversionParity {
    /// `g`
    Gerade,
    /// `u`
    Ungerade,
}

impl InversionParity {
    fn as_str(self) -> &'static str {
        match self {
            InversionParity::Gerade => "g",
            InversionParity::Ungerade => "u",
        }
    }
}

impl fmt::Display for InversionParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InversionParity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Symmetry of a Σ state under reflection through a plane containing the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reflection {
    /// `+`
    Plus,
    /// `-`
    Minus,
}

impl Reflection {
    fn as_str(self) -> &'static str {
        match self {
            Reflection::Plus => "+",
            Reflection::Minus => "-",
        }
    }
}

impl fmt::Display for Reflection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Reflection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

fn reflection_suffix(reflection: Option<Reflection>) -> String {
    reflection.map(|r| format!("^{}", r)).unwrap_or_default()
}

fn decode_energy_id(map: &serde_json::Map<String, Value>, path: &FieldPath, ctx: &mut Context<'_>) -> Option<String> {
    payload::required_non_empty(map, "energyId", path, ctx)
}

fn decode_lambda(map: &serde_json::Map<String, Value>, path: &FieldPath, ctx: &mut Context<'_>) -> Option<u32> {
    payload::required(map, "Lambda", path, ctx)
        .and_then(|v| decode_bounded(v, &path.field("Lambda"), MAX_LAMBDA, ctx))
}

fn decode_spin(map: &serde_json::Map<String, Value>, path: &FieldPath, ctx: &mut Context<'_>) -> Option<HalfInteger> {
    payload::required(map, "S", path, ctx).and_then(|v| decode_half_integer(v, &path.field("S"), ctx))
}

fn decode_inversion_parity(
    map: &serde_json::Map<String, Value>,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<InversionParity> {
    let field = path.field("parity");
    match payload::required_string(map, "parity", path, ctx)?.as_str() {
        "g" => Some(InversionParity::Gerade),
        "u" => Some(InversionParity::Ungerade),
        other => {
            ctx.push(&field, ErrorKind::QuantumNumber, format!("parity must be \"g\" or \"u\", found \"{}\"", other));
            None
        }
    }
}

/// Reflection is only meaningful for Σ states; the outer `Option` is `None` on error.
fn decode_reflection(
    map: &serde_json::Map<String, Value>,
    path: &FieldPath,
    lambda: Option<u32>,
    ctx: &mut Context<'_>,
) -> Option<Option<Reflection>> {
    let field = path.field("reflection");
    let reflection = payload::optional_with(map, "reflection", path, ctx, payload::string)?;
    let reflection = match reflection.as_deref() {
        None => None,
        Some("+") => Some(Reflection::Plus),
        Some("-") => Some(Reflection::Minus),
        Some(other) => {
            ctx.push(&field, ErrorKind::QuantumNumber, format!("reflection must be \"+\" or \"-\", found \"{}\"", other));
            return None;
        }
    };
    if let (Some(_), Some(lambda)) = (reflection, lambda) {
        if lambda != 0 {
            ctx.push(
                &field,
                ErrorKind::QuantumNumber,
                format!("reflection symmetry only applies to Sigma states (Lambda = 0), found Lambda = {}", lambda),
            );
            return None;
        }
    }
    Some(reflection)
}

/// Electronic term of a heteronuclear linear molecule, e.g. `X^1S^+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinearTerm {
    /// Energy label such as `X`, `A`, `b`
    #[serde(rename = "energyId")]
    pub energy_id: String,
    /// Projected orbital angular momentum
    #[serde(rename = "Lambda")]
    pub lambda: u32,
    /// Total spin
    #[serde(rename = "S")]
    pub s: HalfInteger,
    /// Reflection symmetry, Σ states only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection: Option<Reflection>,
}

impl Component for LinearTerm {
    fn summary(&self) -> String {
        format!(
            "{}^{}{}{}",
            self.energy_id,
            self.s.multiplicity(),
            molecular_orbital(self.lambda),
            reflection_suffix(self.reflection)
        )
    }

    fn latex(&self) -> String {
        format!(
            "\\mathrm{{{}}}^{{{}}}{}{}",
            self.energy_id,
            self.s.multiplicity(),
            molecular_orbital_latex(self.lambda),
            reflection_suffix(self.reflection)
        )
    }
}

impl FromPayload for LinearTerm {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let energy_id = decode_energy_id(map, path, ctx);
        let lambda = decode_lambda(map, path, ctx);
        let s = decode_spin(map, path, ctx);
        let reflection = decode_reflection(map, path, lambda, ctx);
        Some(LinearTerm {
            energy_id: energy_id?,
            lambda: lambda?,
            s: s?,
            reflection: reflection?,
        })
    }
}

/// Electronic term of a linear molecule with an inversion centre, e.g. `X^1S_g^+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinearInversionCenterTerm {
    /// Energy label such as `X`, `A`, `b`
    #[serde(rename = "energyId")]
    pub energy_id: String,
    /// Projected orbital angular momentum
    #[serde(rename = "Lambda")]
    pub lambda: u32,
    /// Total spin
    #[serde(rename = "S")]
    pub s: HalfInteger,
    /// Inversion symmetry
    pub parity: InversionParity,
    /// Reflection symmetry, Σ states only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection: Option<Reflection>,
}

impl Component for LinearInversionCenterTerm {
    fn summary(&self) -> String {
        format!(
            "{}^{}{}_{}{}",
            self.energy_id,
            self.s.multiplicity(),
            molecular_orbital(self.lambda),
            self.parity,
            reflection_suffix(self.reflection)
        )
    }

    fn latex(&self) -> String {
        format!(
            "\\mathrm{{{}}}^{{{}}}{}_\\mathrm{{{}}}{}",
            self.energy_id,
            self.s.multiplicity(),
            molecular_orbital_latex(self.lambda),
            self.parity,
            reflection_suffix(self.reflection)
        )
    }
}

impl FromPayload for LinearInversionCenterTerm {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let energy_id = decode_energy_id(map, path, ctx);
        let lambda = decode_lambda(map, path, ctx);
        let s = decode_spin(map, path, ctx);
        let parity = decode_inversion_parity(map, path, ctx);
        let reflection = decode_reflection(map, path, lambda, ctx);
        Some(LinearInversionCenterTerm {
            energy_id: energy_id?,
            lambda: lambda?,
            s: s?,
            parity: parity?,
            reflection: reflection?,
        })
    }
}

/// Electronic state of a C2v triatomic, labelled by energy only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct C2vTerm {
    /// Energy label such as `X`
    #[serde(rename = "energyId")]
    pub energy_id: String,
}

impl Component for C2vTerm {
    fn summary(&self) -> String {
        self.energy_id.clone()
    }

    fn latex(&self) -> String {
        format!("\\mathrm{{{}}}", self.energy_id)
    }
}

impl FromPayload for C2vTerm {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let energy_id = decode_energy_id(map, path, ctx)?;
        Some(C2vTerm { energy_id })
    }
}

fn decode_triple(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<[u32; 3]> {
    let items = payload::array(value, path, ctx)?;
    if items.len() != 3 {
        ctx.structural(path, format!("expected exactly 3 quantum numbers, found {}", items.len()));
        return None;
    }
    let numbers = payload::each(items, path, ctx, |v, p, ctx| payload::unsigned(v, p, ErrorKind::QuantumNumber, ctx))?;
    Some([numbers[0], numbers[1], numbers[2]])
}

fn render_triple(values: &[u32; 3]) -> String {
    values.iter().map(ToString::to_string).collect()
}

/// Vibrational level of a diatomic, `v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DiatomVibrational {
    /// Vibrational quantum number
    pub v: u32,
}

impl Component for DiatomVibrational {
    fn summary(&self) -> String {
        self.v.to_string()
    }

    fn latex(&self) -> String {
        self.summary()
    }
}

impl FromPayload for DiatomVibrational {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let v = payload::required(map, "v", path, ctx)
            .and_then(|v| payload::unsigned(v, &path.field("v"), ErrorKind::QuantumNumber, ctx))?;
        Some(DiatomVibrational { v })
    }
}

/// Vibrational level of a triatomic, `[v1, v2, v3]` rendered as `v1v2v3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TriatomVibrational {
    /// Symmetric stretch, bend and asymmetric stretch quanta
    pub v: [u32; 3],
}

impl Component for TriatomVibrational {
    fn summary(&self) -> String {
        render_triple(&self.v)
    }

    fn latex(&self) -> String {
        self.summary()
    }
}

impl FromPayload for TriatomVibrational {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let v = payload::required(map, "v", path, ctx).and_then(|v| decode_triple(v, &path.field("v"), ctx))?;
        Some(TriatomVibrational { v })
    }
}

/// Rotational level of a linear molecule, `J`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LinearRotational {
    /// Rotational quantum number
    #[serde(rename = "J")]
    pub j: u32,
}

impl Component for LinearRotational {
    fn summary(&self) -> String {
        self.j.to_string()
    }

    fn latex(&self) -> String {
        self.summary()
    }
}

impl FromPayload for LinearRotational {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let j = payload::required(map, "J", path, ctx)
            .and_then(|v| payload::unsigned(v, &path.field("J"), ErrorKind::QuantumNumber, ctx))?;
        Some(LinearRotational { j })
    }
}

/// Rotational level of an asymmetric top, `[J, Ka, Kc]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct C2vRotational {
    /// `J`, `Ka` and `Kc`
    #[serde(rename = "J")]
    pub j: [u32; 3],
}

impl Component for C2vRotational {
    fn summary(&self) -> String {
        render_triple(&self.j)
    }

    fn latex(&self) -> String {
        self.summary()
    }
}

impl FromPayload for C2vRotational {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let field = path.field("J");
        let [j, ka, kc] = payload::required(map, "J", path, ctx).and_then(|v| decode_triple(v, &field, ctx))?;
        let (sum, j64) = (u64::from(ka) + u64::from(kc), u64::from(j));
        if ctx.config.check_coupling && sum != j64 && sum != j64 + 1 {
            ctx.push(
                &field,
                ErrorKind::QuantumNumber,
                format!("Ka + Kc must equal J or J + 1, found J={}, Ka={}, Kc={}", j, ka, kc),
            );
            return None;
        }
        Some(C2vRotational { j: [j, ka, kc] })
    }
}

/// Entry of a compound vibrational or rotational slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Level<T> {
    /// Fully described level
    Described(T),
    /// Free-text label such as `10+`
    Unspecified(String),
}

impl<T: Component> Component for Level<T> {
    fn summary(&self) -> String {
        match self {
            Level::Described(level) => level.summary(),
            Level::Unspecified(label) => label.clone(),
        }
    }

    fn latex(&self) -> String {
        match self {
            Level::Described(level) => level.latex(),
            Level::Unspecified(label) => label.clone(),
        }
    }
}

impl<T: FromPayload> FromPayload for Level<T> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        match value {
            Value::String(_) => payload::non_empty_string(value, path, ctx).map(Level::Unspecified),
            _ => T::from_payload(value, path, ctx).map(Level::Described),
        }
    }
}

fn decode_compound<T>(
    items: &[Value],
    path: &FieldPath,
    ctx: &mut Context<'_>,
    decode: impl FnMut(&Value, &FieldPath, &mut Context<'_>) -> Option<T>,
) -> Option<Vec<T>> {
    if items.len() < 2 {
        ctx.structural(path, "compound state needs at least two entries");
        return None;
    }
    payload::each(items, path, ctx, decode)
}

/// Rotational slot below a vibrational state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RotationalSlot<R> {
    /// One rotational level
    Singular(R),
    /// Two or more levels
    Compound(Vec<Level<R>>),
    /// Free-text label
    Unspecified(String),
}

impl<R: Component> RotationalSlot<R> {
    /// Rendered slot.
    pub fn summaries(&self) -> ComponentSummaries {
        match self {
            RotationalSlot::Singular(level) => ComponentSummaries::Singular(level.summarize()),
            RotationalSlot::Compound(levels) => {
                ComponentSummaries::Compound(levels.iter().map(Component::summarize).collect())
            }
            RotationalSlot::Unspecified(label) => {
                ComponentSummaries::Singular(ComponentSummary::new(label.as_str(), label.as_str()))
            }
        }
    }
}

impl<R: FromPayload> FromPayload for RotationalSlot<R> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        match value {
            Value::String(_) => payload::non_empty_string(value, path, ctx).map(RotationalSlot::Unspecified),
            Value::Array(items) => decode_compound(items, path, ctx, Level::<R>::from_payload).map(RotationalSlot::Compound),
            _ => R::from_payload(value, path, ctx).map(RotationalSlot::Singular),
        }
    }
}

/// A vibrational level with an optional rotational slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VibrationalState<V, R> {
    /// The vibrational level itself
    #[serde(flatten)]
    pub level: V,
    /// Rotational levels within this vibrational level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotational: Option<RotationalSlot<R>>,
}

/// Vibrational slot below an electronic state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum VibrationalSlot<V, R> {
    /// One vibrational level, possibly with rotational detail
    Singular(VibrationalState<V, R>),
    /// Two or more levels
    Compound(Vec<Level<V>>),
    /// Free-text label such as `0,n,0`
    Unspecified(String),
}

impl<V: Component, R: Component> VibrationalSlot<V, R> {
    /// Rendered slot, including nested rotational levels.
    pub fn summaries(&self) -> ComponentSummaries {
        match self {
            VibrationalSlot::Singular(state) => {
                let mut summary = state.level.summarize();
                summary.rotational = state.rotational.as_ref().map(|r| Box::new(r.summaries()));
                ComponentSummaries::Singular(summary)
            }
            VibrationalSlot::Compound(levels) => {
                ComponentSummaries::Compound(levels.iter().map(Component::summarize).collect())
            }
            VibrationalSlot::Unspecified(label) => {
                ComponentSummaries::Singular(ComponentSummary::new(label.as_str(), label.as_str()))
            }
        }
    }
}

impl<V: FromPayload, R: FromPayload> FromPayload for VibrationalSlot<V, R> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        match value {
            Value::String(_) => payload::non_empty_string(value, path, ctx).map(VibrationalSlot::Unspecified),
            Value::Array(items) => decode_compound(items, path, ctx, Level::<V>::from_payload).map(VibrationalSlot::Compound),
            _ => {
                let map = payload::object(value, path, ctx)?;
                let level = V::from_payload(value, path, ctx);
                let rotational = payload::optional_with(map, "rotational", path, ctx, RotationalSlot::<R>::from_payload);
                Some(VibrationalSlot::Singular(VibrationalState {
                    level: level?,
                    rotational: rotational?,
                }))
            }
        }
    }
}

/// An electronic state with an optional vibrational slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ElectronicState<E, V, R> {
    /// The electronic term
    #[serde(flatten)]
    pub term: E,
    /// Vibrational levels within this electronic state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibrational: Option<VibrationalSlot<V, R>>,
}

/// Electronic slot of a molecule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum MolecularElectronic<E, V, R> {
    /// One electronic state, possibly with vibrational detail
    Singular(ElectronicState<E, V, R>),
    /// Two or more electronic terms
    Compound(Vec<E>),
    /// Free-text label such as `*`
    Unspecified(String),
}

impl<E, V, R> MolecularElectronic<E, V, R> {
    /// Electronic terms in this slot; empty for a free-text label.
    pub fn terms(&self) -> Vec<&E> {
        match self {
            MolecularElectronic::Singular(state) => vec![&state.term],
            MolecularElectronic::Compound(terms) => terms.iter().collect(),
            MolecularElectronic::Unspecified(_) => Vec::new(),
        }
    }
}

impl<E: Component, V: Component, R: Component> MolecularElectronic<E, V, R> {
    /// Rendered slot, including nested vibrational and rotational levels.
    pub fn summaries(&self) -> ComponentSummaries {
        match self {
            MolecularElectronic::Singular(state) => {
                let mut summary = state.term.summarize();
                summary.vibrational = state.vibrational.as_ref().map(|v| Box::new(v.summaries()));
                ComponentSummaries::Singular(summary)
            }
            MolecularElectronic::Compound(terms) => {
                ComponentSummaries::Compound(terms.iter().map(Component::summarize).collect())
            }
            MolecularElectronic::Unspecified(label) => ComponentSummaries::Singular(ComponentSummary::new(
                label.as_str(),
                format!("\\mathrm{{{}}}", label),
            )),
        }
    }
}

impl<E: FromPayload, V: FromPayload, R: FromPayload> FromPayload for MolecularElectronic<E, V, R> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        match value {
            Value::String(_) => payload::non_empty_string(value, path, ctx).map(MolecularElectronic::Unspecified),
            Value::Array(items) => decode_compound(items, path, ctx, E::from_payload).map(MolecularElectronic::Compound),
            _ => {
                let map = payload::object(value, path, ctx)?;
                let term = E::from_payload(value, path, ctx);
                let vibrational = payload::optional_with(map, "vibrational", path, ctx, VibrationalSlot::<V, R>::from_payload);
                Some(MolecularElectronic::Singular(ElectronicState {
                    term: term?,
                    vibrational: vibrational?,
                }))
            }
        }
    }
}

/// `HomonuclearDiatom` electronic slot.
pub type HomonuclearDiatomElectronic = MolecularElectronic<LinearInversionCenterTerm, DiatomVibrational, LinearRotational>;
/// `HeteronuclearDiatom` electronic slot.
pub type HeteronuclearDiatomElectronic = MolecularElectronic<LinearTerm, DiatomVibrational, LinearRotational>;
/// `LinearTriatomInversionCenter` electronic slot.
pub type LinearTriatomElectronic = MolecularElectronic<LinearInversionCenterTerm, TriatomVibrational, LinearRotational>;
/// `TriatomC2v` electronic slot.
pub type TriatomC2vElectronic = MolecularElectronic<C2vTerm, TriatomVibrational, C2vRotational>;
