//! Atomic electronic states: shell configurations and term symbols in the
//! LS, LS1, J1L2 and two-term coupling schemes.

use serde::Serialize;
use serde_json::Value;

use super::quantum::{
    couples, decode_bounded, decode_half_integer, decode_parity, momenta, render_momenta,
    HalfInteger, Parity, MAX_ORBITAL_L,
};
use super::summary::{Component, ComponentSummaries};
use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::{ErrorKind, FieldPath};

const ATOMIC_ORBITALS: [&str; 6] = ["S", "P", "D", "F", "G", "H"];
const SHELL_ORBITALS: [&str; 6] = ["s", "p", "d", "f", "g", "h"];

fn atomic_orbital(l: u32) -> &'static str {
    ATOMIC_ORBITALS.get(l as usize).copied().unwrap_or("?")
}

fn shell_orbital(l: u32) -> &'static str {
    SHELL_ORBITALS.get(l as usize).copied().unwrap_or("?")
}

/// One subshell of an electron configuration, e.g. `3p^{5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShellEntry {
    /// Principal quantum number, at least 1
    pub n: u32,
    /// Orbital angular momentum, below `n`
    pub l: u32,
    /// Number of electrons, at most `2(2l + 1)`
    pub occupance: u32,
}

impl ShellEntry {
    /// Rendered subshell; empty subshells render as nothing.
    pub fn summary(&self) -> String {
        if self.occupance == 0 {
            return String::new();
        }
        let occupance = if self.occupance > 1 {
            format!("^{{{}}}", self.occupance)
        } else {
            String::new()
        };
        format!("{}{}{}", self.n, shell_orbital(self.l), occupance)
    }
}

/// Concatenated subshells, e.g. `2p^{2}3s`.
pub fn shell_config_summary(config: &[ShellEntry]) -> String {
    config.iter().map(ShellEntry::summary).collect()
}

/// Parity of a configuration, the product of `(-1)^(l * occupance)`.
pub fn shell_config_parity(config: &[ShellEntry]) -> Parity {
    config
        .iter()
        .map(|entry| Parity::of_orbital(entry.l, entry.occupance))
        .fold(Parity::Even, Parity::combine)
}

impl FromPayload for ShellEntry {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let field = |name: &str, ctx: &mut Context<'_>| {
            payload::required(map, name, path, ctx)
                .and_then(|v| payload::unsigned(v, &path.field(name), ErrorKind::QuantumNumber, ctx))
        };
        let n = field("n", ctx);
        let l = field("l", ctx);
        let occupance = field("occupance", ctx);
        let (n, l, occupance) = (n?, l?, occupance?);

        let mark = ctx.error_count();
        if n == 0 {
            ctx.push(&path.field("n"), ErrorKind::QuantumNumber, "principal quantum number must be at least 1");
        }
        if l > MAX_ORBITAL_L {
            ctx.push(&path.field("l"), ErrorKind::QuantumNumber, format!("must be at most {}, found {}", MAX_ORBITAL_L, l));
        } else if n > 0 && l >= n {
            ctx.push(&path.field("l"), ErrorKind::QuantumNumber, format!("must be below n = {}, found {}", n, l));
        }
        let capacity = 2 * (2 * l + 1);
        if occupance > capacity {
            ctx.push(
                &path.field("occupance"),
                ErrorKind::QuantumNumber,
                format!("subshell with l = {} holds at most {} electrons, found {}", l, capacity, occupance),
            );
        }
        (ctx.error_count() == mark).then_some(ShellEntry { n, l, occupance })
    }
}

impl FromPayload for Vec<ShellEntry> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let items = payload::array(value, path, ctx)?;
        payload::each(items, path, ctx, ShellEntry::from_payload)
    }
}

/// Term symbol of a state or configuration part.
pub trait AtomicTermSymbol: Component {
    /// Declared parity `P`.
    fn parity(&self) -> Parity;
}

fn required_field<T>(
    map: &serde_json::Map<String, Value>,
    name: &str,
    path: &FieldPath,
    ctx: &mut Context<'_>,
    decode: impl FnOnce(&Value, &FieldPath, &mut Context<'_>) -> Option<T>,
) -> Option<T> {
    payload::required(map, name, path, ctx).and_then(|v| decode(v, &path.field(name), ctx))
}

fn orbital_l(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<u32> {
    decode_bounded(value, path, MAX_ORBITAL_L, ctx)
}

/// Uncoupled LS term `^{2S+1}L`, e.g. `^2P^o`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LsTerm {
    /// Total orbital angular momentum
    #[serde(rename = "L")]
    pub l: u32,
    /// Total spin
    #[serde(rename = "S")]
    pub s: HalfInteger,
    /// Parity
    #[serde(rename = "P")]
    pub p: Parity,
}

impl Component for LsTerm {
    fn summary(&self) -> String {
        format!("^{}{}{}", self.s.multiplicity(), atomic_orbital(self.l), self.p.suffix())
    }

    fn latex(&self) -> String {
        format!(
            "{{}}^{{{}}}\\mathrm{{{}}}{}",
            self.s.multiplicity(),
            atomic_orbital(self.l),
            self.p.suffix()
        )
    }
}

impl AtomicTermSymbol for LsTerm {
    fn parity(&self) -> Parity {
        self.p
    }
}

impl FromPayload for LsTerm {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let l = required_field(map, "L", path, ctx, orbital_l);
        let s = required_field(map, "S", path, ctx, decode_half_integer);
        let p = required_field(map, "P", path, ctx, decode_parity);
        Some(LsTerm { l: l?, s: s?, p: p? })
    }
}

/// LS term with total angular momentum, `^{2S+1}L_J`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LsjTerm {
    /// Total orbital angular momentum
    #[serde(rename = "L")]
    pub l: u32,
    /// Total spin
    #[serde(rename = "S")]
    pub s: HalfInteger,
    /// Parity
    #[serde(rename = "P")]
    pub p: Parity,
    /// Total angular momentum, in `|L - S|..=L + S`
    #[serde(rename = "J")]
    pub j: HalfInteger,
}

impl LsjTerm {
    /// The term without `J`.
    pub fn ls(&self) -> LsTerm {
        LsTerm {
            l: self.l,
            s: self.s,
            p: self.p,
        }
    }
}

impl Component for LsjTerm {
    fn summary(&self) -> String {
        format!("{}_{}", self.ls().summary(), self.j)
    }

    fn latex(&self) -> String {
        format!("{}_{{{}}}", self.ls().latex(), self.j)
    }
}

impl AtomicTermSymbol for LsjTerm {
    fn parity(&self) -> Parity {
        self.p
    }
}

impl FromPayload for LsjTerm {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let l = required_field(map, "L", path, ctx, orbital_l);
        let s = required_field(map, "S", path, ctx, decode_half_integer);
        let p = required_field(map, "P", path, ctx, decode_parity);
        let j = required_field(map, "J", path, ctx, decode_half_integer);
        let term = LsjTerm { l: l?, s: s?, p: p?, j: j? };

        let l = HalfInteger::from_integer(term.l);
        if ctx.config.check_coupling && !couples(l, term.s, term.j) {
            ctx.push(
                &path.field("J"),
                ErrorKind::QuantumNumber,
                format!(
                    "term inconsistent: with L={}, S={}, J should be one of {}",
                    l,
                    term.s,
                    render_momenta(&momenta(l, term.s))
                ),
            );
            return None;
        }
        Some(term)
    }
}

/// LS1 (LK) coupled term `L^{2S+1}[K]_J`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Ls1Term {
    /// Combined orbital angular momentum of core and excited electron
    #[serde(rename = "L")]
    pub l: u32,
    /// `L` coupled with the core spin
    #[serde(rename = "K")]
    pub k: HalfInteger,
    /// Spin of the excited electron
    #[serde(rename = "S")]
    pub s: HalfInteger,
    /// Parity
    #[serde(rename = "P")]
    pub p: Parity,
    /// Total angular momentum
    #[serde(rename = "J")]
    pub j: HalfInteger,
}

impl Component for Ls1Term {
    fn summary(&self) -> String {
        format!(
            "{}^{}[{}]{}_{}",
            atomic_orbital(self.l),
            self.s.multiplicity(),
            self.k,
            self.p.suffix(),
            self.j
        )
    }

    fn latex(&self) -> String {
        format!(
            "\\mathrm{{{}}}^{{{}}}[{}]{}_{{{}}}",
            atomic_orbital(self.l),
            self.s.multiplicity(),
            self.k,
            self.p.suffix(),
            self.j
        )
    }
}

impl AtomicTermSymbol for Ls1Term {
    fn parity(&self) -> Parity {
        self.p
    }
}

impl FromPayload for Ls1Term {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let l = required_field(map, "L", path, ctx, orbital_l);
        let k = required_field(map, "K", path, ctx, decode_half_integer);
        let s = required_field(map, "S", path, ctx, decode_half_integer);
        let p = required_field(map, "P", path, ctx, decode_parity);
        let j = required_field(map, "J", path, ctx, decode_half_integer);
        Some(Ls1Term { l: l?, k: k?, s: s?, p: p?, j: j? })
    }
}

/// J1L2 (jK) coupled term `{2S+1}[K]_J`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct J1l2Term {
    /// Core `J` coupled with the excited orbital momentum
    #[serde(rename = "K")]
    pub k: HalfInteger,
    /// Spin of the excited electron
    #[serde(rename = "S")]
    pub s: HalfInteger,
    /// Parity
    #[serde(rename = "P")]
    pub p: Parity,
    /// Total angular momentum
    #[serde(rename = "J")]
    pub j: HalfInteger,
}

impl Component for J1l2Term {
    fn summary(&self) -> String {
        format!("{}[{}]{}_{}", self.s.multiplicity(), self.k, self.p.suffix(), self.j)
    }

    fn latex(&self) -> String {
        format!(
            "{{}}^{{{}}}[{}]{}_{{{}}}",
            self.s.multiplicity(),
            self.k,
            self.p.suffix(),
            self.j
        )
    }
}

impl AtomicTermSymbol for J1l2Term {
    fn parity(&self) -> Parity {
        self.p
    }
}

impl FromPayload for J1l2Term {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let k = required_field(map, "K", path, ctx, decode_half_integer);
        let s = required_field(map, "S", path, ctx, decode_half_integer);
        let p = required_field(map, "P", path, ctx, decode_parity);
        let j = required_field(map, "J", path, ctx, decode_half_integer);
        Some(J1l2Term { k: k?, s: s?, p: p?, j: j? })
    }
}

/// A configuration paired with its term symbol, `{config, term}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AtomicTerm<C, T> {
    /// Electron configuration
    pub config: C,
    /// Term symbol
    pub term: T,
}

/// Core and excited parts of a two-part configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CoreExcited<C, E> {
    /// Core electrons
    pub core: C,
    /// Excited electron(s)
    pub excited: E,
}

/// Excited shell without its own term, used by the two-term schemes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExcitedShell {
    /// Electron configuration
    pub config: Vec<ShellEntry>,
}

/// `AtomLSUncoupled` electronic state.
pub type LsDescriptor = AtomicTerm<Vec<ShellEntry>, LsTerm>;
/// `AtomLS` electronic state.
pub type LsjDescriptor = AtomicTerm<Vec<ShellEntry>, LsjTerm>;
/// `AtomLS1` electronic state.
pub type Ls1Descriptor = AtomicTerm<CoreExcited<LsDescriptor, LsDescriptor>, Ls1Term>;
/// `AtomJ1L2` electronic state.
pub type J1l2Descriptor = AtomicTerm<CoreExcited<LsjDescriptor, LsDescriptor>, J1l2Term>;
/// `AtomLSTwoTerm` (with [`LsTerm`]) or `AtomLSJTwoTerm` (with [`LsjTerm`]) electronic state.
pub type TwoTermDescriptor<T> = AtomicTerm<CoreExcited<LsDescriptor, ExcitedShell>, T>;

fn decode_parts<C: FromPayload, T: FromPayload>(
    value: &Value,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<AtomicTerm<C, T>> {
    let map = payload::object(value, path, ctx)?;
    let config = required_field(map, "config", path, ctx, C::from_payload);
    let term = required_field(map, "term", path, ctx, T::from_payload);
    Some(AtomicTerm { config: config?, term: term? })
}

fn parity_mismatch(ctx: &mut Context<'_>, path: &FieldPath, config: &str, expected: Parity) {
    ctx.push(
        &path.field("term").field("P"),
        ErrorKind::QuantumNumber,
        format!("term inconsistent with config: for {}, parity should be {}", config, expected.as_i8()),
    );
}

impl<C: FromPayload, E: FromPayload> FromPayload for CoreExcited<C, E> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let core = required_field(map, "core", path, ctx, C::from_payload);
        let excited = required_field(map, "excited", path, ctx, E::from_payload);
        Some(CoreExcited { core: core?, excited: excited? })
    }
}

impl FromPayload for ExcitedShell {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let config = required_field(map, "config", path, ctx, Vec::<ShellEntry>::from_payload)?;
        Some(ExcitedShell { config })
    }
}

impl<T: AtomicTermSymbol> Component for AtomicTerm<Vec<ShellEntry>, T> {
    fn summary(&self) -> String {
        let config = shell_config_summary(&self.config);
        let separator = if config.is_empty() { "" } else { ":" };
        format!("{}{}{}", config, separator, self.term.summary())
    }

    fn latex(&self) -> String {
        let config = shell_config_summary(&self.config);
        let separator = if config.is_empty() { "" } else { ":" };
        format!("{}{}{}", config, separator, self.term.latex())
    }
}

impl<T: AtomicTermSymbol + FromPayload> FromPayload for AtomicTerm<Vec<ShellEntry>, T> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let descriptor: Self = decode_parts(value, path, ctx)?;
        // An empty configuration leaves the parity unconstrained.
        if ctx.config.check_parity && !descriptor.config.is_empty() {
            let expected = shell_config_parity(&descriptor.config);
            if descriptor.term.parity() != expected {
                parity_mismatch(ctx, path, &shell_config_summary(&descriptor.config), expected);
                return None;
            }
        }
        Some(descriptor)
    }
}

impl<T: AtomicTermSymbol> AtomicTerm<Vec<ShellEntry>, T> {
    /// Configuration followed by the bracketed term, as used inside two-part states.
    fn wrapped(&self, open: &str, close: &str, latex: bool) -> String {
        let term = if latex { self.term.latex() } else { self.term.summary() };
        format!("{}{}{}{}", shell_config_summary(&self.config), open, term, close)
    }
}

impl Component for Ls1Descriptor {
    fn summary(&self) -> String {
        format!(
            "{}{}{}",
            self.config.core.wrapped("{", "}", false),
            self.config.excited.wrapped("{", "}", false),
            self.term.summary()
        )
    }

    fn latex(&self) -> String {
        format!(
            "{}{}{}",
            self.config.core.wrapped("(", ")", true),
            self.config.excited.wrapped("(", ")", true),
            self.term.latex()
        )
    }
}

impl FromPayload for Ls1Descriptor {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let descriptor: Self = decode_parts(value, path, ctx)?;
        let CoreExcited { core, excited } = &descriptor.config;
        let term = &descriptor.term;
        let term_path = path.field("term");

        if ctx.config.check_coupling {
            let (l1, l2) = (HalfInteger::from_integer(core.term.l), HalfInteger::from_integer(excited.term.l));
            let l = HalfInteger::from_integer(term.l);
            let (s1, s2) = (core.term.s, excited.term.s);

            // Later couplings are meaningless once an earlier one fails.
            let failure = if !couples(l1, l2, l) {
                Some(("L", format!("with L1={}, L2={}, L should be one of {}", l1, l2, render_momenta(&momenta(l1, l2)))))
            } else if !couples(l, s1, term.k) {
                Some(("K", format!("with L={}, S1={}, K should be one of {}", l, s1, render_momenta(&momenta(l, s1)))))
            } else if !couples(term.k, s2, term.j) {
                Some(("J", format!("with K={}, S2={}, J should be one of {}", term.k, s2, render_momenta(&momenta(term.k, s2)))))
            } else {
                None
            };
            if let Some((field, message)) = failure {
                ctx.push(&term_path.field(field), ErrorKind::QuantumNumber, format!("term inconsistent: {}", message));
                return None;
            }
        }

        if ctx.config.check_parity {
            let expected = core.term.p.combine(excited.term.p);
            if term.p != expected {
                let config = format!("{}{}", core.wrapped("{", "}", false), excited.wrapped("{", "}", false));
                parity_mismatch(ctx, path, &config, expected);
                return None;
            }
        }
        Some(descriptor)
    }
}

impl Component for J1l2Descriptor {
    fn summary(&self) -> String {
        format!(
            "{}{}{}",
            self.config.core.wrapped("{", "}", false),
            self.config.excited.wrapped("{", "}", false),
            self.term.summary()
        )
    }

    fn latex(&self) -> String {
        format!(
            "{}{}{}",
            self.config.core.wrapped("(", ")", true),
            self.config.excited.wrapped("(", ")", true),
            self.term.latex()
        )
    }
}

impl FromPayload for J1l2Descriptor {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        // The core J1 is checked against L1 and S1 when the core term is decoded.
        let descriptor: Self = decode_parts(value, path, ctx)?;
        let CoreExcited { core, excited } = &descriptor.config;
        let term = &descriptor.term;
        let term_path = path.field("term");

        if ctx.config.check_coupling {
            let j1 = core.term.j;
            let l2 = HalfInteger::from_integer(excited.term.l);
            let s2 = excited.term.s;

            let failure = if !couples(j1, l2, term.k) {
                Some(("K", format!("with J1={}, L2={}, K should be one of {}", j1, l2, render_momenta(&momenta(j1, l2)))))
            } else if !couples(term.k, s2, term.j) {
                Some(("J", format!("with K={}, S2={}, J should be one of {}", term.k, s2, render_momenta(&momenta(term.k, s2)))))
            } else {
                None
            };
            if let Some((field, message)) = failure {
                ctx.push(&term_path.field(field), ErrorKind::QuantumNumber, format!("term inconsistent: {}", message));
                return None;
            }
        }

        if ctx.config.check_parity {
            let expected = core.term.p.combine(excited.term.p);
            if term.p != expected {
                let config = format!("{}{}", core.wrapped("{", "}", false), excited.wrapped("{", "}", false));
                parity_mismatch(ctx, path, &config, expected);
                return None;
            }
        }
        Some(descriptor)
    }
}

impl<T: AtomicTermSymbol> Component for TwoTermDescriptor<T> {
    fn summary(&self) -> String {
        format!(
            "{}{} {}",
            self.config.core.wrapped("{", "}", false),
            shell_config_summary(&self.config.excited.config),
            self.term.summary()
        )
    }

    fn latex(&self) -> String {
        format!(
            "{}{}\\;{}",
            self.config.core.wrapped("\\left(", "\\right)", true),
            shell_config_summary(&self.config.excited.config),
            self.term.latex()
        )
    }
}

impl<T: AtomicTermSymbol + FromPayload> FromPayload for TwoTermDescriptor<T> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let descriptor: Self = decode_parts(value, path, ctx)?;
        if ctx.config.check_parity {
            let CoreExcited { core, excited } = &descriptor.config;
            let expected = core.term.p.combine(shell_config_parity(&excited.config));
            if descriptor.term.parity() != expected {
                let config = format!(
                    "{}{}",
                    core.wrapped("{", "}", false),
                    shell_config_summary(&excited.config)
                );
                parity_mismatch(ctx, path, &config, expected);
                return None;
            }
        }
        Some(descriptor)
    }
}

/// Electronic slot of an atom: one state, or a compound of two or more.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum AtomicElectronic<D> {
    /// A single state
    Singular(D),
    /// Two or more states that are not resolved from each other
    Compound(Vec<D>),
}

impl<D> AtomicElectronic<D> {
    /// All states in this slot.
    pub fn states(&self) -> &[D] {
        match self {
            AtomicElectronic::Singular(state) => std::slice::from_ref(state),
            AtomicElectronic::Compound(states) => states,
        }
    }
}

impl<D: Component> AtomicElectronic<D> {
    /// Rendered slot.
    pub fn summaries(&self) -> ComponentSummaries {
        match self {
            AtomicElectronic::Singular(state) => ComponentSummaries::Singular(state.summarize()),
            AtomicElectronic::Compound(states) => {
                ComponentSummaries::Compound(states.iter().map(Component::summarize).collect())
            }
        }
    }
}

impl<D: FromPayload> FromPayload for AtomicElectronic<D> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        match value {
            Value::Array(items) => {
                if items.len() < 2 {
                    ctx.structural(path, "compound electronic state needs at least two entries");
                    return None;
                }
                payload::each(items, path, ctx, D::from_payload).map(AtomicElectronic::Compound)
            }
            _ => D::from_payload(value, path, ctx).map(AtomicElectronic::Singular),
        }
    }
}
