//! Element/count breakdown of a species, possibly with nested groups.

use serde::Serialize;
use serde_json::Value;

use super::element::Element;
use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::{ErrorKind, FieldPath};

/// Either a single element or a parenthesised sub-group, e.g. `(CH3)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Constituent {
    /// A single element
    Element(Element),
    /// A nested group of constituents
    Group(Composition),
}

/// Ordered `(constituent, count)` pairs, serialized as `[["Si",1],[[["C",1],["H",3]],4]]`.
///
/// Counts are always positive and a composition is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Composition(Vec<(Constituent, u32)>);

/// Logical shape of a triatomic composition, independent of entry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriatomShape {
    /// Three atoms of one element, e.g. `O3`
    Homonuclear(Element),
    /// One central atom with two equivalent partners, e.g. `CO2` or `H2O`
    Symmetric {
        /// Element occurring once
        center: Element,
        /// Element occurring twice
        ends: Element,
    },
}

impl Composition {
    /// Single atom, `[[element, 1]]`.
    pub fn atom(element: Element) -> Self {
        Self(vec![(Constituent::Element(element), 1)])
    }

    /// Build a flat composition from `(element, count)` pairs.
    ///
    /// Returns `None` if `pairs` is empty or contains a zero count.
    pub fn from_elements(pairs: &[(Element, u32)]) -> Option<Self> {
        Self::from_constituents(
            pairs
                .iter()
                .map(|(element, count)| (Constituent::Element(*element), *count))
                .collect(),
        )
    }

    /// Build a composition from arbitrary constituents.
    ///
    /// Returns `None` if `entries` is empty or contains a zero count.
    pub fn from_constituents(entries: Vec<(Constituent, u32)>) -> Option<Self> {
        if entries.is_empty() || entries.iter().any(|(_, n)| *n == 0) {
            return None;
        }
        Some(Self(entries))
    }

    /// The `(constituent, count)` entries in declared order.
    pub fn entries(&self) -> &[(Constituent, u32)] {
        &self.0
    }

    /// Nesting depth; a flat composition has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .0
            .iter()
            .map(|(constituent, _)| match constituent {
                Constituent::Element(_) => 0,
                Constituent::Group(group) => group.depth(),
            })
            .max()
            .unwrap_or(0)
    }

    /// Distinct elements in order of first appearance, `Si(CH3)4` gives `[Si, C, H]`.
    pub fn unique_elements(&self) -> Vec<Element> {
        let mut found = Vec::new();
        self.collect_elements(&mut found);
        found
    }

    fn collect_elements(&self, found: &mut Vec<Element>) {
        for (constituent, _) in &self.0 {
            match constituent {
                Constituent::Element(element) => {
                    if !found.contains(element) {
                        found.push(*element);
                    }
                }
                Constituent::Group(group) => group.collect_elements(found),
            }
        }
    }

    /// Flat `(element, count)` view, only available without sub-groups.
    fn flat(&self) -> Option<Vec<(Element, u32)>> {
        self.0
            .iter()
            .map(|(constituent, count)| match constituent {
                Constituent::Element(element) => Some((*element, *count)),
                Constituent::Group(_) => None,
            })
            .collect()
    }

    /// Plain-text formula without charge, e.g. `Si(CH3)4`.
    pub fn formula(&self) -> String {
        self.0
            .iter()
            .map(|(constituent, count)| {
                let text = match constituent {
                    Constituent::Element(element) => element.symbol().to_string(),
                    Constituent::Group(group) => format!("({})", group.formula()),
                };
                if *count == 1 {
                    text
                } else {
                    format!("{}{}", text, count)
                }
            })
            .collect()
    }

    /// LaTeX formula body without charge, e.g. `Si\left(CH_{3}\right)_{4}`.
    pub fn formula_latex(&self) -> String {
        self.0
            .iter()
            .map(|(constituent, count)| {
                let text = match constituent {
                    Constituent::Element(element) => element.symbol().to_string(),
                    Constituent::Group(group) => {
                        format!("\\left({}\\right)", group.formula_latex())
                    }
                };
                if *count == 1 {
                    text
                } else {
                    format!("{}_{{{}}}", text, count)
                }
            })
            .collect()
    }

    /// Formula followed by the charge suffix, e.g. `P^+`.
    pub fn summary(&self, charge: i32) -> String {
        format!("{}{}", self.formula(), charge_summary(charge))
    }

    /// Typeset formula followed by the charge suffix, e.g. `\mathrm{H_{2}}^{2+}`.
    pub fn latex(&self, charge: i32) -> String {
        format!("\\mathrm{{{}}}{}", self.formula_latex(), charge_latex(charge))
    }

    /// Atomic species: exactly one `(Element, 1)` pair.
    pub fn as_atom(&self) -> Result<Element, String> {
        match self.flat().as_deref() {
            Some([(element, 1)]) => Ok(*element),
            _ => Err(format!(
                "atomic composition must be a single element with count 1, found {}",
                self.formula()
            )),
        }
    }

    /// Homonuclear diatom: exactly one `(Element, 2)` pair.
    pub fn as_homonuclear_diatom(&self) -> Result<Element, String> {
        match self.flat().as_deref() {
            Some([(element, 2)]) => Ok(*element),
            _ => Err(format!(
                "homonuclear diatom composition must be a single element with count 2, found {}",
                self.formula()
            )),
        }
    }

    /// Heteronuclear diatom: two distinct `(Element, 1)` pairs.
    pub fn as_heteronuclear_diatom(&self) -> Result<(Element, Element), String> {
        match self.flat().as_deref() {
            Some([(first, 1), (second, 1)]) if first == second => Err(format!(
                "Chemical composition of heteronuclear diatom contains equal elements {}, use the \"HomonuclearDiatom\" species type instead.",
                first
            )),
            Some([(first, 1), (second, 1)]) => Ok((*first, *second)),
            _ => Err(format!(
                "heteronuclear diatom composition must be two elements with count 1, found {}",
                self.formula()
            )),
        }
    }

    /// Triatomic molecule with two equivalent atoms. `[[C,1],[O,2]]`,
    /// `[[O,2],[C,1]]` and `[[O,3]]` are the accepted encodings.
    pub fn as_triatom(&self) -> Result<TriatomShape, String> {
        match self.flat().as_deref() {
            Some([(element, 3)]) => Ok(TriatomShape::Homonuclear(*element)),
            Some([(a, 1), (b, 2)]) | Some([(b, 2), (a, 1)]) if a == b => Err(format!(
                "Chemical composition of triatom contains equal elements {}, encode it as [[\"{}\", 3]] instead.",
                a, a
            )),
            Some([(center, 1), (ends, 2)]) | Some([(ends, 2), (center, 1)]) => {
                Ok(TriatomShape::Symmetric {
                    center: *center,
                    ends: *ends,
                })
            }
            _ => Err(format!(
                "triatomic composition must be [[X,1],[Y,2]], [[Y,2],[X,1]] or [[X,3]], found {}",
                self.formula()
            )),
        }
    }
}

/// Plain-text charge suffix: `""`, `^+`, `^-`, `^2+`.
pub fn charge_summary(charge: i32) -> String {
    match charge {
        0 => String::new(),
        1 => "^+".to_string(),
        -1 => "^-".to_string(),
        z => format!("^{}{}", z.unsigned_abs(), if z > 0 { '+' } else { '-' }),
    }
}

/// LaTeX charge suffix: `""`, `^+`, `^-`, `^{2+}`.
pub fn charge_latex(charge: i32) -> String {
    match charge {
        0 => String::new(),
        1 => "^+".to_string(),
        -1 => "^-".to_string(),
        z => format!("^{{{}{}}}", z.unsigned_abs(), if z > 0 { '+' } else { '-' }),
    }
}

impl FromPayload for Composition {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        decode_composition(value, path, 1, ctx)
    }
}

fn decode_composition(
    value: &Value,
    path: &FieldPath,
    depth: usize,
    ctx: &mut Context<'_>,
) -> Option<Composition> {
    if depth > ctx.config.max_composition_depth {
        ctx.push(
            path,
            ErrorKind::Composition,
            format!(
                "composition nesting exceeds the maximum depth of {}",
                ctx.config.max_composition_depth
            ),
        );
        return None;
    }

    let items = payload::array(value, path, ctx)?;
    if items.is_empty() {
        ctx.push(path, ErrorKind::Composition, "composition must not be empty");
        return None;
    }

    let entries = payload::each(items, path, ctx, |item, item_path, ctx| {
        decode_entry(item, item_path, depth, ctx)
    })?;
    Some(Composition(entries))
}

fn decode_entry(
    value: &Value,
    path: &FieldPath,
    depth: usize,
    ctx: &mut Context<'_>,
) -> Option<(Constituent, u32)> {
    let pair = payload::array(value, path, ctx)?;
    if pair.len() != 2 {
        ctx.structural(
            path,
            format!("composition entry must be a [constituent, count] pair, found {} items", pair.len()),
        );
        return None;
    }

    let constituent_path = path.index(0);
    let constituent = match &pair[0] {
        Value::String(symbol) => match symbol.parse::<Element>() {
            Ok(element) => Some(Constituent::Element(element)),
            Err(e) => {
                ctx.push(&constituent_path, ErrorKind::Composition, e.to_string());
                None
            }
        },
        Value::Array(_) => {
            decode_composition(&pair[0], &constituent_path, depth + 1, ctx).map(Constituent::Group)
        }
        other => {
            ctx.structural(
                &constituent_path,
                format!("expected element symbol or sub-composition, found {}", payload::json_type(other)),
            );
            None
        }
    };

    let count_path = path.index(1);
    let count = payload::integer(&pair[1], &count_path, ctx).and_then(|n| {
        match u32::try_from(n) {
            Ok(n) if n > 0 => Some(n),
            _ => {
                ctx.push(&count_path, ErrorKind::Composition, format!("count must be a positive integer, found {}", n));
                None
            }
        }
    });

    Some((constituent?, count?))
}
