//! Canonical text forms of species and their state components.

use serde::{Deserialize, Serialize};

/// A quantum-state component with canonical plain-text and LaTeX forms.
///
/// Both renderings are pure: the same value always yields the same text.
pub trait Component {
    /// Plain-text form, e.g. `^2P^o_3/2`.
    fn summary(&self) -> String;

    /// Typeset form, e.g. `{}^{2}\mathrm{P}^o_{3/2}`.
    fn latex(&self) -> String;

    /// Both forms, without nested components.
    fn summarize(&self) -> ComponentSummary {
        ComponentSummary::new(self.summary(), self.latex())
    }
}

/// Plain-text and LaTeX pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SummarizedComponent {
    /// Plain-text form
    pub summary: String,
    /// Typeset form
    pub latex: String,
}

/// Rendering of one state component and, for molecules, the levels nested below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSummary {
    /// Plain-text form
    pub summary: String,
    /// Typeset form
    pub latex: String,
    /// Vibrational levels below an electronic state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrational: Option<Box<ComponentSummaries>>,
    /// Rotational levels below a vibrational state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotational: Option<Box<ComponentSummaries>>,
}

impl ComponentSummary {
    /// A leaf without nested levels.
    pub fn new(summary: impl Into<String>, latex: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            latex: latex.into(),
            vibrational: None,
            rotational: None,
        }
    }

    fn nested(&self) -> Option<&ComponentSummaries> {
        self.vibrational.as_deref().or(self.rotational.as_deref())
    }
}

/// A single component or a compound (`|`-separated) list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentSummaries {
    /// One component, possibly with nested levels
    Singular(ComponentSummary),
    /// Two or more alternatives
    Compound(Vec<ComponentSummary>),
}

impl ComponentSummaries {
    /// Append `{...}` / `\left(...\right)` with this component to the output.
    fn append_to(&self, summary: &mut String, latex: &mut String) {
        summary.push('{');
        latex.push_str("\\left(");
        match self {
            ComponentSummaries::Singular(component) => {
                summary.push_str(&component.summary);
                latex.push_str(&component.latex);
                if let Some(nested) = component.nested() {
                    nested.append_to(summary, latex);
                }
            }
            ComponentSummaries::Compound(components) => {
                let summaries: Vec<&str> = components.iter().map(|c| c.summary.as_str()).collect();
                let latexes: Vec<&str> = components.iter().map(|c| c.latex.as_str()).collect();
                summary.push_str(&summaries.join("|"));
                latex.push_str(&latexes.join("|"));
            }
        }
        summary.push('}');
        latex.push_str("\\right)");
    }
}

/// Full rendering of a species, cached in [`SerializedSpecies`](super::SerializedSpecies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSummary {
    /// Plain-text form, e.g. `N2{X^1S_g^+{0{0}}}`
    pub summary: String,
    /// Typeset form
    pub latex: String,
    /// Rendering of composition and charge alone
    pub composition: SummarizedComponent,
    /// Rendering of the electronic component tree, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electronic: Option<ComponentSummaries>,
}

impl StateSummary {
    /// Assemble the full text from the composition and the component tree.
    pub fn assemble(composition: SummarizedComponent, electronic: Option<ComponentSummaries>) -> Self {
        let mut summary = composition.summary.clone();
        let mut latex = composition.latex.clone();
        if let Some(electronic) = &electronic {
            electronic.append_to(&mut summary, &mut latex);
        }
        Self {
            summary,
            latex,
            composition,
            electronic,
        }
    }
}
