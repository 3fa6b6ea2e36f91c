use std::fmt;

use serde::Serialize;

use super::graph::{EdgeKind, NodeId};
use crate::validation::{ErrorKind, FieldPath, ValidationError, ValidationErrors};

/// Relation invariant checked over a [`RelationGraph`](super::RelationGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationRule {
    /// `Consumes`/`Produces` edges point at declared states
    ParticipantsResolve,
    /// Every process consumes or produces at least one state
    ProcessesHaveParticipants,
    /// `IsPartOf` edges point at declared sets
    MembershipsResolve,
    /// `References` edges point at declared references
    ReferencesResolve,
    /// `HasDirectSubstate` edges form a forest
    SubstateForest,
    /// `InCompound` edges form no cycle
    CompoundsAcyclic,
}

impl RelationRule {
    /// Every rule, in report order.
    pub const ALL: [RelationRule; 6] = [
        RelationRule::ParticipantsResolve,
        RelationRule::ProcessesHaveParticipants,
        RelationRule::MembershipsResolve,
        RelationRule::ReferencesResolve,
        RelationRule::SubstateForest,
        RelationRule::CompoundsAcyclic,
    ];

    /// Rule that owns the endpoint checks of an edge kind.
    pub fn for_edge(kind: EdgeKind) -> Self {
        match kind {
            EdgeKind::Consumes | EdgeKind::Produces => RelationRule::ParticipantsResolve,
            EdgeKind::IsPartOf => RelationRule::MembershipsResolve,
            EdgeKind::References => RelationRule::ReferencesResolve,
            EdgeKind::HasDirectSubstate => RelationRule::SubstateForest,
            EdgeKind::InCompound => RelationRule::CompoundsAcyclic,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            RelationRule::ParticipantsResolve => "Reaction participants resolve",
            RelationRule::ProcessesHaveParticipants => "Processes have participants",
            RelationRule::MembershipsResolve => "Set memberships resolve",
            RelationRule::ReferencesResolve => "References resolve",
            RelationRule::SubstateForest => "Substates form a forest",
            RelationRule::CompoundsAcyclic => "Compound states are acyclic",
        }
    }
}

impl fmt::Display for RelationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One violated relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationViolation {
    /// The violated rule
    pub rule: RelationRule,
    /// Offending edge kind; `None` for node-level violations
    pub edge: Option<EdgeKind>,
    /// Source node, or the offending node
    pub from: NodeId,
    /// Target node of the offending edge
    pub to: Option<NodeId>,
    /// Field that declared the offending edge or node
    pub origin: FieldPath,
    /// Human-readable explanation
    pub message: String,
}

impl fmt::Display for RelationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.message)
    }
}

/// Outcome of checking every relation rule over a graph.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelationReport {
    /// Number of declared nodes
    pub node_count: usize,
    /// Number of edges
    pub edge_count: usize,
    /// Every violation found, grouped by rule in report order
    pub violations: Vec<RelationViolation>,
}

impl RelationReport {
    /// Returns true if no rule is violated.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations of one rule.
    pub fn violations_of(&self, rule: RelationRule) -> impl Iterator<Item = &RelationViolation> {
        self.violations.iter().filter(move |v| v.rule == rule)
    }

    /// Number of rules without violations.
    pub fn passed_count(&self) -> usize {
        RelationRule::ALL
            .iter()
            .filter(|rule| self.violations_of(**rule).next().is_none())
            .count()
    }

    /// Number of rules with at least one violation.
    pub fn failed_count(&self) -> usize {
        RelationRule::ALL.len() - self.passed_count()
    }

    /// The violations as [`ErrorKind::ReferentialIntegrity`] errors at their
    /// declaring fields; `None` when the graph is valid.
    pub fn to_validation_errors(&self) -> Option<ValidationErrors> {
        ValidationErrors::from_vec(
            self.violations
                .iter()
                .map(|v| ValidationError::new(v.origin.clone(), ErrorKind::ReferentialIntegrity, v.message.clone()))
                .collect(),
        )
    }
}

impl fmt::Display for RelationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Relation Report")?;
        writeln!(f, "===============")?;
        writeln!(f, "Nodes: {}, edges: {}", self.node_count, self.edge_count)?;
        writeln!(f)?;

        for rule in RelationRule::ALL {
            let violations: Vec<&RelationViolation> = self.violations_of(rule).collect();
            if violations.is_empty() {
                writeln!(f, "[✓] {}", rule)?;
                continue;
            }

            writeln!(f, "[✗] {} - FAILED: {} violation(s)", rule, violations.len())?;
            for violation in violations {
                writeln!(f, "    {}", violation)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Summary: {} passed, {} failed", self.passed_count(), self.failed_count())?;
        writeln!(f)?;
        if self.is_valid() {
            writeln!(f, "Relations VALID")
        } else {
            writeln!(f, "Relations INVALID")
        }
    }
}
