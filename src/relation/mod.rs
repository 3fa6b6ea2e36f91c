//! # Relation model
//!
//! Documents refer to their parts by key: reactions name states, process
//! infos cite references and list the sets they belong to. Decoding only
//! checks that each key is a non-empty string; whether the keys resolve, and
//! whether the state hierarchy is well formed, is a property of the
//! document as a whole.
//!
//! This module views a document as a [`RelationGraph`] of typed nodes
//! (process, set, state, reference) connected by typed edges and checks every
//! relation invariant in one pass, reporting all violations:
//!
//! | Edge | From → to | Invariant |
//! |------|-----------|-----------|
//! | `IsPartOf` | process → set | target exists |
//! | `Consumes`, `Produces` | process → state | target exists; each process has at least one |
//! | `HasDirectSubstate` | state → state | forest: at most one parent, no cycle |
//! | `InCompound` | state → compound state | no cycle |
//! | `References` | process, set → reference | target exists |
//!
//! ```rust
//! use ltpschema::relation::{validate_relations, EdgeKind, NodeId, RelationGraph};
//!
//! let mut graph = RelationGraph::new();
//! graph.add_node(NodeId::process("ionization"));
//! graph.add_node(NodeId::state("Ar"));
//! graph.add_edge(EdgeKind::Consumes, NodeId::process("ionization"), NodeId::state("Ar"));
//! graph.add_edge(EdgeKind::Produces, NodeId::process("ionization"), NodeId::state("Ar+"));
//!
//! let report = validate_relations(&graph);
//! assert_eq!(report.violations.len(), 1);
//! println!("{}", report);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

mod graph;
mod report;

#[cfg(test)]
mod tests;

pub use graph::{Edge, EdgeKind, InfoNode, NodeId, NodeKind, RelationGraph, StateNode};
pub use report::{RelationReport, RelationRule, RelationViolation};

fn violation(rule: RelationRule, edge: &Edge, message: String) -> RelationViolation {
    RelationViolation {
        rule,
        edge: Some(edge.kind),
        from: edge.from.clone(),
        to: Some(edge.to.clone()),
        origin: edge.origin.clone(),
        message,
    }
}

/// Endpoint kinds match the edge kind and both endpoints are declared.
fn check_endpoints(graph: &RelationGraph, violations: &mut Vec<RelationViolation>) {
    for edge in graph.edges() {
        let rule = RelationRule::for_edge(edge.kind);
        if !edge.kind.source_kinds().contains(&edge.from.kind) {
            violations.push(violation(
                rule,
                edge,
                format!("{} edge cannot start at {}", edge.kind, edge.from),
            ));
        } else if !graph.contains(&edge.from) {
            violations.push(violation(
                rule,
                edge,
                format!("{} edge starts at unknown {}", edge.kind, edge.from),
            ));
        }

        let target = edge.kind.target_kind();
        if edge.to.kind != target {
            violations.push(violation(
                rule,
                edge,
                format!("{} edge must point to a {}, found {}", edge.kind, target, edge.to),
            ));
        } else if !graph.contains(&edge.to) {
            violations.push(violation(
                rule,
                edge,
                format!("{} edge points to unknown {}", edge.kind, edge.to),
            ));
        }
    }
}

fn check_participants(graph: &RelationGraph, violations: &mut Vec<RelationViolation>) {
    let participating: BTreeSet<&NodeId> = graph
        .edges()
        .iter()
        .filter(|e| matches!(e.kind, EdgeKind::Consumes | EdgeKind::Produces))
        .map(|e| &e.from)
        .collect();

    for node in graph.nodes().filter(|n| n.kind == NodeKind::Process) {
        if !participating.contains(node) {
            violations.push(RelationViolation {
                rule: RelationRule::ProcessesHaveParticipants,
                edge: None,
                from: node.clone(),
                to: None,
                origin: graph.node_origin(node).cloned().unwrap_or_default(),
                message: format!("{} neither consumes nor produces any state", node),
            });
        }
    }
}

fn check_single_parent(graph: &RelationGraph, violations: &mut Vec<RelationViolation>) {
    let mut parents: HashMap<&NodeId, &NodeId> = HashMap::new();
    for edge in graph.edges_of(EdgeKind::HasDirectSubstate) {
        match parents.get(&edge.to) {
            None => {
                parents.insert(&edge.to, &edge.from);
            }
            Some(first) if *first == &edge.from => {}
            Some(first) => violations.push(violation(
                RelationRule::SubstateForest,
                edge,
                format!("{} has more than one direct parent: {} and {}", edge.to, first, edge.from),
            )),
        }
    }
}

/// Edges that close a cycle, found by an iterative depth-first search.
fn back_edges<'g>(edges: impl Iterator<Item = &'g Edge>) -> Vec<&'g Edge> {
    let mut adjacency: BTreeMap<&'g NodeId, Vec<&'g Edge>> = BTreeMap::new();
    for edge in edges {
        adjacency.entry(&edge.from).or_default().push(edge);
    }

    // false while on the current path, true once fully explored
    let mut finished: HashMap<&'g NodeId, bool> = HashMap::new();
    let mut cycles = Vec::new();

    for &start in adjacency.keys() {
        if finished.contains_key(start) {
            continue;
        }
        finished.insert(start, false);
        let mut stack: Vec<(&'g NodeId, usize)> = vec![(start, 0)];

        while let Some(&(node, next)) = stack.last() {
            let out = adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]);
            let Some(&edge) = out.get(next) else {
                finished.insert(node, true);
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            match finished.get(&edge.to) {
                None => {
                    finished.insert(&edge.to, false);
                    stack.push((&edge.to, 0));
                }
                Some(false) => cycles.push(edge),
                Some(true) => {}
            }
        }
    }
    cycles
}

fn check_acyclic(graph: &RelationGraph, kind: EdgeKind, violations: &mut Vec<RelationViolation>) {
    for edge in back_edges(graph.edges_of(kind)) {
        violations.push(violation(
            RelationRule::for_edge(kind),
            edge,
            format!("{} edge from {} to {} closes a cycle", kind, edge.from, edge.to),
        ));
    }
}

/// Check every relation invariant of `graph`, collecting all violations.
///
/// Runs in time linear in nodes plus edges.
pub fn validate_relations(graph: &RelationGraph) -> RelationReport {
    debug!(
        "Validating relations over {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let mut violations = Vec::new();
    check_endpoints(graph, &mut violations);
    check_participants(graph, &mut violations);
    check_single_parent(graph, &mut violations);
    check_acyclic(graph, EdgeKind::HasDirectSubstate, &mut violations);
    check_acyclic(graph, EdgeKind::InCompound, &mut violations);

    violations.sort_by_key(|v| RelationRule::ALL.iter().position(|rule| *rule == v.rule));

    debug!("Relation validation found {} violation(s)", violations.len());
    RelationReport {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        violations,
    }
}
