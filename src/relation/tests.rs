use super::*;
use crate::document::validate_new_document;
use crate::validation::ErrorKind;
use serde_json::{json, Value};

fn nitrogen(vibrational: Option<Value>) -> Value {
    let mut electronic = json!({ "energyId": "X", "Lambda": 0, "S": 0, "parity": "g", "reflection": "+" });
    if let Some(vibrational) = vibrational {
        electronic["vibrational"] = vibrational;
    }
    json!({ "type": "HomonuclearDiatom", "composition": [["N", 2]], "charge": 0, "electronic": electronic })
}

fn hierarchy_document() -> Value {
    json!({
        "contributor": "Example Lab",
        "name": "Nitrogen levels",
        "description": "",
        "complete": false,
        "references": { "phelps": { "id": "phelps", "type": "article-journal" } },
        "states": {
            "e": { "type": "Electron", "composition": "e", "charge": -1 },
            "ground": nitrogen(None),
            "v0": nitrogen(Some(json!({ "v": 0 }))),
            "rot": nitrogen(Some(json!({ "v": 0, "rotational": [{ "J": 1 }, { "J": 2 }] })))
        },
        "processes": [{
            "reaction": {
                "lhs": [{ "count": 1, "state": "e" }, { "count": 1, "state": "ground" }],
                "rhs": [{ "count": 1, "state": "e" }, { "count": 1, "state": "v0" }],
                "reversible": false,
                "typeTags": ["Vibrational"]
            },
            "info": [{
                "type": "RateCoefficient",
                "threshold": { "unit": "eV", "value": 0.29 },
                "references": ["phelps"],
                "data": { "a": 1.0e-15, "b": 0.0, "c": -3400.0 }
            }]
        }]
    })
}

fn pairs(graph: &RelationGraph, kind: EdgeKind) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = graph
        .edges_of(kind)
        .map(|e| (e.from.key.clone(), e.to.key.clone()))
        .collect();
    pairs.sort();
    pairs
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
}

#[test]
fn test_states_decompose_into_substates() {
    let document = validate_new_document(&hierarchy_document()).unwrap();
    let graph = RelationGraph::from_new_document(&document);

    assert_eq!(
        pairs(&graph, EdgeKind::HasDirectSubstate),
        owned(&[
            ("N2", "ground"),
            ("ground", "v0"),
            ("v0", "N2{X^1S_g^+{0{1}}}"),
            ("v0", "N2{X^1S_g^+{0{2}}}"),
            ("v0", "rot"),
        ])
    );
    assert_eq!(
        pairs(&graph, EdgeKind::InCompound),
        owned(&[("N2{X^1S_g^+{0{1}}}", "rot"), ("N2{X^1S_g^+{0{2}}}", "rot")])
    );
    assert!(graph.contains(&NodeId::state("N2")));

    let report = validate_relations(&graph);
    assert!(report.is_valid(), "{}", report);
}

#[test]
fn test_document_edges() {
    let document = validate_new_document(&hierarchy_document()).unwrap();
    let graph = RelationGraph::from_new_document(&document);

    assert_eq!(
        pairs(&graph, EdgeKind::Consumes),
        owned(&[("processes[0]", "e"), ("processes[0]", "ground")])
    );
    assert_eq!(
        pairs(&graph, EdgeKind::Produces),
        owned(&[("processes[0]", "e"), ("processes[0]", "v0")])
    );
    assert_eq!(
        pairs(&graph, EdgeKind::References),
        owned(&[("processes[0]", "phelps")])
    );
    assert_eq!(
        pairs(&graph, EdgeKind::IsPartOf),
        owned(&[("processes[0]", "Nitrogen levels")])
    );

    let consumes = graph.edges_of(EdgeKind::Consumes).nth(1).unwrap();
    assert_eq!(consumes.origin.to_string(), "processes[0].reaction.lhs[1].state");
}

fn broken_graph() -> RelationGraph {
    let mut graph = RelationGraph::new();
    for process in ["p1", "p2"] {
        graph.add_node(NodeId::process(process));
    }
    for state in ["a", "b", "c", "d", "x", "y"] {
        graph.add_node(NodeId::state(state));
    }

    graph.add_edge(EdgeKind::Consumes, NodeId::process("p2"), NodeId::state("a"));
    graph.add_edge(EdgeKind::References, NodeId::process("p2"), NodeId::reference("missing"));
    graph.add_edge(EdgeKind::IsPartOf, NodeId::process("p2"), NodeId::process("p1"));
    graph.add_edge(EdgeKind::HasDirectSubstate, NodeId::state("a"), NodeId::state("b"));
    graph.add_edge(EdgeKind::HasDirectSubstate, NodeId::state("b"), NodeId::state("a"));
    graph.add_edge(EdgeKind::HasDirectSubstate, NodeId::state("d"), NodeId::state("c"));
    graph.add_edge(EdgeKind::HasDirectSubstate, NodeId::state("b"), NodeId::state("c"));
    graph.add_edge(EdgeKind::InCompound, NodeId::state("x"), NodeId::state("y"));
    graph.add_edge(EdgeKind::InCompound, NodeId::state("y"), NodeId::state("x"));
    graph
}

#[test]
fn test_every_violation_is_reported() {
    let report = validate_relations(&broken_graph());

    assert!(!report.is_valid());
    assert_eq!(report.violations.len(), 6);
    assert_eq!(report.passed_count(), 1);
    assert_eq!(report.failed_count(), 5);
    assert_eq!(report.violations_of(RelationRule::ParticipantsResolve).count(), 0);

    let messages: Vec<&str> = report.violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "process \"p1\" neither consumes nor produces any state",
            "IsPartOf edge must point to a set, found process \"p1\"",
            "References edge points to unknown reference \"missing\"",
            "state \"c\" has more than one direct parent: state \"d\" and state \"b\"",
            "HasDirectSubstate edge from state \"b\" to state \"a\" closes a cycle",
            "InCompound edge from state \"y\" to state \"x\" closes a cycle",
        ]
    );

    let no_participants = &report.violations[0];
    assert_eq!(no_participants.edge, None);
    assert_eq!(no_participants.to, None);
}

#[test]
fn test_report_display() {
    let report = validate_relations(&broken_graph());
    let text = report.to_string();
    assert!(text.starts_with("Relation Report\n"));
    assert!(text.contains("Nodes: 8, edges: 9"));
    assert!(text.contains("[✓] Reaction participants resolve\n"));
    assert!(text.contains("[✗] Substates form a forest - FAILED: 2 violation(s)\n"));
    assert!(text.contains("Summary: 1 passed, 5 failed"));
    assert!(text.ends_with("Relations INVALID\n"));

    let valid = validate_relations(&RelationGraph::new());
    assert!(valid.to_string().contains("Summary: 6 passed, 0 failed"));
    assert!(valid.to_string().ends_with("Relations VALID\n"));
}

#[test]
fn test_violations_as_validation_errors() {
    assert!(validate_relations(&RelationGraph::new()).to_validation_errors().is_none());

    let mut graph = RelationGraph::new();
    graph.add_node_at(NodeId::process("p"), crate::validation::FieldPath::root().field("processes").index(0));
    let errors = validate_relations(&graph).to_validation_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.as_slice()[0].kind, ErrorKind::ReferentialIntegrity);
    assert_eq!(errors.as_slice()[0].path.to_string(), "processes[0]");
}

#[test]
fn test_self_loop_is_a_cycle() {
    let mut graph = RelationGraph::new();
    graph.add_node(NodeId::state("a"));
    graph.add_edge(EdgeKind::InCompound, NodeId::state("a"), NodeId::state("a"));

    let report = validate_relations(&graph);
    assert_eq!(report.violations_of(RelationRule::CompoundsAcyclic).count(), 1);
}

#[test]
fn test_long_chain_is_a_forest() {
    let mut graph = RelationGraph::new();
    let depth = 50_000;
    for level in 0..depth {
        graph.add_node(NodeId::state(level.to_string()));
    }
    for level in 1..depth {
        graph.add_edge(
            EdgeKind::HasDirectSubstate,
            NodeId::state((level - 1).to_string()),
            NodeId::state(level.to_string()),
        );
    }
    assert!(validate_relations(&graph).is_valid());
}
