//! Integration tests for the relation model of stored datasets and mixtures.

use ltpschema::document::{validate_mixture, LtpMixture};
use ltpschema::prelude::*;
use ltpschema::relation::{EdgeKind, NodeId, RelationRule};
use serde_json::{json, Value};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn stored(payload: Value) -> Value {
    let species = validate_species(&payload).unwrap();
    serde_json::to_value(SerializedSpecies::new(species)).unwrap()
}

fn nitrogen(vibrational: Option<Value>) -> Value {
    let mut electronic = json!({ "energyId": "X", "Lambda": 0, "S": 0, "parity": "g", "reflection": "+" });
    if let Some(vibrational) = vibrational {
        electronic["vibrational"] = vibrational;
    }
    stored(json!({ "type": "HomonuclearDiatom", "composition": [["N", 2]], "charge": 0, "electronic": electronic }))
}

fn set(key: &str, name: &str) -> Value {
    json!({
        "_key": key,
        "versionInfo": { "version": 1, "createdOn": "2024-02-01T00:00:00Z", "status": "published" },
        "contributor": {
            "name": "Example Lab",
            "description": "",
            "contact": "lab@example.org",
            "howToReference": ""
        },
        "name": name,
        "publishedIn": "phelps",
        "description": "",
        "complete": true
    })
}

fn info(key: &str, threshold: f64, references: Value, sets: Value) -> Value {
    json!({
        "_key": key,
        "versionInfo": { "version": 1, "createdOn": "2024-02-01T00:00:00Z", "status": "published" },
        "type": "CrossSection",
        "threshold": threshold,
        "references": references,
        "isPartOf": sets,
        "data": {
            "type": "LUT",
            "labels": ["Energy", "Cross Section"],
            "units": ["eV", "m^2"],
            "values": [[threshold, 0.0], [30.0, 2.0e-21]]
        }
    })
}

fn entry(count: u32, state: &str) -> Value {
    json!({ "count": count, "state": state })
}

fn mixture(vibrational_info: Value) -> Value {
    json!({
        "sets": { "set-1": set("set-1", "Phelps"), "set-2": set("set-2", "Itikawa") },
        "references": { "phelps": { "id": "phelps", "type": "article-journal" } },
        "states": {
            "e": stored(json!({ "type": "Electron", "composition": "e", "charge": -1 })),
            "X": nitrogen(None),
            "X1": nitrogen(Some(json!({ "v": 1 }))),
            "X1J": nitrogen(Some(json!({ "v": 1, "rotational": [{ "J": 0 }, { "J": 2 }] }))),
            "N2+": stored(json!({ "type": "Unspecified", "composition": [["N", 2]], "charge": 1 }))
        },
        "processes": [
            {
                "reaction": {
                    "lhs": [entry(1, "e"), entry(1, "X")],
                    "rhs": [entry(2, "e"), entry(1, "N2+")],
                    "reversible": false,
                    "typeTags": ["Ionization"]
                },
                "info": [info("info-1", 15.6, json!(["phelps"]), json!(["set-1", "set-2"]))]
            },
            {
                "reaction": {
                    "lhs": [entry(1, "e"), entry(1, "X")],
                    "rhs": [entry(1, "e"), entry(1, "X1")],
                    "reversible": true,
                    "typeTags": ["Vibrational"]
                },
                "info": [vibrational_info]
            }
        ]
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

fn valid_mixture() -> LtpMixture {
    validate_mixture(&mixture(info("info-2", 0.29, json!(["phelps"]), json!(["set-2"])))).unwrap()
}

#[test]
fn test_mixture_memberships() {
    init_logging();
    let graph = RelationGraph::from_mixture(&valid_mixture());

    assert_eq!(
        pairs(&graph, EdgeKind::IsPartOf),
        vec![
            ("processes[0]".to_string(), "set-1".to_string()),
            ("processes[0]".to_string(), "set-2".to_string()),
            ("processes[1]".to_string(), "set-2".to_string()),
        ]
    );
    // Both set headers and both process infos cite the same source
    assert_eq!(graph.edges_of(EdgeKind::References).count(), 4);
    assert!(graph.contains(&NodeId::set("set-1")));
    assert_eq!(
        graph.node_origin(&NodeId::set("set-2")).map(|p| p.to_string()),
        Some("sets.set-2".to_string())
    );

    let report = validate_relations(&graph);
    assert!(report.is_valid(), "{}", report);
    assert!(report.to_string().ends_with("Relations VALID\n"));
}

#[test]
fn test_mixture_state_hierarchy() {
    init_logging();
    let graph = RelationGraph::from_mixture(&valid_mixture());

    let substates = pairs(&graph, EdgeKind::HasDirectSubstate);
    assert!(substates.contains(&("N2".to_string(), "X".to_string())));
    assert!(substates.contains(&("X".to_string(), "X1".to_string())));
    assert!(substates.contains(&("X1".to_string(), "X1J".to_string())));
    assert!(substates.contains(&("X1".to_string(), "N2{X^1S_g^+{1{0}}}".to_string())));
    assert!(substates.contains(&("X1".to_string(), "N2{X^1S_g^+{1{2}}}".to_string())));

    // Each state has at most one direct parent
    let mut children: Vec<&String> = substates.iter().map(|(_, child)| child).collect();
    let before = children.len();
    children.sort();
    children.dedup();
    assert_eq!(children.len(), before);

    assert_eq!(
        pairs(&graph, EdgeKind::InCompound),
        vec![
            ("N2{X^1S_g^+{1{0}}}".to_string(), "X1J".to_string()),
            ("N2{X^1S_g^+{1{2}}}".to_string(), "X1J".to_string()),
        ]
    );

    // Particles without electronic structure have no ancestors
    assert!(graph
        .edges_of(EdgeKind::HasDirectSubstate)
        .all(|e| e.to.key != "e" && e.to.key != "N2+"));
}

#[test]
fn test_mixture_dangling_keys() {
    init_logging();
    let payload = mixture(info("info-2", 0.29, json!(["unknown"]), json!(["set-3"])));

    let errors = validate_mixture(&payload).unwrap_err();
    assert!(errors.iter().all(|e| e.kind == ErrorKind::ReferentialIntegrity));
    let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "processes[1].info[0].isPartOf[0]".to_string(),
            "processes[1].info[0].references[0]".to_string(),
        ]
    );
}

#[test]
fn test_report_names_failing_rules() {
    init_logging();
    let mut graph = RelationGraph::from_mixture(&valid_mixture());
    graph.add_edge(EdgeKind::HasDirectSubstate, NodeId::state("X1J"), NodeId::state("X"));

    let report = validate_relations(&graph);
    assert!(!report.is_valid());
    assert_eq!(report.violations_of(RelationRule::SubstateForest).count(), 2);
    assert_eq!(report.failed_count(), 1);

    let text = report.to_string();
    assert!(text.contains("[✗] Substates form a forest - FAILED: 2 violation(s)"));
    assert!(text.contains("[✓] Compound states are acyclic"));
    assert!(text.ends_with("Relations INVALID\n"));
}
