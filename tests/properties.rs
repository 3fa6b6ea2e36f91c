//! Property-based tests for rendering, validation and relation checks.

use ltpschema::prelude::*;
use ltpschema::relation::EdgeKind;
use ltpschema::relation::NodeId;
use ltpschema::species::element::ALL_ELEMENTS;
use proptest::prelude::*;
use serde_json::json;

fn element_symbol() -> impl Strategy<Value = &'static str> {
    (0..ALL_ELEMENTS.len()).prop_map(|index| ALL_ELEMENTS[index].symbol())
}

/// True when the `HasDirectSubstate` edges of `graph` contain no cycle.
fn is_acyclic(graph: &RelationGraph, nodes: usize) -> bool {
    let mut incoming = vec![0usize; nodes];
    let mut outgoing = vec![Vec::new(); nodes];
    for edge in graph.edges_of(EdgeKind::HasDirectSubstate) {
        let from: usize = edge.from.key.parse().unwrap();
        let to: usize = edge.to.key.parse().unwrap();
        outgoing[from].push(to);
        incoming[to] += 1;
    }

    let mut ready: Vec<usize> = (0..nodes).filter(|&n| incoming[n] == 0).collect();
    let mut visited = 0;
    while let Some(node) = ready.pop() {
        visited += 1;
        for &next in &outgoing[node] {
            incoming[next] -= 1;
            if incoming[next] == 0 {
                ready.push(next);
            }
        }
    }
    visited == nodes
}

fn state_graph(nodes: usize, edges: &[(usize, usize)]) -> RelationGraph {
    let mut graph = RelationGraph::new();
    for node in 0..nodes {
        graph.add_node(NodeId::state(node.to_string()));
    }
    for &(from, to) in edges {
        graph.add_edge(
            EdgeKind::HasDirectSubstate,
            NodeId::state(from.to_string()),
            NodeId::state(to.to_string()),
        );
    }
    graph
}

proptest! {
    /// Rendering is deterministic and survives a serialization round trip
    #[test]
    fn test_unspecified_render_is_stable(
        symbol in element_symbol(),
        count in 1u32..20,
        charge in -3i64..=3,
    ) {
        let payload = json!({ "type": "Unspecified", "composition": [[symbol, count]], "charge": charge });
        let species = validate_species(&payload).unwrap();

        let first = render(&species);
        prop_assert_eq!(&render(&species), &first);
        prop_assert!(first.summary.starts_with(symbol));

        let reparsed = validate_species(&serde_json::to_value(&species).unwrap()).unwrap();
        prop_assert_eq!(render(&reparsed), first);
    }

    /// A heteronuclear diatom made of one element is always rejected
    #[test]
    fn test_heteronuclear_requires_distinct_elements(symbol in element_symbol()) {
        let errors = validate_species(&json!({
            "type": "HeteronuclearDiatom",
            "composition": [[symbol, 1], [symbol, 1]],
            "charge": 0,
            "electronic": { "energyId": "X", "Lambda": 0, "S": 0, "reflection": "+" }
        }))
        .unwrap_err();

        prop_assert!(errors.contains_kind(ErrorKind::Composition));
    }

    /// Rovibrational levels render their quantum numbers in nesting order
    #[test]
    fn test_nitrogen_levels_round_trip(v in 0u32..60, j in 0u32..120) {
        let payload = json!({
            "type": "HomonuclearDiatom",
            "composition": [["N", 2]],
            "charge": 0,
            "electronic": {
                "energyId": "X",
                "Lambda": 0,
                "S": 0,
                "parity": "g",
                "reflection": "+",
                "vibrational": { "v": v, "rotational": { "J": j } }
            }
        });

        let species = validate_species(&payload).unwrap();
        prop_assert_eq!(serde_json::to_value(&species).unwrap(), payload);
        prop_assert_eq!(render(&species).summary, format!("N2{{X^1S_g^+{{{}{{{}}}}}}}", v, j));
    }

    /// Trees, where every state has at most one parent of lower index, are valid
    #[test]
    fn test_trees_are_valid(parents in prop::collection::vec(any::<prop::sample::Index>(), 1..200)) {
        let nodes = parents.len() + 1;
        let edges: Vec<(usize, usize)> = parents
            .iter()
            .enumerate()
            .map(|(i, parent)| (parent.index(i + 1), i + 1))
            .collect();

        let report = validate_relations(&state_graph(nodes, &edges));
        prop_assert!(report.is_valid(), "{}", report);
    }

    /// A valid report implies an acyclic substate relation
    #[test]
    fn test_valid_implies_acyclic(
        nodes in 1usize..12,
        raw_edges in prop::collection::vec((0usize..12, 0usize..12), 0..20),
    ) {
        let edges: Vec<(usize, usize)> = raw_edges
            .into_iter()
            .filter(|&(from, to)| from < nodes && to < nodes)
            .collect();
        let graph = state_graph(nodes, &edges);

        if validate_relations(&graph).is_valid() {
            prop_assert!(is_acyclic(&graph, nodes));
        }
        if !is_acyclic(&graph, nodes) {
            prop_assert!(!validate_relations(&graph).is_valid());
        }
    }

    /// Without activation temperature the rate is a plain power law
    #[test]
    fn test_arrhenius_power_law(a in 1.0e-20f64..1.0e-10, b in -2.0f64..2.0, t in 1.0f64..1.0e5) {
        let rate = ExtendedArrhenius { a, b, c: 0.0 };
        prop_assert_eq!(rate.evaluate_at(t).unwrap(), a * t.powf(b));
        prop_assert_eq!(rate.evaluate(&[t, t]).unwrap(), vec![a * t.powf(b); 2]);
    }
}
