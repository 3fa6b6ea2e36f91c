use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ltpschema::prelude::*;
use ltpschema::relation::{EdgeKind, NodeId};
use serde_json::{json, Value};

fn argon_j1l2() -> Value {
    json!({
        "type": "AtomJ1L2",
        "composition": [["Ar", 1]],
        "charge": 0,
        "electronic": {
            "config": {
                "core": {
                    "config": [{ "n": 3, "l": 1, "occupance": 5 }],
                    "term": { "S": 0.5, "L": 1, "P": -1, "J": 1.5 }
                },
                "excited": {
                    "config": [{ "n": 4, "l": 0, "occupance": 1 }],
                    "term": { "S": 0.5, "L": 0, "P": 1 }
                }
            },
            "term": { "S": 0.5, "K": 1.5, "P": -1, "J": 2 }
        }
    })
}

fn nitrogen_rotational(levels: u32) -> Value {
    let rotational: Vec<Value> = (0..levels).map(|j| json!({ "J": j })).collect();
    json!({
        "type": "HomonuclearDiatom",
        "composition": [["N", 2]],
        "charge": 0,
        "electronic": {
            "energyId": "X",
            "Lambda": 0,
            "S": 0,
            "parity": "g",
            "reflection": "+",
            "vibrational": { "v": 0, "rotational": rotational }
        }
    })
}

/// Benchmark validating loosely-typed species payloads
fn bench_validate_species(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_species");

    let argon = argon_j1l2();
    group.bench_function("atom_j1l2", |b| {
        b.iter(|| black_box(validate_species(black_box(&argon)).unwrap()));
    });

    for levels in [2, 10, 100] {
        let payload = nitrogen_rotational(levels);
        group.throughput(Throughput::Elements(levels as u64));
        group.bench_with_input(
            BenchmarkId::new("rotational_levels", levels),
            &payload,
            |b, payload| {
                b.iter(|| black_box(validate_species(payload).unwrap()));
            },
        );
    }

    group.finish();
}

/// Benchmark canonical rendering
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let argon = validate_species(&argon_j1l2()).unwrap();
    group.bench_function("atom_j1l2", |b| b.iter(|| black_box(render(black_box(&argon)))));

    let nitrogen = validate_species(&nitrogen_rotational(100)).unwrap();
    group.bench_function("rotational_compound", |b| b.iter(|| black_box(render(black_box(&nitrogen)))));

    group.finish();
}

/// Graph of `processes` processes over a chain of `processes + 1` states
fn synthetic_graph(processes: usize) -> RelationGraph {
    let mut graph = RelationGraph::new();
    for s in 0..=processes {
        graph.add_node(NodeId::state(format!("s{}", s)));
    }
    graph.add_node(NodeId::set("set"));
    graph.add_node(NodeId::reference("ref"));

    for p in 0..processes {
        let process = NodeId::process(format!("p{}", p));
        graph.add_node(process.clone());
        graph.add_edge(EdgeKind::Consumes, process.clone(), NodeId::state(format!("s{}", p)));
        graph.add_edge(EdgeKind::Produces, process.clone(), NodeId::state(format!("s{}", p + 1)));
        graph.add_edge(EdgeKind::References, process.clone(), NodeId::reference("ref"));
        graph.add_edge(EdgeKind::IsPartOf, process, NodeId::set("set"));
        graph.add_edge(
            EdgeKind::HasDirectSubstate,
            NodeId::state(format!("s{}", p)),
            NodeId::state(format!("s{}", p + 1)),
        );
    }
    graph
}

/// Benchmark the relation checks on large graphs
fn bench_validate_relations(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_relations");

    for processes in [1_000, 10_000, 100_000] {
        let graph = synthetic_graph(processes);
        group.throughput(Throughput::Elements(graph.edge_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(processes), &graph, |b, graph| {
            b.iter(|| {
                let report = validate_relations(graph);
                assert!(report.is_valid());
                black_box(report)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validate_species, bench_render, bench_validate_relations);
criterion_main!(benches);
