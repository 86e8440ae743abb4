use std::{fs, path::Path};

use robustness::{
    edge::Edge,
    edgelist::{load_edge_list, NodeId},
    graph::Graph,
    history::{self, Mode},
    metrics::{diameter_and_average_path_length, giant_component_fraction},
    simulation::{
        robustness_by_attack, robustness_by_failure, FailureOptions, NoProgress, SimulationConfig,
    },
    strategy::{DegreeAttack, RemovalStrategy},
};
use serde::Deserialize;
use tempfile::TempDir;

#[derive(Deserialize)]
struct Fixture {
    edges: Vec<(NodeId, NodeId)>,
    nodes: usize,
    diameter: usize,
    attack: AttackFixture,
}

#[derive(Deserialize)]
struct AttackFixture {
    removed: Vec<NodeId>,
    diameters: Vec<f64>,
    path_lengths: Vec<f64>,
    giant_fractions: Vec<f64>,
}

fn fixture() -> Fixture {
    let raw = fs::read_to_string(Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/two_cliques.json"))
        .unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn fixture_graph(fixture: &Fixture) -> Graph<NodeId> {
    fixture.edges.iter().copied().map(Edge::from).collect()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-12, "{actual:?} vs {expected:?}");
    }
}

#[test]
fn edge_list_matches_fixture() {
    let fixture = fixture();
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/two_cliques.txt");

    let loaded = load_edge_list(&path).unwrap();

    assert_eq!(loaded.vertex_count(), fixture.nodes);
    assert_eq!(loaded, fixture_graph(&fixture));
}

#[test]
fn whole_graph_metrics() {
    let fixture = fixture();
    let graph = fixture_graph(&fixture);

    assert_eq!(diameter_and_average_path_length(&graph).diameter, fixture.diameter);
    assert_eq!(
        giant_component_fraction(&graph).unwrap(),
        fixture.edges.len() as f64 / fixture.nodes as f64
    );
}

#[test]
fn degree_attack_removes_bridge_first() {
    let fixture = fixture();
    let mut graph = fixture_graph(&fixture);
    let mut strategy = DegreeAttack;

    let mut removed = Vec::new();
    for _ in 0..fixture.attack.removed.len() {
        let (node, next) = strategy.select_and_remove(&graph).unwrap();
        removed.push(node);
        graph = next;
    }

    assert_eq!(removed, fixture.attack.removed);
}

#[test]
fn attack_history_matches_fixture() {
    let fixture = fixture();
    let graph = fixture_graph(&fixture);
    let config = SimulationConfig::new(fixture.attack.removed.len(), 1).unwrap();

    let history = robustness_by_attack(&graph, &config, &mut NoProgress).unwrap();

    assert_close(&history.diameters, &fixture.attack.diameters);
    assert_close(&history.path_lengths, &fixture.attack.path_lengths);
    assert_close(&history.giant_fractions, &fixture.attack.giant_fractions);
}

#[test]
fn stored_histories_normalize() {
    let fixture = fixture();
    let graph = fixture_graph(&fixture);
    let config = SimulationConfig::from_fraction(graph.vertex_count(), 0.75, 2).unwrap();
    let options = FailureOptions {
        runs: 4,
        seed: Some(2024),
        record_path_metrics: false,
    };
    let dir = TempDir::new().unwrap();
    let attack_path = dir.path().join("attack.txt");
    let failure_path = dir.path().join("fail.txt");

    let attack = robustness_by_attack(&graph, &config, &mut NoProgress).unwrap();
    let failure = robustness_by_failure(&graph, &config, &options, &mut NoProgress).unwrap();
    history::dump_to_path(&attack_path, &attack).unwrap();
    history::dump_failure_to_path(&failure_path, &failure).unwrap();

    let attack_series = history::load_and_normalize(&attack_path, Mode::Attack).unwrap();
    let failure_series = history::load_and_normalize(&failure_path, Mode::Failure).unwrap();

    // 6 removals sampled at iterations 0, 2 and 4.
    assert_eq!(attack_series.len(), 3);
    assert_close(&attack_series[2], &[1.0, 0.6 / (6.0 / 7.0), (1.0 / 3.0) / (6.0 / 7.0)]);
    assert_eq!(failure_series.len(), 4);
    for series in failure_series {
        assert_eq!(series.len(), 3);
        assert_eq!(series[0], 1.0);
    }
}
