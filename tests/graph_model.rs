// tests/graph_model.rs

use std::error::Error;

use paddock::errors::ValidationError;
use paddock::graph::{EffectCategory, StateViolation, TechGraph};
use paddock::types::NodeState;
use paddock_test_utils::builders::{TechNodeBuilder, node, season_snapshot};

type TestResult = Result<(), Box<dyn Error>>;

fn ids<'a>(nodes: impl IntoIterator<Item = &'a paddock::graph::TechNode>) -> Vec<&'a str> {
    nodes.into_iter().map(|n| n.node_id.as_str()).collect()
}

#[test]
fn test_build_season_tree_and_query() -> TestResult {
    let graph = TechGraph::build(season_snapshot().nodes)?;

    assert_eq!(graph.len(), 4);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(ids(graph.roots()), vec!["chassis_base"]);
    assert_eq!(
        ids(graph.dependents_of("chassis_base")),
        vec!["aero_floor", "engine_map"]
    );
    assert_eq!(ids(graph.dependencies_of("aero_wing")), vec!["aero_floor"]);
    assert!(graph.dependents_of("missing").is_empty());

    assert!(graph.is_reachable("chassis_base", "aero_wing"));
    assert!(graph.is_reachable("aero_wing", "aero_wing"));
    assert!(!graph.is_reachable("aero_wing", "chassis_base"));
    assert!(!graph.is_reachable("engine_map", "aero_wing"));
    assert!(!graph.is_reachable("missing", "aero_wing"));

    let edges: Vec<(&str, &str)> = graph
        .edges()
        .map(|(dep, n)| (dep.node_id.as_str(), n.node_id.as_str()))
        .collect();
    assert_eq!(
        edges,
        vec![
            ("chassis_base", "aero_floor"),
            ("aero_floor", "aero_wing"),
            ("chassis_base", "engine_map"),
        ]
    );
    Ok(())
}

#[test]
fn test_topological_order_puts_dependencies_first() -> TestResult {
    let graph = TechGraph::build(vec![
        node("c", NodeState::Locked, &["b"]),
        node("b", NodeState::Locked, &["a"]),
        node("a", NodeState::Completed, &[]),
    ])?;

    let order = ids(graph.topological_order());
    let pos = |id: &str| order.iter().position(|n| *n == id).unwrap();
    assert!(pos("a") < pos("b"));
    assert!(pos("b") < pos("c"));
    Ok(())
}

#[test]
fn test_unknown_dependency_is_rejected() {
    let result = TechGraph::build(vec![node("a", NodeState::Locked, &["ghost"])]);

    match result {
        Err(ValidationError::UnknownDependency { node, dependency }) => {
            assert_eq!(node, "a");
            assert_eq!(dependency, "ghost");
        }
        other => panic!("Expected UnknownDependency, got: {other:?}"),
    }
}

#[test]
fn test_self_dependency_is_rejected() {
    let result = TechGraph::build(vec![node("a", NodeState::Locked, &["a"])]);
    assert_eq!(
        result.err(),
        Some(ValidationError::SelfDependency("a".to_string()))
    );
}

#[test]
fn test_duplicate_node_is_rejected() {
    let result = TechGraph::build(vec![
        node("a", NodeState::Completed, &[]),
        node("a", NodeState::Locked, &[]),
    ]);
    assert_eq!(
        result.err(),
        Some(ValidationError::DuplicateNode("a".to_string()))
    );
}

#[test]
fn test_cycle_error_names_the_cycle() {
    let result = TechGraph::build(vec![
        node("root", NodeState::Completed, &[]),
        node("a", NodeState::Locked, &["root", "c"]),
        node("b", NodeState::Locked, &["a"]),
        node("c", NodeState::Locked, &["b"]),
    ]);

    match result {
        Err(ValidationError::DependencyCycle(path)) => {
            assert_eq!(path.first(), path.last());
            assert_eq!(path.len(), 4);
            for id in ["a", "b", "c"] {
                assert!(path.iter().any(|p| p == id), "{id} missing from {path:?}");
            }
            assert!(!path.iter().any(|p| p == "root"));

            let msg = ValidationError::DependencyCycle(path).to_string();
            assert!(msg.contains("cycle"));
            assert!(msg.contains(" -> "));
        }
        other => panic!("Expected DependencyCycle, got: {other:?}"),
    }
}

#[test]
fn test_invalid_workload_is_rejected() {
    let zero = TechNodeBuilder::new("a").workload(0.0).build();
    assert!(matches!(
        TechGraph::build(vec![zero]),
        Err(ValidationError::InvalidWorkload { .. })
    ));

    let negative = TechNodeBuilder::new("a").invested(-1.0).build();
    assert!(matches!(
        TechGraph::build(vec![negative]),
        Err(ValidationError::InvalidWorkload { .. })
    ));
}

#[test]
fn test_overshot_workload_is_audited_not_rejected() -> TestResult {
    // The last work unit can push a completed node past its base workload.
    let graph = TechGraph::build(vec![
        TechNodeBuilder::new("a")
            .workload(10.0)
            .invested(12.0)
            .state(NodeState::Completed)
            .build(),
        node("b", NodeState::Available, &["a"]),
    ])?;

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.node("a").map(|n| n.progress()), Some(1.0));
    assert_eq!(
        graph.audit_states(),
        vec![StateViolation::WorkExceedsWorkload {
            node: "a".to_string(),
            invested_work: 12.0,
            base_workload: 10.0,
        }]
    );
    Ok(())
}

#[test]
fn test_empty_graph_builds() -> TestResult {
    let graph = TechGraph::build(vec![])?;
    assert!(graph.is_empty());
    assert!(graph.roots().is_empty());
    assert!(graph.topological_order().is_empty());
    Ok(())
}

#[test]
fn test_season_snapshot_passes_state_audit() -> TestResult {
    let graph = TechGraph::build(season_snapshot().nodes)?;
    assert_eq!(graph.audit_states(), vec![]);
    Ok(())
}

#[test]
fn test_audit_flags_unlocked_node_with_incomplete_dependency() -> TestResult {
    let graph = TechGraph::build(vec![
        node("a", NodeState::InProgress, &[]),
        node("b", NodeState::Available, &["a"]),
    ])?;

    let violations = graph.audit_states();
    assert_eq!(
        violations,
        vec![StateViolation::DependencyIncomplete {
            node: "b".to_string(),
            state: NodeState::Available,
            dependency: "a".to_string(),
            dependency_state: NodeState::InProgress,
        }]
    );
    assert!(violations[0].to_string().contains("'b'"));
    Ok(())
}

#[test]
fn test_audit_checks_mutual_locks_in_both_directions() -> TestResult {
    // `low_drag` lists `high_downforce`; the lock on `low_drag` is claimed
    // because its peer is in progress.
    let graph = TechGraph::build(vec![
        TechNodeBuilder::new("high_downforce")
            .state(NodeState::InProgress)
            .build(),
        TechNodeBuilder::new("low_drag")
            .exclusive_with("high_downforce")
            .state(NodeState::MutuallyLocked)
            .build(),
        TechNodeBuilder::new("orphan_lock")
            .state(NodeState::MutuallyLocked)
            .build(),
    ])?;

    assert_eq!(
        graph.audit_states(),
        vec![StateViolation::UnclaimedMutualLock {
            node: "orphan_lock".to_string()
        }]
    );
    Ok(())
}

#[test]
fn test_audit_flags_work_on_locked_node() -> TestResult {
    let graph = TechGraph::build(vec![
        TechNodeBuilder::new("a")
            .state(NodeState::Locked)
            .invested(5.0)
            .build(),
    ])?;

    assert!(matches!(
        graph.audit_states().as_slice(),
        [StateViolation::WorkOutsideActiveState { .. }]
    ));
    Ok(())
}

#[test]
fn test_node_display_helpers() -> TestResult {
    let graph = TechGraph::build(season_snapshot().nodes)?;
    let floor = graph.node("aero_floor").unwrap();

    assert!((floor.progress() - 0.4).abs() < 1e-9);

    let labels = floor.effect_labels();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].category, EffectCategory::Aero);
    assert_eq!(labels[0].label, "DOWNFORCE");
    assert_eq!(labels[0].signed_value(), "+15");
    assert!(labels[0].is_buff());

    let base = graph.node("chassis_base").unwrap();
    let weight = &base.effect_labels()[0];
    assert_eq!(weight.category, EffectCategory::Chassis);
    assert_eq!(weight.signed_value(), "-2");
    assert!(!weight.is_buff());
    Ok(())
}
