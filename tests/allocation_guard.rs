// tests/allocation_guard.rs

use std::collections::BTreeMap;
use std::error::Error;

use paddock::allocation::{
    ActivationReason, AllocationControls, AllocationGuard, AllocationPool, AllocationReason,
};
use paddock::errors::PaddockError;
use paddock::graph::TechGraph;
use paddock::types::NodeState;
use paddock_test_utils::builders::{TechNodeBuilder, node, season_snapshot};

type TestResult = Result<(), Box<dyn Error>>;

/// 20 engineers; A has 10, B has 5. Both in progress, C available.
fn two_projects() -> Result<(TechGraph, AllocationPool), Box<dyn Error>> {
    let graph = TechGraph::build(vec![
        node("A", NodeState::InProgress, &[]),
        node("B", NodeState::InProgress, &[]),
        TechNodeBuilder::new("C")
            .state(NodeState::Available)
            .rp_cost(100)
            .build(),
    ])?;
    let pool = AllocationPool::new(
        20,
        BTreeMap::from([("A".to_string(), 10), ("B".to_string(), 5)]),
    );
    Ok((graph, pool))
}

#[test]
fn test_pool_accounting() -> TestResult {
    let (_, pool) = two_projects()?;

    assert_eq!(pool.total_engineers(), 20);
    assert_eq!(pool.allocated("A"), 10);
    assert_eq!(pool.allocated("C"), 0);
    assert_eq!(pool.used(), 15);
    assert_eq!(pool.used_by_others("A"), 5);
    assert_eq!(pool.free(), 5);
    assert!(!pool.is_over_capacity());
    Ok(())
}

#[test]
fn test_exceeding_pool_is_rejected() -> TestResult {
    let (graph, pool) = two_projects()?;
    let guard = AllocationGuard::new(&graph, &pool);

    let proposal = guard.propose("A", 10, 10);
    assert!(!proposal.allowed);
    assert_eq!(proposal.new_amount, 20);
    assert_eq!(proposal.reason, Some(AllocationReason::PoolExhausted));
    Ok(())
}

#[test]
fn test_filling_pool_exactly_is_allowed() -> TestResult {
    let (graph, pool) = two_projects()?;
    let guard = AllocationGuard::new(&graph, &pool);

    let proposal = guard.propose("A", 10, 5);
    assert!(proposal.allowed);
    assert_eq!(proposal.new_amount, 15);
    assert_eq!(proposal.reason, None);
    Ok(())
}

#[test]
fn test_negative_allocation_is_rejected_first() -> TestResult {
    let (graph, pool) = two_projects()?;
    let guard = AllocationGuard::new(&graph, &pool);

    let proposal = guard.propose("B", 5, -10);
    assert_eq!(proposal.new_amount, -5);
    assert_eq!(proposal.reason, Some(AllocationReason::Negative));

    // Negative wins even on a node that is not active.
    let proposal = guard.propose("C", 0, -5);
    assert_eq!(proposal.reason, Some(AllocationReason::Negative));
    Ok(())
}

#[test]
fn test_inactive_or_unknown_node_is_rejected() -> TestResult {
    let (graph, pool) = two_projects()?;
    let guard = AllocationGuard::new(&graph, &pool);

    assert_eq!(
        guard.propose("C", 0, 5).reason,
        Some(AllocationReason::NodeNotActive)
    );
    assert_eq!(
        guard.propose("nope", 0, 5).reason,
        Some(AllocationReason::NodeNotActive)
    );
    Ok(())
}

#[test]
fn test_releasing_all_engineers_is_allowed() -> TestResult {
    let (graph, pool) = two_projects()?;
    let guard = AllocationGuard::new(&graph, &pool);

    let proposal = guard.propose("B", 5, -5);
    assert!(proposal.allowed);
    assert_eq!(proposal.new_amount, 0);
    Ok(())
}

#[test]
fn test_request_reads_current_allocation_from_pool() -> TestResult {
    let (graph, pool) = two_projects()?;
    let guard = AllocationGuard::new(&graph, &pool);

    let request = guard.request("A", 5)?;
    assert_eq!(request.node_id, "A");
    assert_eq!(request.new_amount, 15);
    assert_eq!(
        serde_json::to_string(&request)?,
        r#"{"node_id":"A","new_amount":15}"#
    );

    match guard.request("A", 6) {
        Err(PaddockError::AllocationRejected { node, reason }) => {
            assert_eq!(node, "A");
            assert_eq!(reason, AllocationReason::PoolExhausted);
        }
        other => panic!("Expected AllocationRejected, got: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_controls_follow_the_guard() -> TestResult {
    let graph = TechGraph::build(season_snapshot().nodes)?;
    let pool = AllocationPool::from_snapshot(&season_snapshot());
    let guard = AllocationGuard::new(&graph, &pool);

    // 10 of 20 assigned to aero_floor.
    assert_eq!(
        guard.controls("aero_floor", 5),
        AllocationControls {
            can_decrease: true,
            can_increase: true
        }
    );
    assert_eq!(
        guard.controls("aero_floor", 15),
        AllocationControls {
            can_decrease: false,
            can_increase: false
        }
    );
    assert_eq!(
        guard.controls("engine_map", 5),
        AllocationControls {
            can_decrease: false,
            can_increase: false
        }
    );
    Ok(())
}

#[test]
fn test_activation_pre_check() -> TestResult {
    let (graph, pool) = two_projects()?;
    let guard = AllocationGuard::new(&graph, &pool);

    let request = guard.check_activation("C", 100)?;
    assert_eq!(request.node_id, "C");

    match guard.check_activation("C", 99) {
        Err(PaddockError::ActivationRejected { reason, .. }) => assert_eq!(
            reason,
            ActivationReason::InsufficientResourcePoints {
                required: 100,
                available: 99
            }
        ),
        other => panic!("Expected ActivationRejected, got: {other:?}"),
    }

    match guard.check_activation("A", 1_000) {
        Err(PaddockError::ActivationRejected { reason, .. }) => {
            assert_eq!(reason, ActivationReason::NotAvailable(NodeState::InProgress));
        }
        other => panic!("Expected ActivationRejected, got: {other:?}"),
    }

    assert!(matches!(
        guard.check_activation("ghost", 1_000),
        Err(PaddockError::NodeNotFound(_))
    ));
    Ok(())
}

#[test]
fn test_stray_pool_entries_are_reported() -> TestResult {
    let (graph, _) = two_projects()?;
    let pool = AllocationPool::new(
        20,
        BTreeMap::from([
            ("A".to_string(), 5),
            ("C".to_string(), 3),
            ("gone".to_string(), 2),
        ]),
    );

    assert_eq!(pool.stray_entries(&graph), vec!["C", "gone"]);
    Ok(())
}

#[test]
fn test_rejections_are_recoverable() {
    let err = PaddockError::AllocationRejected {
        node: "A".to_string(),
        reason: AllocationReason::PoolExhausted,
    };
    assert!(err.is_recoverable());
    assert!(err.to_string().contains("not enough free engineers"));

    assert!(PaddockError::RequestFailure("timeout".into()).is_recoverable());
    assert!(!PaddockError::NodeNotFound("x".into()).is_recoverable());
}
