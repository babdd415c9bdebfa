// tests/tech_screen.rs

use std::error::Error;

use paddock::allocation::{ActivateRequest, AllocationRequest};
use paddock::errors::{PaddockError, ValidationError};
use paddock::layout::LayoutEngine;
use paddock::screen::{TechScreen, TechView};
use paddock::types::NodeState;
use paddock_test_utils::builders::{SnapshotBuilder, node, season_snapshot};
use paddock_test_utils::{FakeBackend, Request, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

async fn ready_screen() -> Result<(TechScreen<FakeBackend>, FakeBackend), Box<dyn Error>> {
    let backend = FakeBackend::new(season_snapshot());
    let mut screen = TechScreen::new(backend.clone(), LayoutEngine::default(), 5);
    with_timeout(screen.refresh()).await?;
    Ok((screen, backend))
}

#[tokio::test]
async fn test_refresh_builds_graph_pool_and_layout() -> TestResult {
    init_tracing();
    let (screen, backend) = ready_screen().await?;

    let model = screen.model().expect("view should be ready");
    assert_eq!(model.graph.len(), 4);
    assert_eq!(model.pool.free(), 10);
    assert_eq!(model.resource_points, 500);
    assert_eq!(model.layout.nodes.len(), 4);
    assert!(model.violations.is_empty());
    assert_eq!(backend.fetch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_allocation_goes_through_backend_then_refetches() -> TestResult {
    init_tracing();
    let (mut screen, backend) = ready_screen().await?;

    with_timeout(screen.allocate("aero_floor", 5)).await?;

    assert_eq!(
        backend.requests(),
        vec![Request::Reallocate(AllocationRequest {
            node_id: "aero_floor".to_string(),
            new_amount: 15,
        })]
    );
    assert_eq!(backend.fetch_count(), 2);

    let model = screen.model().unwrap();
    assert_eq!(model.pool.allocated("aero_floor"), 15);
    assert_eq!(model.pool.free(), 5);
    Ok(())
}

#[tokio::test]
async fn test_guard_rejection_never_reaches_backend() -> TestResult {
    init_tracing();
    let (mut screen, backend) = ready_screen().await?;

    let err = with_timeout(screen.allocate("aero_floor", 15)).await.unwrap_err();
    assert!(matches!(err, PaddockError::AllocationRejected { .. }));
    assert!(err.is_recoverable());

    assert!(backend.requests().is_empty());
    assert_eq!(backend.fetch_count(), 1);
    assert!(screen.notice().is_some());
    assert_eq!(screen.model().unwrap().pool.allocated("aero_floor"), 10);
    Ok(())
}

#[tokio::test]
async fn test_backend_refusal_keeps_confirmed_state() -> TestResult {
    init_tracing();
    let (mut screen, backend) = ready_screen().await?;
    backend.refuse_next_mutation("workload already covered");

    let err = with_timeout(screen.allocate("aero_floor", 5)).await.unwrap_err();
    assert!(err.to_string().contains("workload already covered"));
    assert_eq!(backend.requests().len(), 1);
    assert_eq!(backend.fetch_count(), 1);
    assert_eq!(screen.model().unwrap().pool.allocated("aero_floor"), 10);
    assert_eq!(
        screen.take_notice().as_deref(),
        Some("Allocation rejected for 'aero_floor': workload already covered")
    );
    assert!(screen.notice().is_none());
    Ok(())
}

#[tokio::test]
async fn test_failed_refresh_keeps_last_known_good_view() -> TestResult {
    init_tracing();
    let (mut screen, backend) = ready_screen().await?;
    backend.fail_next_fetch("connection reset");

    let err = with_timeout(screen.refresh()).await.unwrap_err();
    assert!(matches!(err, PaddockError::RequestFailure(_)));
    assert!(matches!(screen.view(), TechView::Ready(_)));
    assert_eq!(screen.model().unwrap().graph.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_invalid_graph_blocks_the_view() -> TestResult {
    init_tracing();
    let (mut screen, backend) = ready_screen().await?;
    backend.set_snapshot(
        SnapshotBuilder::new()
            .node(node("a", NodeState::Locked, &["b"]))
            .node(node("b", NodeState::Locked, &["a"]))
            .build(),
    );

    let err = with_timeout(screen.refresh()).await.unwrap_err();
    assert!(matches!(
        err,
        PaddockError::Validation(ValidationError::DependencyCycle(_))
    ));
    assert!(!err.is_recoverable());
    assert!(matches!(screen.view(), TechView::Blocked(_)));
    assert!(screen.model().is_none());
    assert!(screen.controls("a").is_none());

    // Requests are refused while blocked.
    let err = with_timeout(screen.allocate("a", 5)).await.unwrap_err();
    assert!(matches!(err, PaddockError::Validation(_)));
    assert!(backend.requests().is_empty());

    // A valid snapshot unblocks.
    backend.set_snapshot(season_snapshot());
    with_timeout(screen.refresh()).await?;
    assert!(matches!(screen.view(), TechView::Ready(_)));
    Ok(())
}

#[tokio::test]
async fn test_activation_spends_resource_points() -> TestResult {
    init_tracing();
    let (mut screen, backend) = ready_screen().await?;

    with_timeout(screen.activate("engine_map")).await?;

    assert_eq!(
        backend.requests(),
        vec![Request::Activate(ActivateRequest {
            node_id: "engine_map".to_string()
        })]
    );
    let model = screen.model().unwrap();
    assert_eq!(model.graph.node("engine_map").unwrap().state, NodeState::InProgress);
    assert_eq!(model.resource_points, 200);
    Ok(())
}

#[tokio::test]
async fn test_activation_of_locked_node_is_refused_locally() -> TestResult {
    init_tracing();
    let (mut screen, backend) = ready_screen().await?;

    let err = with_timeout(screen.activate("aero_wing")).await.unwrap_err();
    assert!(matches!(err, PaddockError::ActivationRejected { .. }));
    assert!(backend.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_transport_failure_on_mutation_is_recoverable() -> TestResult {
    init_tracing();
    let (mut screen, backend) = ready_screen().await?;
    backend.fail_next_mutation("timed out");

    let err = with_timeout(screen.activate("engine_map")).await.unwrap_err();
    assert!(matches!(err, PaddockError::RequestFailure(_)));
    assert_eq!(
        screen.model().unwrap().graph.node("engine_map").unwrap().state,
        NodeState::Available
    );

    // The next attempt goes through.
    with_timeout(screen.activate("engine_map")).await?;
    assert_eq!(backend.requests().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_controls_use_configured_step() -> TestResult {
    let (screen, _) = ready_screen().await?;

    let controls = screen.controls("aero_floor").unwrap();
    assert!(controls.can_decrease);
    assert!(controls.can_increase);

    let controls = screen.controls("aero_wing").unwrap();
    assert!(!controls.can_decrease);
    assert!(!controls.can_increase);
    Ok(())
}

#[tokio::test]
async fn test_requests_before_first_refresh_fail() -> TestResult {
    let backend = FakeBackend::new(season_snapshot());
    let mut screen = TechScreen::new(backend.clone(), LayoutEngine::default(), 5);

    assert!(matches!(screen.view(), TechView::Empty));
    let err = with_timeout(screen.allocate("aero_floor", 5)).await.unwrap_err();
    assert!(matches!(err, PaddockError::RequestFailure(_)));
    assert!(backend.requests().is_empty());
    Ok(())
}
