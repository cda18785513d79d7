//! Functional tests for the performance monitor as seen through the
//! orchestrator.

use intentflow_core::PerformanceStatus;
use intentflow_test_utils::{setup_test_orchestrator, CHECKOUT_INTENT, REPORTING_INTENT};

/// Fresh orchestrators report no activity and say so.
#[tokio::test]
async fn idle_orchestrator_has_no_recommendations_to_act_on() {
    let orchestrator = setup_test_orchestrator();
    let summary = orchestrator.performance_summary();

    assert_eq!(summary.status, PerformanceStatus::Excellent);
    assert_eq!(summary.recommendations, vec!["No executions recorded yet"]);
}

/// Successes, failures and cache hits all show up in the metrics.
#[tokio::test]
async fn executions_and_errors_are_counted() {
    let orchestrator = setup_test_orchestrator();

    orchestrator.process_intent(CHECKOUT_INTENT, None).await;
    orchestrator.process_intent(CHECKOUT_INTENT, None).await;
    orchestrator.process_intent(REPORTING_INTENT, None).await;
    orchestrator.process_intent("", None).await;

    let metrics = orchestrator.performance_metrics();
    assert_eq!(metrics.execution_count, 4);
    assert_eq!(metrics.error_count, 1);
    assert_eq!(metrics.cache_hits, 1);
    assert_eq!(metrics.cache_misses, 3);
    assert!((metrics.error_rate - 0.25).abs() < f64::EPSILON);
    // Two parallel validation sub-tasks per computed run.
    assert_eq!(metrics.parallel_operations_total, 4);

    let summary = orchestrator.performance_summary();
    assert_eq!(summary.status, PerformanceStatus::Poor);
    assert!(summary.recommendations.iter().any(|r| r.contains("Error rate")));
}

/// Reset returns the monitor to its initial state.
#[tokio::test]
async fn reset_clears_history() {
    let orchestrator = setup_test_orchestrator();
    orchestrator.process_intent(CHECKOUT_INTENT, None).await;

    orchestrator.reset_metrics();

    let metrics = orchestrator.performance_metrics();
    assert_eq!(metrics.execution_count, 0);
    assert_eq!(metrics.p95_execution_ms, 0);
    assert_eq!(
        orchestrator.performance_summary().recommendations,
        vec!["No executions recorded yet"]
    );
}
