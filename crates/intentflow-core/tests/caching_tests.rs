//! Functional tests for result caching, quota accounting and side effects.
//!
//! Guarantees exercised here:
//! - An identical request is served from the pipeline cache, much faster,
//!   under a fresh session id, with the payload unchanged.
//! - Stage outputs are shared across requests whose inputs match.
//! - Quota is charged per stage weight, the same on a hit as on a miss.
//! - Steering files land on disk and are rewritten on every request.

use intentflow_core::{
    Collaborators, DocumentKind, DocumentOptions, IntentOptions, OrchestratorConfig,
    SteeringInclusion, SteeringOptions,
};
use intentflow_test_utils::{
    fast_config, operation, setup_orchestrator_with, setup_test_orchestrator, DelayedAnalyzer,
    CHECKOUT_INTENT, REPORTING_INTENT,
};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

/// A repeated request skips every stage and returns the stored payload.
#[tokio::test]
async fn repeated_request_short_circuits() {
    let analyzer = DelayedAnalyzer::new(Duration::from_millis(60));
    let calls = analyzer.calls.clone();
    let orchestrator = setup_orchestrator_with(Collaborators::default().with_analyzer(analyzer));

    let started = Instant::now();
    let first = orchestrator.process_intent(CHECKOUT_INTENT, None).await;
    let cold = started.elapsed();

    let started = Instant::now();
    let second = orchestrator.process_intent(CHECKOUT_INTENT, None).await;
    let warm = started.elapsed();

    assert!(first.success && second.success);
    assert!(!first.metadata.cache_hit);
    assert!(second.metadata.cache_hit);
    assert!(warm * 2 <= cold, "cold {cold:?}, warm {warm:?}");
    assert_ne!(first.metadata.session_id, second.metadata.session_id);
    assert_eq!(first.payload, second.payload);
    assert_eq!(calls.count(), 1);
}

/// A cache hit reports the quota the original computation consumed.
#[tokio::test]
async fn quota_is_stable_across_hits() {
    let orchestrator = setup_test_orchestrator();

    let first = orchestrator.process_intent(REPORTING_INTENT, None).await;
    let second = orchestrator.process_intent(REPORTING_INTENT, None).await;

    assert_eq!(first.metadata.quota_used, 8);
    assert_eq!(second.metadata.quota_used, 8);
}

/// Requests that differ only in document options reuse the analysis.
#[tokio::test]
async fn stage_outputs_are_shared_between_requests() {
    let analyzer = DelayedAnalyzer::new(Duration::from_millis(1));
    let calls = analyzer.calls.clone();
    let orchestrator = setup_orchestrator_with(Collaborators::default().with_analyzer(analyzer));

    orchestrator.process_intent(CHECKOUT_INTENT, None).await;
    let with_docs = orchestrator
        .process_intent(
            CHECKOUT_INTENT,
            Some(IntentOptions::new().with_documents(DocumentOptions::new([DocumentKind::TaskPlan]))),
        )
        .await;

    assert!(!with_docs.metadata.cache_hit);
    assert!(with_docs
        .metadata
        .optimizations_applied
        .contains(&"analysis-cache-hit".to_string()));
    assert_eq!(with_docs.metadata.quota_used, 9);
    assert_eq!(calls.count(), 1);
}

/// Cost constraints are part of the forecast input.
#[tokio::test]
async fn different_budgets_are_cached_separately() {
    let orchestrator = setup_test_orchestrator();
    let optimization = orchestrator
        .analyze_workflow(vec![
            operation("op-payments", "integration", 8),
            operation("op-checkout", "frontend", 5),
        ])
        .await
        .payload
        .unwrap();

    let open = orchestrator.analyze_roi(optimization.clone(), None).await;
    let tight = orchestrator
        .analyze_roi(
            optimization,
            Some(IntentOptions::new().with_cost_constraints(intentflow_core::CostConstraints {
                max_cost_dollars: Some(1.0),
                ..Default::default()
            })),
        )
        .await;

    let open = open.payload.unwrap();
    let tight = tight.payload.unwrap();
    assert!(open.scenarios.iter().all(|s| s.within_budget));
    assert!(tight.scenarios.iter().all(|s| !s.within_budget));
}

/// Expired results are recomputed.
#[tokio::test]
async fn expired_results_are_recomputed() {
    let config = fast_config()
        .with_result_ttl(Duration::from_millis(20))
        .with_stage_ttl(Duration::from_millis(20));
    let orchestrator = intentflow_core::Orchestrator::new(config);

    orchestrator.process_intent(CHECKOUT_INTENT, None).await;
    tokio::time::sleep(Duration::from_millis(40)).await;
    let again = orchestrator.process_intent(CHECKOUT_INTENT, None).await;

    assert!(!again.metadata.cache_hit);
    assert!(!again
        .metadata
        .optimizations_applied
        .iter()
        .any(|o| o.ends_with("cache-hit")));
}

/// A full cache evicts rather than growing.
#[tokio::test]
async fn cache_respects_capacity() {
    let orchestrator =
        intentflow_core::Orchestrator::new(fast_config().with_max_entries(4));

    orchestrator.process_intent(CHECKOUT_INTENT, None).await;
    orchestrator.process_intent(REPORTING_INTENT, None).await;

    let stats = orchestrator.cache_stats();
    assert_eq!(stats.size, 4);
    assert_eq!(stats.max_entries, 4);
}

/// Steering files are written with front-matter and never pipeline-cached.
#[tokio::test]
async fn steering_files_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let steering = SteeringOptions {
        enabled: true,
        output_dir: Some(dir.path().join("steering")),
        feature_name: Some("Card Checkout".to_string()),
        inclusion: SteeringInclusion::Always,
        file_match_pattern: None,
    };
    let options = IntentOptions::new().with_documents(
        DocumentOptions::new([DocumentKind::Requirements, DocumentKind::TaskPlan])
            .with_target_date("2027-03-01")
            .with_steering(steering),
    );
    let orchestrator = setup_test_orchestrator();

    let first = orchestrator
        .process_intent(CHECKOUT_INTENT, Some(options.clone()))
        .await;
    let files = first.payload.unwrap().steering_files;

    assert_eq!(files.len(), 2);
    let expected = dir.path().join("steering").join("card-checkout-requirements.md");
    assert_eq!(files[0].path, expected);
    let content = std::fs::read_to_string(&expected).unwrap();
    assert!(content.starts_with("---\ninclusion: always\n"));
    assert!(content.contains("2027-03-01"));
    assert_eq!(files[0].bytes, content.len());

    std::fs::remove_file(&expected).unwrap();
    let second = orchestrator.process_intent(CHECKOUT_INTENT, Some(options)).await;
    assert!(!second.metadata.cache_hit);
    assert!(expected.exists());
}

/// Warmup fills the cache so later requests hit it.
#[tokio::test]
async fn warmup_populates_cache() {
    let orchestrator = intentflow_core::Orchestrator::new(
        OrchestratorConfig::default()
            .with_max_concurrency(2)
            .with_sweep_interval(Duration::ZERO),
    );

    let report = orchestrator
        .warmup_cache(vec![
            CHECKOUT_INTENT.to_string(),
            REPORTING_INTENT.to_string(),
            "   ".to_string(),
        ])
        .await;

    assert_eq!(report.requested, 3);
    assert_eq!(report.warmed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.batches, 2);

    let hit = orchestrator.process_intent(REPORTING_INTENT, None).await;
    assert!(hit.metadata.cache_hit);
}
