//! Health check runner and the default probe set

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{activated, FakeNetwork, ORIGIN};
use spylt_core::config::SpyltConfig;
use spylt_core::constants::checks;
use spylt_core::health::{
    default_health_checker, probe_fn, CheckStatus, HealthCheckRunner, HealthDependencies,
    HealthSummary, HeapUsage, HtmlDocument, OverallStatus, ProbeOutcome, StaticTimings,
};

const HEALTHY_PAGE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta name="description" content="Protein milk that tastes like dessert">
    <meta property="og:title" content="SPYLT">
    <meta property="og:description" content="Chocolate milk for adults">
    <meta name="twitter:card" content="summary_large_image">
    <script>window.dataLayer = window.dataLayer || []; function gtag(){dataLayer.push(arguments);}</script>
  </head>
  <body>
    <nav><a href="/"><img src="/images/nav-logo.svg" alt="SPYLT"></a></nav>
    <h1>Freaking delicious</h1>
    <button>Find in stores</button>
  </body>
</html>"#;

fn config() -> SpyltConfig {
    let mut config = SpyltConfig::default();
    config.cache.origin = ORIGIN.to_string();
    config
}

fn counting_probe(
    counter: &Arc<AtomicUsize>,
    outcome: ProbeOutcome,
) -> impl spylt_core::health::HealthProbe + 'static {
    let counter = Arc::clone(counter);
    probe_fn(move || {
        let counter = Arc::clone(&counter);
        let outcome = outcome.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(outcome)
        }
    })
}

// =============================================================================
// Runner semantics
// =============================================================================

#[tokio::test]
async fn test_mixed_outcomes_summary() {
    let runner = HealthCheckRunner::new();
    runner.register("A", probe_fn(|| async { Ok(ProbeOutcome::pass("ok")) }), false);
    runner.register("B", probe_fn(|| async { Ok(ProbeOutcome::warn("meh")) }), false);
    runner.register("C", probe_fn(|| async { anyhow::bail!("x") }), true);

    let results = runner.run_all_checks().await;

    assert_eq!(results.len(), 3);
    assert_eq!(results["C"].status, CheckStatus::Fail);
    assert_eq!(results["C"].message, "Check failed: x");
    assert_eq!(
        runner.get_health_summary(),
        HealthSummary {
            total: 3,
            passed: 1,
            warnings: 1,
            failed: 1,
            score: 33,
            status: OverallStatus::Critical,
        }
    );
}

#[tokio::test]
async fn test_summary_is_idempotent() {
    let runner = HealthCheckRunner::new();
    runner.register("A", probe_fn(|| async { Ok(ProbeOutcome::pass("ok")) }), false);
    runner.register("B", probe_fn(|| async { Ok(ProbeOutcome::warn("meh")) }), false);
    runner.run_all_checks().await;

    let first = runner.get_health_summary();
    let second = runner.get_health_summary();
    assert_eq!(first, second);
    assert_eq!(first.score, 50);
    assert_eq!(first.status, OverallStatus::Warning);
}

#[tokio::test]
async fn test_zero_checks_is_healthy_with_zero_score() {
    let runner = HealthCheckRunner::new();

    let results = runner.run_all_checks().await;
    let summary = runner.get_health_summary();

    assert!(results.is_empty());
    assert_eq!(summary.total, 0);
    assert_eq!(summary.score, 0);
    assert_eq!(summary.status, OverallStatus::Healthy);
}

#[tokio::test]
async fn test_summary_before_first_run() {
    let runner = HealthCheckRunner::new();
    runner.register("A", probe_fn(|| async { Ok(ProbeOutcome::pass("ok")) }), false);

    let summary = runner.get_health_summary();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.passed, 0);
    assert_eq!(summary.score, 0);
    assert_eq!(summary.status, OverallStatus::Healthy);
}

#[tokio::test]
async fn test_probes_run_sequentially_in_registration_order() {
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let runner = HealthCheckRunner::new();
    for name in ["first", "second", "third"] {
        let order = Arc::clone(&order);
        runner.register(
            name,
            probe_fn(move || {
                let order = Arc::clone(&order);
                async move {
                    order.lock().push(format!("start:{name}"));
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    order.lock().push(format!("end:{name}"));
                    Ok(ProbeOutcome::pass(name))
                }
            }),
            false,
        );
    }

    runner.run_all_checks().await;

    assert_eq!(
        *order.lock(),
        vec![
            "start:first",
            "end:first",
            "start:second",
            "end:second",
            "start:third",
            "end:third"
        ]
    );
}

#[tokio::test]
async fn test_concurrent_run_returns_last_results_without_rerunning() {
    let runner = Arc::new(HealthCheckRunner::new());
    let executions = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(tokio::sync::Notify::new());

    {
        let executions = Arc::clone(&executions);
        let gate = Arc::clone(&gate);
        runner.register(
            "slow",
            probe_fn(move || {
                let executions = Arc::clone(&executions);
                let gate = Arc::clone(&gate);
                async move {
                    executions.fetch_add(1, Ordering::SeqCst);
                    gate.notified().await;
                    Ok(ProbeOutcome::pass("done"))
                }
            }),
            false,
        );
    }

    let background = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move { runner.run_all_checks().await })
    };

    while executions.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    assert!(runner.is_running());

    let overlapping = runner.run_all_checks().await;
    assert!(overlapping.is_empty());
    assert_eq!(executions.load(Ordering::SeqCst), 1);

    gate.notify_one();
    let results = background.await.unwrap();
    assert_eq!(results["slow"].status, CheckStatus::Pass);
    assert_eq!(executions.load(Ordering::SeqCst), 1);
    assert!(!runner.is_running());
}

#[tokio::test]
async fn test_panicking_probe_is_recorded_as_fail() {
    let runner = HealthCheckRunner::new();
    let after = Arc::new(AtomicUsize::new(0));
    runner.register(
        "explodes",
        probe_fn(|| async {
            if true {
                panic!("probe exploded");
            }
            Ok(ProbeOutcome::pass("unreachable"))
        }),
        false,
    );
    runner.register("after", counting_probe(&after, ProbeOutcome::pass("ok")), false);

    let results = runner.run_all_checks().await;

    assert_eq!(results["explodes"].status, CheckStatus::Fail);
    assert!(results["explodes"].message.contains("probe exploded"));
    assert_eq!(results["after"].status, CheckStatus::Pass);
    assert_eq!(after.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_probe_timeout_is_recorded_as_fail() {
    let runner = HealthCheckRunner::new().with_probe_timeout(Some(Duration::from_millis(20)));
    runner.register(
        "hangs",
        probe_fn(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ProbeOutcome::pass("too late"))
        }),
        true,
    );

    let results = runner.run_all_checks().await;

    assert_eq!(results["hangs"].status, CheckStatus::Fail);
    assert_eq!(results["hangs"].message, "Check failed: timed out after 20ms");
    assert!(runner.has_critical_failure());
}

#[tokio::test]
async fn test_results_persist_across_runs() {
    let runner = HealthCheckRunner::new();
    let runs = Arc::new(AtomicUsize::new(0));
    runner.register("counted", counting_probe(&runs, ProbeOutcome::pass("ok")), false);

    runner.run_all_checks().await;
    runner.run_all_checks().await;

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(runner.results().len(), 1);
    assert!(runner.result("counted").unwrap().execution_time_ms >= 0.0);
}

// =============================================================================
// Default checker
// =============================================================================

#[tokio::test]
async fn test_default_checker_registers_nine_probes_in_order() {
    let deps = HealthDependencies::new(Arc::new(FakeNetwork::with_app_shell()));
    let runner = default_health_checker(&config(), deps).unwrap();

    assert_eq!(
        runner.check_names(),
        vec![
            checks::CORE_WEB_VITALS,
            checks::CRITICAL_ASSETS,
            checks::JAVASCRIPT_ERRORS,
            checks::MEMORY_USAGE,
            checks::LOCAL_STORAGE,
            checks::SERVICE_WORKER,
            checks::ANALYTICS,
            checks::SEO_META_TAGS,
            checks::ACCESSIBILITY,
        ]
    );
    let critical: Vec<String> = runner
        .checks()
        .into_iter()
        .filter(|check| check.critical)
        .map(|check| check.name)
        .collect();
    assert_eq!(critical, vec![checks::CORE_WEB_VITALS, checks::CRITICAL_ASSETS]);
}

#[tokio::test]
async fn test_default_checker_on_healthy_site() {
    let site = activated().await;
    let network = Arc::clone(&site.network);
    let manager = Arc::new(site.manager);

    let deps = HealthDependencies::new(network.clone())
        .with_timings(Arc::new(StaticTimings {
            navigation_load_ms: Some(1400.0),
            largest_contentful_paint_ms: Some(1900.0),
            heap_usage: Some(HeapUsage {
                used_bytes: 30,
                limit_bytes: 100,
            }),
        }))
        .with_registrations(manager)
        .with_page(HtmlDocument::parse(HEALTHY_PAGE).unwrap());
    let runner = default_health_checker(&config(), deps).unwrap();

    let results = runner.run_all_checks().await;

    for (name, result) in &results {
        assert_eq!(result.status, CheckStatus::Pass, "{name}: {}", result.message);
    }
    assert_eq!(results[checks::SERVICE_WORKER].data["state"], "activated");
    assert_eq!(results[checks::ACCESSIBILITY].data["focusableElements"], 2);
    assert!(network
        .fetched_paths()
        .contains(&"HEAD /fonts/ProximaNova-Regular.otf".to_string()));

    let summary = runner.get_health_summary();
    assert_eq!(summary.score, 100);
    assert_eq!(summary.status, OverallStatus::Healthy);
}

#[tokio::test]
async fn test_default_checker_degraded_site() {
    let network = FakeNetwork::with_app_shell();
    network.route("/images/nav-logo.svg", 500, "oops");
    let deps = HealthDependencies::new(Arc::new(network))
        .with_page(HtmlDocument::parse("<html><body><img src='/x.png'></body></html>").unwrap());
    for _ in 0..2 {
        deps.error_counter.increment();
    }
    let runner = default_health_checker(&config(), deps).unwrap();

    let results = runner.run_all_checks().await;

    assert_eq!(results[checks::CRITICAL_ASSETS].status, CheckStatus::Fail);
    assert_eq!(
        results[checks::CRITICAL_ASSETS].data["failedAssets"],
        serde_json::json!(["/images/nav-logo.svg"])
    );
    assert_eq!(results[checks::JAVASCRIPT_ERRORS].status, CheckStatus::Warn);
    assert_eq!(results[checks::MEMORY_USAGE].message, "Memory API not available");
    assert_eq!(results[checks::LOCAL_STORAGE].status, CheckStatus::Pass);
    assert_eq!(results[checks::SERVICE_WORKER].message, "Service Worker not supported");
    assert_eq!(results[checks::ANALYTICS].status, CheckStatus::Warn);
    assert_eq!(results[checks::SEO_META_TAGS].message, "Missing 4 SEO meta tags");
    assert_eq!(results[checks::ACCESSIBILITY].message, "2 accessibility issues found");

    let summary = runner.get_health_summary();
    assert_eq!(summary.total, 9);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.warnings, 6);
    assert_eq!(summary.score, 22);
    assert!(runner.has_critical_failure());
}
