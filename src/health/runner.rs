//! # Health Check Runner
//!
//! Registry of independent probes executed sequentially in registration
//! order. One probe failing, panicking or timing out never stops the others;
//! it is recorded as a `fail` result.
//!
//! A run that starts while another is in flight returns the last known
//! results without executing any probe.

use chrono::Utc;
use futures::FutureExt;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::probe::HealthProbe;
use super::types::{CheckResult, CheckStatus, HealthCheckInfo, HealthSummary, ProbeOutcome};
use crate::config::HealthConfig;
use crate::logging::log_health_check;

struct RegisteredCheck {
    name: String,
    probe: Arc<dyn HealthProbe>,
    critical: bool,
    info: HealthCheckInfo,
}

/// Clears the in-progress flag when a run ends, including on cancellation
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sequential, re-entrancy-guarded probe runner
pub struct HealthCheckRunner {
    checks: RwLock<Vec<RegisteredCheck>>,
    results: RwLock<HashMap<String, CheckResult>>,
    running: AtomicBool,
    probe_timeout: Option<Duration>,
}

impl Default for HealthCheckRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HealthCheckRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthCheckRunner")
            .field("checks", &self.check_names())
            .field("running", &self.is_running())
            .field("probe_timeout", &self.probe_timeout)
            .finish()
    }
}

impl HealthCheckRunner {
    /// Runner without a probe timeout
    pub fn new() -> Self {
        Self {
            checks: RwLock::new(Vec::new()),
            results: RwLock::new(HashMap::new()),
            running: AtomicBool::new(false),
            probe_timeout: None,
        }
    }

    pub fn from_config(config: &HealthConfig) -> Self {
        Self::new().with_probe_timeout(config.probe_timeout())
    }

    /// Bound each probe; a probe exceeding it is recorded as `fail`
    pub fn with_probe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Register a probe. A second registration under the same name replaces
    /// the first in place and discards its last result.
    pub fn register(&self, name: impl Into<String>, probe: impl HealthProbe + 'static, critical: bool) {
        let name = name.into();
        let check = RegisteredCheck {
            name: name.clone(),
            probe: Arc::new(probe),
            critical,
            info: HealthCheckInfo {
                name: name.clone(),
                critical,
                last_run: None,
                last_result: None,
            },
        };

        // Never hold `checks` and `results` at the same time
        let replaced = {
            let mut checks = self.checks.write();
            match checks.iter_mut().find(|existing| existing.name == name) {
                Some(existing) => {
                    *existing = check;
                    true
                }
                None => {
                    checks.push(check);
                    false
                }
            }
        };

        if replaced {
            debug!(check = %name, "Replaced previously registered health check");
            self.results.write().remove(&name);
        }
    }

    pub fn len(&self) -> usize {
        self.checks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.read().is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Names in registration order
    pub fn check_names(&self) -> Vec<String> {
        self.checks.read().iter().map(|check| check.name.clone()).collect()
    }

    /// Registered checks with their latest run
    pub fn checks(&self) -> Vec<HealthCheckInfo> {
        self.checks.read().iter().map(|check| check.info.clone()).collect()
    }

    /// Latest results keyed by check name
    pub fn results(&self) -> HashMap<String, CheckResult> {
        self.results.read().clone()
    }

    pub fn result(&self, name: &str) -> Option<CheckResult> {
        self.results.read().get(name).cloned()
    }

    /// Run every registered probe in order and return the results map
    pub async fn run_all_checks(&self) -> HashMap<String, CheckResult> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Health check run already in progress; returning last known results");
            return self.results();
        }
        let _running = RunningGuard(&self.running);

        let snapshot: Vec<(String, Arc<dyn HealthProbe>, bool)> = self
            .checks
            .read()
            .iter()
            .map(|check| (check.name.clone(), Arc::clone(&check.probe), check.critical))
            .collect();

        let started = Instant::now();
        info!(checks = snapshot.len(), "🏥 Health check: starting site diagnostics");

        for (name, probe, critical) in snapshot {
            let check_started = Instant::now();
            let outcome = self.execute(probe.as_ref()).await;
            let elapsed_ms = check_started.elapsed().as_secs_f64() * 1000.0;

            let result = match outcome {
                Ok(outcome) => CheckResult::from_outcome(outcome, elapsed_ms),
                Err(reason) => {
                    error!(check = %name, critical = critical, error = %reason, "❌ Health check failed to execute");
                    CheckResult::failed(reason, elapsed_ms)
                }
            };

            log_health_check(
                &name,
                &format!("{} {}", result.status.icon(), result.status),
                &result.message,
                elapsed_ms,
            );
            self.record(&name, result);
        }

        info!(
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "🏥 Health check: completed"
        );

        self.results()
    }

    async fn execute(&self, probe: &dyn HealthProbe) -> Result<ProbeOutcome, String> {
        let guarded = AssertUnwindSafe(probe.check()).catch_unwind();

        let outcome = match self.probe_timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(outcome) => outcome,
                Err(_) => return Err(format!("timed out after {}ms", limit.as_millis())),
            },
            None => guarded.await,
        };

        match outcome {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => Err(e.to_string()),
            Err(panic) => Err(panic_message(panic.as_ref())),
        }
    }

    fn record(&self, name: &str, result: CheckResult) {
        {
            let mut checks = self.checks.write();
            if let Some(check) = checks.iter_mut().find(|check| check.name == name) {
                check.info.last_run = Some(Utc::now());
                check.info.last_result = Some(result.clone());
            }
        }
        self.results.write().insert(name.to_string(), result);
    }

    /// Aggregate over the latest results. Pure; performs no I/O.
    pub fn get_health_summary(&self) -> HealthSummary {
        let total = self.len();
        let results = self.results.read();
        HealthSummary::from_statuses(total, results.values().map(|result| result.status))
    }

    /// Whether any critical check currently reports `fail`
    pub fn has_critical_failure(&self) -> bool {
        let critical: Vec<String> = self
            .checks
            .read()
            .iter()
            .filter(|check| check.critical)
            .map(|check| check.name.clone())
            .collect();

        let results = self.results.read();
        critical.iter().any(|name| {
            results
                .get(name)
                .is_some_and(|result| result.status == CheckStatus::Fail)
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
