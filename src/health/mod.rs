//! # Site Health Module
//!
//! Registry of independent diagnostics plus the nine built-in probes.
//!
//! ## Architecture
//!
//! ```text
//! HealthCheckRunner
//!   ├── register(name, probe, critical)
//!   ├── run_all_checks()      <- sequential, re-entrancy guarded
//!   └── get_health_summary()  <- pure aggregate over the latest results
//!
//! Built-in probes read platform seams:
//!   PerformanceTimings  KeyValueStorage  WorkerRegistrations
//!   PageDocument        ScriptGlobals    Network  ErrorCounter
//! ```
//!
//! The runner never inspects the cache itself; the service-worker probe
//! reads the [`CacheManager`](crate::cache::CacheManager) through
//! [`WorkerRegistrations`].

pub mod counter;
pub mod document;
pub mod platform;
pub mod probe;
pub mod probes;
pub mod runner;
pub mod types;

use std::sync::Arc;

pub use counter::ErrorCounter;
pub use document::HtmlDocument;
pub use platform::{
    DeclaredGlobals, HeapUsage, KeyValueStorage, MemoryKeyValueStorage, PageDocument,
    PerformanceTimings, ScriptGlobals, StaticTimings, Unsupported, WorkerRegistrations,
};
pub use probe::{probe_fn, FnProbe, HealthProbe};
pub use probes::{
    AccessibilityProbe, AnalyticsProbe, CoreWebVitalsProbe, CriticalAssetsProbe,
    JavaScriptErrorsProbe, LocalStorageProbe, MemoryUsageProbe, SeoMetaTagsProbe,
    ServiceWorkerProbe,
};
pub use runner::HealthCheckRunner;
pub use types::{CheckResult, CheckStatus, HealthCheckInfo, HealthSummary, OverallStatus, ProbeOutcome};

use crate::cache::Network;
use crate::config::{ConfigResult, SpyltConfig};
use crate::constants::checks;

/// Everything the built-in probes observe
#[derive(Clone)]
pub struct HealthDependencies {
    pub network: Arc<dyn Network>,
    pub timings: Arc<dyn PerformanceTimings>,
    pub error_counter: ErrorCounter,
    pub storage: Arc<dyn KeyValueStorage>,
    pub registrations: Arc<dyn WorkerRegistrations>,
    pub globals: Arc<dyn ScriptGlobals>,
    pub document: Arc<dyn PageDocument>,
}

impl HealthDependencies {
    /// Dependencies with empty stand-ins for every seam except the network
    pub fn new(network: Arc<dyn Network>) -> Self {
        Self {
            network,
            timings: Arc::new(StaticTimings::default()),
            error_counter: ErrorCounter::new(),
            storage: Arc::new(MemoryKeyValueStorage::new()),
            registrations: Arc::new(Unsupported),
            globals: Arc::new(DeclaredGlobals::default()),
            document: Arc::new(HtmlDocument::default()),
        }
    }

    pub fn with_timings(mut self, timings: Arc<dyn PerformanceTimings>) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_error_counter(mut self, counter: ErrorCounter) -> Self {
        self.error_counter = counter;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_registrations(mut self, registrations: Arc<dyn WorkerRegistrations>) -> Self {
        self.registrations = registrations;
        self
    }

    /// Use a parsed page for the SEO, accessibility and analytics probes
    pub fn with_page(mut self, page: HtmlDocument) -> Self {
        let page = Arc::new(page);
        self.globals = page.clone();
        self.document = page;
        self
    }

    pub fn with_globals(mut self, globals: Arc<dyn ScriptGlobals>) -> Self {
        self.globals = globals;
        self
    }
}

impl std::fmt::Debug for HealthDependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthDependencies")
            .field("error_count", &self.error_counter.get())
            .field("service_worker_supported", &self.registrations.is_supported())
            .finish_non_exhaustive()
    }
}

/// Runner with the nine built-in probes in their canonical order
pub fn default_health_checker(
    config: &SpyltConfig,
    deps: HealthDependencies,
) -> ConfigResult<HealthCheckRunner> {
    let health = &config.health;
    let origin = config.cache.origin_url()?;
    let runner = HealthCheckRunner::from_config(health);

    runner.register(
        checks::CORE_WEB_VITALS,
        CoreWebVitalsProbe::new(
            Arc::clone(&deps.timings),
            health.max_load_time_ms,
            health.max_lcp_ms,
        ),
        true,
    );
    runner.register(
        checks::CRITICAL_ASSETS,
        CriticalAssetsProbe::new(deps.network, origin, health.critical_assets.clone())
            .with_fetch_timeout(config.cache.fetch_timeout()),
        true,
    );
    runner.register(
        checks::JAVASCRIPT_ERRORS,
        JavaScriptErrorsProbe::new(deps.error_counter, health.max_error_count),
        false,
    );
    runner.register(
        checks::MEMORY_USAGE,
        MemoryUsageProbe::new(deps.timings, health.max_memory_usage_percent),
        false,
    );
    runner.register(checks::LOCAL_STORAGE, LocalStorageProbe::new(deps.storage), false);
    runner.register(
        checks::SERVICE_WORKER,
        ServiceWorkerProbe::new(deps.registrations),
        false,
    );
    runner.register(checks::ANALYTICS, AnalyticsProbe::new(deps.globals), false);
    runner.register(
        checks::SEO_META_TAGS,
        SeoMetaTagsProbe::new(
            Arc::clone(&deps.document),
            health.required_meta_tags.clone(),
        ),
        false,
    );
    runner.register(
        checks::ACCESSIBILITY,
        AccessibilityProbe::new(deps.document),
        false,
    );

    Ok(runner)
}
