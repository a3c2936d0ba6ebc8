//! # Cache Manager
//!
//! Service-worker equivalent with an explicit lifecycle:
//!
//! - `on_install` populates the static partition with the app shell
//! - `on_activate` purges partitions from older versions
//! - `on_request` classifies a request and serves it with one strategy
//!
//! A platform adapter wires its install/activate/fetch events to these
//! methods. Non-GET, cross-origin and pre-activation requests are returned
//! as `FetchOutcome::Passthrough` so the adapter can let the network handle
//! them untouched.

use futures::future::join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use super::classify::{classify, RequestClass, Strategy};
use super::errors::{LifecycleError, LifecycleResult};
use super::http::{Method, Request, Response};
use super::lifecycle::{determine_target_state, ActivateResult, InstallResult, LifecycleEvent, WorkerState};
use super::scheduler::{TaskScheduler, TokioScheduler};
use super::strategy::{fetch_with_timeout, Served};
use super::sync::{self, AnalyticsOutbox, Notification, NotificationSink, SyncOutcome};
use super::traits::{CacheStorage, Network};
use crate::config::{CacheConfig, ConfigResult};
use crate::constants::sync as sync_constants;
use crate::logging::{log_cache_operation, log_error};

/// Why a request was not intercepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassthroughReason {
    NonGet,
    CrossOrigin,
    NotActivated,
}

/// Result of intercepting a request
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Not handled; the platform performs its default network fetch
    Passthrough(PassthroughReason),
    Respond {
        class: RequestClass,
        strategy: Strategy,
        served: Served,
    },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Passthrough(_) => None,
            Self::Respond { served, .. } => Some(&served.response),
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Passthrough(_) => None,
            Self::Respond { served, .. } => Some(served.response),
        }
    }
}

/// Registration details exposed to diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRegistration {
    pub worker_id: Uuid,
    pub state: WorkerState,
    pub scope: String,
    pub version: String,
}

/// Versioned cache manager
pub struct CacheManager {
    worker_id: Uuid,
    config: CacheConfig,
    origin: Url,
    static_partition: String,
    dynamic_partition: String,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    scheduler: Arc<dyn TaskScheduler>,
    state: RwLock<WorkerState>,
    analytics_outbox: Option<Arc<dyn AnalyticsOutbox>>,
    notification_sink: Option<Arc<dyn NotificationSink>>,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("worker_id", &self.worker_id)
            .field("origin", &self.origin.as_str())
            .field("static_partition", &self.static_partition)
            .field("dynamic_partition", &self.dynamic_partition)
            .field("state", &*self.state.read())
            .finish()
    }
}

impl CacheManager {
    /// Create a manager in the `Parsed` state. Background work runs on a
    /// `TokioScheduler` unless replaced with `with_scheduler`.
    pub fn new(
        config: CacheConfig,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> ConfigResult<Self> {
        let origin = config.origin_url()?;
        let static_partition = config.static_partition_name();
        let dynamic_partition = config.dynamic_partition_name();
        let worker_id = Uuid::new_v4();

        debug!(
            worker_id = %worker_id,
            static_partition = %static_partition,
            dynamic_partition = %dynamic_partition,
            "Cache manager created"
        );

        Ok(Self {
            worker_id,
            config,
            origin,
            static_partition,
            dynamic_partition,
            storage,
            network,
            scheduler: Arc::new(TokioScheduler::new()),
            state: RwLock::new(WorkerState::default()),
            analytics_outbox: None,
            notification_sink: None,
        })
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn TaskScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_analytics_outbox(mut self, outbox: Arc<dyn AnalyticsOutbox>) -> Self {
        self.analytics_outbox = Some(outbox);
        self
    }

    pub fn with_notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    pub fn worker_id(&self) -> Uuid {
        self.worker_id
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    pub fn static_partition(&self) -> &str {
        &self.static_partition
    }

    pub fn dynamic_partition(&self) -> &str {
        &self.dynamic_partition
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub(crate) fn network(&self) -> &Arc<dyn Network> {
        &self.network
    }

    pub(crate) fn scheduler(&self) -> &Arc<dyn TaskScheduler> {
        &self.scheduler
    }

    pub(crate) fn fetch_timeout(&self) -> Option<Duration> {
        self.config.fetch_timeout()
    }

    pub fn registration(&self) -> WorkerRegistration {
        WorkerRegistration {
            worker_id: self.worker_id,
            state: self.state(),
            scope: self.origin.as_str().to_string(),
            version: self.config.version.clone(),
        }
    }

    fn is_current_partition(&self, name: &str) -> bool {
        name == self.static_partition || name == self.dynamic_partition
    }

    fn transition(&self, event: LifecycleEvent) -> LifecycleResult<WorkerState> {
        let mut state = self.state.write();
        let target = determine_target_state(*state, &event)?;
        debug!(
            worker_id = %self.worker_id,
            from = %*state,
            to = %target,
            event = event.event_type(),
            "Worker lifecycle transition"
        );
        *state = target;
        Ok(target)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Populate the static partition with the app shell.
    ///
    /// All manifest assets are fetched before anything is written; a single
    /// failure aborts the install with no entries committed and leaves the
    /// worker `Redundant`.
    pub async fn on_install(&self) -> LifecycleResult<InstallResult> {
        self.transition(LifecycleEvent::Install)?;
        info!(worker_id = %self.worker_id, version = %self.config.version, "📦 Installing cache manager");

        match self.populate_static_partition().await {
            Ok(cached_assets) => {
                self.transition(LifecycleEvent::InstallSucceeded)?;
                log_cache_operation(
                    "install",
                    Some(&self.static_partition),
                    None,
                    "success",
                    Some("static assets cached"),
                );
                Ok(InstallResult {
                    partition: self.static_partition.clone(),
                    cached_assets,
                    skip_waiting: true,
                })
            }
            Err(e) => {
                log_error("cache_manager", "install", &e.to_string(), Some(&self.static_partition));
                self.transition(LifecycleEvent::InstallFailed(e.to_string()))?;
                Err(e)
            }
        }
    }

    async fn populate_static_partition(&self) -> LifecycleResult<usize> {
        let cache_failure = |source| LifecycleError::Cache {
            phase: "install".to_string(),
            source,
        };

        self.storage
            .open(&self.static_partition)
            .await
            .map_err(cache_failure)?;

        let fetches = self.config.static_manifest.iter().map(|path| async move {
            let request = match Request::for_path(Method::Get, &self.origin, path) {
                Ok(request) => request,
                Err(e) => return (path.as_str(), Err(e.to_string())),
            };
            match fetch_with_timeout(self.network.as_ref(), &request, self.fetch_timeout()).await {
                Ok(response) if response.is_ok() => (path.as_str(), Ok((request, response))),
                Ok(response) => (path.as_str(), Err(format!("status {}", response.status))),
                Err(e) => (path.as_str(), Err(e.to_string())),
            }
        });

        let mut fetched = Vec::with_capacity(self.config.static_manifest.len());
        let mut failed_assets = Vec::new();
        for (path, result) in join_all(fetches).await {
            match result {
                Ok(pair) => fetched.push(pair),
                Err(reason) => {
                    warn!(asset = path, reason = %reason, "Failed to fetch app-shell asset");
                    failed_assets.push(path.to_string());
                }
            }
        }

        if !failed_assets.is_empty() {
            return Err(LifecycleError::InstallFailed {
                reason: format!("{} of {} assets unavailable", failed_assets.len(), self.config.static_manifest.len()),
                failed_assets,
            });
        }

        let count = fetched.len();
        for (request, response) in fetched {
            self.storage
                .put(&self.static_partition, request.key(), response)
                .await
                .map_err(cache_failure)?;
        }

        Ok(count)
    }

    /// Delete every partition that is neither the current static nor the
    /// current dynamic partition, then take control of open clients.
    pub async fn on_activate(&self) -> LifecycleResult<ActivateResult> {
        self.transition(LifecycleEvent::Activate)?;
        info!(worker_id = %self.worker_id, "🔄 Activating cache manager");

        let mut result = ActivateResult::default();

        match self.storage.partition_names().await {
            Ok(names) => {
                for name in names.into_iter().filter(|name| !self.is_current_partition(name)) {
                    match self.storage.delete_partition(&name).await {
                        Ok(_) => {
                            info!(partition = %name, "Deleting old cache partition");
                            result.deleted_partitions.push(name);
                        }
                        Err(e) => {
                            error!(partition = %name, error = %e, "Failed to delete old cache partition");
                            result.failed_deletions.push((name, e.to_string()));
                        }
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to enumerate cache partitions; skipping cleanup");
            }
        }

        self.transition(LifecycleEvent::ActivationComplete)?;
        result.clients_claimed = true;

        log_cache_operation(
            "activate",
            None,
            None,
            "success",
            Some(&format!("{} stale partitions deleted", result.deleted_partitions.len())),
        );

        Ok(result)
    }

    /// Mark this worker redundant after a newer version took over
    pub fn supersede(&self) -> LifecycleResult<WorkerState> {
        self.transition(LifecycleEvent::Supersede)
    }

    // =========================================================================
    // Request interception
    // =========================================================================

    /// Serve an intercepted request
    pub async fn on_request(&self, request: &Request) -> FetchOutcome {
        if request.method != Method::Get {
            return FetchOutcome::Passthrough(PassthroughReason::NonGet);
        }

        if !request.is_same_origin(&self.origin) {
            return FetchOutcome::Passthrough(PassthroughReason::CrossOrigin);
        }

        let state = self.state();
        if !state.is_serving() {
            debug!(url = %request.url, state = %state, "Worker not activated; passing request through");
            return FetchOutcome::Passthrough(PassthroughReason::NotActivated);
        }

        let class = classify(request);
        let strategy = class.strategy();
        let served = match strategy {
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        };

        debug!(
            url = %request.url,
            class = %class,
            strategy = %strategy,
            source = ?served.source,
            status = served.response.status,
            "Request served"
        );

        FetchOutcome::Respond {
            class,
            strategy,
            served,
        }
    }

    // =========================================================================
    // Auxiliary hooks
    // =========================================================================

    /// Background sync event
    pub async fn on_sync(&self, tag: &str) -> SyncOutcome {
        if tag != sync_constants::ANALYTICS_SYNC_TAG {
            debug!(tag = tag, "Ignoring unknown sync tag");
            return SyncOutcome::Ignored;
        }

        match &self.analytics_outbox {
            Some(outbox) => sync::sync_analytics(outbox.as_ref()).await,
            None => SyncOutcome::Empty,
        }
    }

    /// Push event; returns the notification shown
    pub async fn on_push(&self, payload: Option<&[u8]>) -> Option<Notification> {
        let sink = self.notification_sink.as_ref()?;
        sync::handle_push(sink.as_ref(), payload).await
    }

    /// Notification click; returns true when a window was opened
    pub async fn on_notification_click(&self, action: &str, notification: &Notification) -> bool {
        match &self.notification_sink {
            Some(sink) => sync::handle_notification_click(sink.as_ref(), action, notification).await,
            None => false,
        }
    }
}
