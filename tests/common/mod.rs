//! Shared fixtures for the integration tests
#![allow(dead_code)]

pub mod strategies;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use spylt_core::cache::{
    CacheEntry, CacheError, CacheManager, CacheResult, CacheStorage, MemoryCacheStorage, Network,
    NetworkError, NetworkResult, Request, RequestKey, Response, TokioScheduler,
};
use spylt_core::config::CacheConfig;
use spylt_core::constants::assets;

pub const ORIGIN: &str = "http://localhost:5173";

pub fn url(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

pub fn get(path: &str) -> Request {
    Request::get(&url(path)).expect("valid test url")
}

/// Scriptable origin server that counts every fetch
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, (u16, String)>>,
    offline: AtomicBool,
    fetches: AtomicUsize,
    log: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
    delay: Mutex<Option<Duration>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every app-shell asset answers 200 with `shell:{path}`
    pub fn with_app_shell() -> Self {
        let network = Self::new();
        for path in assets::STATIC_MANIFEST {
            network.route(path, 200, &format!("shell:{path}"));
        }
        network
    }

    pub fn route(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .insert(path.to_string(), (status, body.to_string()));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Hold every subsequent fetch until the returned handle is notified
    pub fn close_gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn fetched_paths(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> NetworkResult<Response> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let path = request.url.path().to_string();
        self.log.lock().push(format!("{} {}", request.method, path));

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::ConnectionFailed(format!("{path}: offline")));
        }

        let route = self.routes.lock().get(&path).cloned();
        Ok(match route {
            Some((status, body)) => Response::new(status, body).with_header("content-type", "text/plain"),
            None => Response::new(404, "not found"),
        })
    }
}

/// Manager wired to inspectable fakes
pub struct Harness {
    pub manager: CacheManager,
    pub network: Arc<FakeNetwork>,
    pub storage: Arc<MemoryCacheStorage>,
    pub scheduler: Arc<TokioScheduler>,
}

pub fn cache_config() -> CacheConfig {
    CacheConfig {
        origin: ORIGIN.to_string(),
        ..CacheConfig::default()
    }
}

pub fn harness_with(config: CacheConfig, network: FakeNetwork, storage: Arc<MemoryCacheStorage>) -> Harness {
    let network = Arc::new(network);
    let scheduler = Arc::new(TokioScheduler::new());
    let manager = CacheManager::new(config, storage.clone(), network.clone())
        .expect("valid cache config")
        .with_scheduler(scheduler.clone());

    Harness {
        manager,
        network,
        storage,
        scheduler,
    }
}

pub fn harness() -> Harness {
    harness_with(
        cache_config(),
        FakeNetwork::with_app_shell(),
        Arc::new(MemoryCacheStorage::new()),
    )
}

/// Installed and activated harness
pub async fn activated() -> Harness {
    let harness = harness();
    harness.manager.on_install().await.expect("install");
    harness.manager.on_activate().await.expect("activate");
    harness
}

/// Operations `FailingStorage` can be told to reject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    List,
    Open,
    Delete,
    Lookup,
    Put,
}

/// In-memory store whose operations can be switched to fail individually
#[derive(Default)]
pub struct FailingStorage {
    inner: MemoryCacheStorage,
    failing: Mutex<Vec<StorageOp>>,
    failed_calls: AtomicUsize,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: StorageOp) {
        self.failing.lock().push(op);
    }

    pub fn recover(&self) {
        self.failing.lock().clear();
    }

    pub fn failed_calls(&self) -> usize {
        self.failed_calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryCacheStorage {
        &self.inner
    }

    fn check(&self, op: StorageOp) -> CacheResult<()> {
        if self.failing.lock().contains(&op) {
            self.failed_calls.fetch_add(1, Ordering::SeqCst);
            return Err(CacheError::BackendError(format!("{op:?} rejected")));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for FailingStorage {
    async fn partition_names(&self) -> CacheResult<Vec<String>> {
        self.check(StorageOp::List)?;
        self.inner.partition_names().await
    }

    async fn open(&self, partition: &str) -> CacheResult<()> {
        self.check(StorageOp::Open)?;
        self.inner.open(partition).await
    }

    async fn delete_partition(&self, partition: &str) -> CacheResult<bool> {
        self.check(StorageOp::Delete)?;
        self.inner.delete_partition(partition).await
    }

    async fn lookup(&self, partition: &str, key: &RequestKey) -> CacheResult<Option<CacheEntry>> {
        self.check(StorageOp::Lookup)?;
        self.inner.lookup(partition, key).await
    }

    async fn put(&self, partition: &str, key: RequestKey, response: Response) -> CacheResult<()> {
        self.check(StorageOp::Put)?;
        self.inner.put(partition, key, response).await
    }

    async fn entry_count(&self, partition: &str) -> CacheResult<usize> {
        self.inner.entry_count(partition).await
    }
}

/// Manager over a `FailingStorage`
pub fn failing_harness() -> (CacheManager, Arc<FailingStorage>, Arc<FakeNetwork>) {
    let storage = Arc::new(FailingStorage::new());
    let network = Arc::new(FakeNetwork::with_app_shell());
    let manager = CacheManager::new(cache_config(), storage.clone(), network.clone())
        .expect("valid cache config")
        .with_scheduler(Arc::new(TokioScheduler::new()));
    (manager, storage, network)
}
