//! # Offline Cache Module
//!
//! Service-worker equivalent that serves same-origin GET requests from
//! versioned cache partitions and/or the network.
//!
//! ## Architecture
//!
//! ```text
//! CacheManager
//!   ├── lifecycle   <- Parsed → Installing → Installed → Activating → Activated
//!   ├── classify    <- URL → RequestClass → Strategy
//!   ├── strategy    <- cache-first / network-first / stale-while-revalidate
//!   ├── scheduler   <- background revalidation tasks
//!   └── sync        <- background sync and push hooks
//!
//! CacheStorage (trait)          Network (trait)
//!   └── MemoryCacheStorage        └── provided by the platform adapter
//! ```
//!
//! ## Design Decisions
//!
//! - **Two partitions**: `{prefix}-static-v{version}` and
//!   `{prefix}-dynamic-v{version}`; bumping the version evicts the old pair
//!   on the next activation
//! - **Write-through**: ok network responses are stored before they are
//!   returned under cache-first and network-first
//! - **No escaping errors**: network failures become cached fallbacks or a
//!   plain-text 503; cache write failures are logged only

pub mod classify;
pub mod errors;
pub mod http;
pub mod lifecycle;
pub mod manager;
pub mod providers;
pub mod scheduler;
pub mod strategy;
pub mod sync;
pub mod traits;

pub use classify::{classify, classify_url, RequestClass, Strategy};
pub use errors::{CacheError, CacheResult, LifecycleError, NetworkError, NetworkResult};
pub use http::{Method, Request, RequestKey, Response};
pub use lifecycle::{ActivateResult, InstallResult, LifecycleEvent, WorkerState};
pub use manager::{CacheManager, FetchOutcome, PassthroughReason, WorkerRegistration};
pub use providers::MemoryCacheStorage;
pub use scheduler::{TaskScheduler, TokioScheduler};
pub use strategy::{ResponseSource, Served};
pub use sync::{AnalyticsOutbox, Notification, NotificationAction, NotificationSink, SyncOutcome};
pub use traits::{CacheEntry, CacheStorage, Network};
