#![allow(clippy::doc_markdown)] // Allow technical terms like SPYLT, LCP in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # SPYLT Core
//!
//! Offline caching and site health diagnostics for the SPYLT™ marketing site.
//!
//! ## Overview
//!
//! Two cooperating components, neither depending on the other:
//!
//! - **Cache Manager** ([`cache`]): a service-worker equivalent that serves
//!   same-origin GET requests from versioned cache partitions and/or the
//!   network, choosing cache-first, network-first or
//!   stale-while-revalidate by request classification.
//! - **Health Check Runner** ([`health`]): a registry of independent async
//!   probes executed sequentially, aggregated into a pass/warn/fail summary
//!   with a 0-100 score.
//!
//! ## Module Organization
//!
//! - [`cache`] - Lifecycle, classification, strategies, storage and network seams
//! - [`health`] - Runner, built-in probes and platform seams
//! - [`config`] - Layered configuration (defaults, TOML, environment)
//! - [`constants`] - Manifests, partition naming, thresholds
//! - [`error`] - Crate-level error type
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use spylt_core::cache::{CacheManager, MemoryCacheStorage, Network, Request};
//! use spylt_core::config::SpyltConfig;
//!
//! # async fn example(network: Arc<dyn Network>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = SpyltConfig::default();
//! let manager = CacheManager::new(config.cache, Arc::new(MemoryCacheStorage::new()), network)?;
//!
//! manager.on_install().await?;
//! manager.on_activate().await?;
//!
//! let outcome = manager.on_request(&Request::get("http://localhost:5173/styles.css")?).await;
//! println!("served: {:?}", outcome.response().map(|r| r.status));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod health;
pub mod logging;

pub use cache::{
    CacheManager, CacheStorage, FetchOutcome, MemoryCacheStorage, Network, Request, RequestClass,
    Response, Strategy, TokioScheduler, WorkerState,
};
pub use config::{CacheConfig, HealthConfig, SpyltConfig};
pub use error::{Result, SpyltError};
pub use health::{
    default_health_checker, CheckResult, CheckStatus, HealthCheckRunner, HealthDependencies,
    HealthProbe, HealthSummary, OverallStatus,
};
