//! # SPYLT Core Configuration
//!
//! Typed configuration for the cache manager and the health check runner.
//!
//! ## Sources
//!
//! Defaults are compiled in. An optional TOML file and `SPYLT__`-prefixed
//! environment variables override them, in that order:
//!
//! ```text
//! SPYLT__CACHE__VERSION=1.0.1
//! SPYLT__HEALTH__PROBE_TIMEOUT_MS=5000
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use spylt_core::config::SpyltConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SpyltConfig::load(Some("config/spylt.toml"))?;
//! println!("static partition: {}", config.cache.static_partition_name());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::constants::{assets, cache_names, thresholds};

pub use error::{ConfigResult, ConfigurationError};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpyltConfig {
    pub cache: CacheConfig,
    pub health: HealthConfig,
}

/// Cache manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Origin the worker is scoped to; cross-origin requests pass through
    pub origin: String,
    /// Prefix shared by every partition name
    pub name_prefix: String,
    /// Version suffix; bumping it evicts older partitions on activation
    pub version: String,
    /// App-shell paths cached at install time
    pub static_manifest: Vec<String>,
    /// Upper bound for a single network fetch (None disables the timeout)
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:5173".to_string(),
            name_prefix: cache_names::PREFIX.to_string(),
            version: cache_names::VERSION.to_string(),
            static_manifest: assets::STATIC_MANIFEST
                .iter()
                .map(|path| (*path).to_string())
                .collect(),
            fetch_timeout_ms: Some(30_000),
        }
    }
}

impl CacheConfig {
    /// Name of the long-lived app-shell partition
    pub fn static_partition_name(&self) -> String {
        format!("{}-static-v{}", self.name_prefix, self.version)
    }

    /// Name of the short-lived fetched-on-demand partition
    pub fn dynamic_partition_name(&self) -> String {
        format!("{}-dynamic-v{}", self.name_prefix, self.version)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// Parsed origin URL
    pub fn origin_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.origin).map_err(|e| {
            ConfigurationError::invalid_value("cache.origin", &self.origin, e.to_string())
        })
    }
}

/// Health check runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Upper bound for a single probe (None disables the timeout)
    pub probe_timeout_ms: Option<u64>,
    /// Assets the critical-assets probe issues HEAD requests for
    pub critical_assets: Vec<String>,
    /// Meta tag names or properties the SEO probe requires
    pub required_meta_tags: Vec<String>,
    pub max_load_time_ms: f64,
    pub max_lcp_ms: f64,
    pub max_memory_usage_percent: f64,
    pub max_error_count: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: Some(10_000),
            critical_assets: assets::CRITICAL_ASSETS
                .iter()
                .map(|path| (*path).to_string())
                .collect(),
            required_meta_tags: assets::REQUIRED_META_TAGS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            max_load_time_ms: thresholds::MAX_LOAD_TIME_MS,
            max_lcp_ms: thresholds::MAX_LCP_MS,
            max_memory_usage_percent: thresholds::MAX_MEMORY_USAGE_PERCENT,
            max_error_count: thresholds::MAX_ERROR_COUNT,
        }
    }
}

impl HealthConfig {
    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_ms.map(Duration::from_millis)
    }
}

impl SpyltConfig {
    /// Validate cross-field constraints
    pub fn validate(&self) -> ConfigResult<()> {
        if self.cache.version.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "version",
                "cache configuration",
            ));
        }

        if self.cache.name_prefix.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "name_prefix",
                "cache configuration",
            ));
        }

        self.cache.origin_url()?;

        for path in self
            .cache
            .static_manifest
            .iter()
            .chain(self.health.critical_assets.iter())
        {
            if !path.starts_with('/') {
                return Err(ConfigurationError::invalid_value(
                    "asset path",
                    path,
                    "asset paths must be origin-relative and start with '/'",
                ));
            }
        }

        if self.cache.fetch_timeout_ms == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "cache.fetch_timeout_ms",
                "0",
                "use no value to disable the timeout",
            ));
        }

        if self.health.probe_timeout_ms == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "health.probe_timeout_ms",
                "0",
                "use no value to disable the timeout",
            ));
        }

        Ok(())
    }
}
