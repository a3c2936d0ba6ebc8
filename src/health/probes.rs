//! # Built-in Probes
//!
//! The nine site diagnostics. Each probe reads one platform seam and maps
//! what it sees to a pass/warn/fail outcome with a short message and a data
//! payload.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::counter::ErrorCounter;
use super::platform::{
    KeyValueStorage, PageDocument, PerformanceTimings, ScriptGlobals, WorkerRegistrations,
};
use super::probe::HealthProbe;
use super::types::ProbeOutcome;
use crate::cache::strategy::fetch_with_timeout;
use crate::cache::{Method, Network, Request};
use crate::constants::checks;

/// Page load and largest-contentful-paint against their budgets
pub struct CoreWebVitalsProbe {
    timings: Arc<dyn PerformanceTimings>,
    max_load_time_ms: f64,
    max_lcp_ms: f64,
}

impl CoreWebVitalsProbe {
    pub fn new(timings: Arc<dyn PerformanceTimings>, max_load_time_ms: f64, max_lcp_ms: f64) -> Self {
        Self {
            timings,
            max_load_time_ms,
            max_lcp_ms,
        }
    }
}

#[async_trait]
impl HealthProbe for CoreWebVitalsProbe {
    async fn check(&self) -> anyhow::Result<ProbeOutcome> {
        let load_time = self.timings.navigation_load_ms().unwrap_or(0.0);
        let lcp_time = self.timings.largest_contentful_paint_ms().unwrap_or(0.0);
        let data = json!({ "loadTime": load_time, "lcpTime": lcp_time });

        if load_time > self.max_load_time_ms || lcp_time > self.max_lcp_ms {
            return Ok(ProbeOutcome::warn("Performance could be improved").with_data(data));
        }
        Ok(ProbeOutcome::pass("Performance metrics are good").with_data(data))
    }
}

/// HEAD request for every critical asset
pub struct CriticalAssetsProbe {
    network: Arc<dyn Network>,
    origin: Url,
    assets: Vec<String>,
    fetch_timeout: Option<Duration>,
}

impl CriticalAssetsProbe {
    pub fn new(network: Arc<dyn Network>, origin: Url, assets: Vec<String>) -> Self {
        Self {
            network,
            origin,
            assets,
            fetch_timeout: None,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    async fn is_reachable(&self, asset: &str) -> bool {
        let request = match Request::for_path(Method::Head, &self.origin, asset) {
            Ok(request) => request,
            Err(e) => {
                debug!(asset = asset, error = %e, "Critical asset path rejected");
                return false;
            }
        };
        match fetch_with_timeout(self.network.as_ref(), &request, self.fetch_timeout).await {
            Ok(response) => response.is_ok(),
            Err(e) => {
                debug!(asset = asset, error = %e, "Critical asset request failed");
                false
            }
        }
    }
}

#[async_trait]
impl HealthProbe for CriticalAssetsProbe {
    async fn check(&self) -> anyhow::Result<ProbeOutcome> {
        let mut failed_assets = Vec::new();
        for asset in &self.assets {
            if !self.is_reachable(asset).await {
                failed_assets.push(asset.clone());
            }
        }

        if !failed_assets.is_empty() {
            return Ok(ProbeOutcome::fail(format!(
                "Failed to load {} critical assets",
                failed_assets.len()
            ))
            .with_data(json!({ "failedAssets": failed_assets })));
        }
        Ok(ProbeOutcome::pass("All critical assets loaded successfully")
            .with_data(json!({ "assetsChecked": self.assets.len() })))
    }
}

/// Uncaught errors observed by the page
pub struct JavaScriptErrorsProbe {
    counter: ErrorCounter,
    max_error_count: u64,
}

impl JavaScriptErrorsProbe {
    pub fn new(counter: ErrorCounter, max_error_count: u64) -> Self {
        Self {
            counter,
            max_error_count,
        }
    }
}

#[async_trait]
impl HealthProbe for JavaScriptErrorsProbe {
    async fn check(&self) -> anyhow::Result<ProbeOutcome> {
        let error_count = self.counter.get();
        let data = json!({ "errorCount": error_count });

        let outcome = if error_count > self.max_error_count {
            ProbeOutcome::fail(format!("High error count: {error_count} errors detected"))
        } else if error_count > 0 {
            ProbeOutcome::warn(format!("{error_count} JavaScript errors detected"))
        } else {
            ProbeOutcome::pass("No JavaScript errors detected")
        };
        Ok(outcome.with_data(data))
    }
}

pub struct MemoryUsageProbe {
    timings: Arc<dyn PerformanceTimings>,
    max_usage_percent: f64,
}

impl MemoryUsageProbe {
    pub fn new(timings: Arc<dyn PerformanceTimings>, max_usage_percent: f64) -> Self {
        Self {
            timings,
            max_usage_percent,
        }
    }
}

#[async_trait]
impl HealthProbe for MemoryUsageProbe {
    async fn check(&self) -> anyhow::Result<ProbeOutcome> {
        // A zero limit means the platform reported no usable heap figures
        let Some(memory) = self
            .timings
            .heap_usage()
            .filter(|memory| memory.limit_bytes > 0)
        else {
            return Ok(ProbeOutcome::warn("Memory API not available"));
        };

        let usage_percent = memory.usage_percent();
        let data = json!({ "usagePercent": usage_percent, "memory": memory });

        if usage_percent > self.max_usage_percent {
            return Ok(
                ProbeOutcome::warn(format!("High memory usage: {usage_percent:.1}%")).with_data(data)
            );
        }
        Ok(ProbeOutcome::pass(format!("Memory usage normal: {usage_percent:.1}%")).with_data(data))
    }
}

/// Writes and removes a throwaway key
pub struct LocalStorageProbe {
    storage: Arc<dyn KeyValueStorage>,
}

impl LocalStorageProbe {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl HealthProbe for LocalStorageProbe {
    async fn check(&self) -> anyhow::Result<ProbeOutcome> {
        let round_trip = self
            .storage
            .set_item(checks::STORAGE_TEST_KEY, "test")
            .and_then(|()| self.storage.remove_item(checks::STORAGE_TEST_KEY));

        match round_trip {
            Ok(()) => Ok(ProbeOutcome::pass("Local storage is working")),
            Err(e) => Ok(ProbeOutcome::warn("Local storage not available")
                .with_data(json!({ "error": e.to_string() }))),
        }
    }
}

pub struct ServiceWorkerProbe {
    registrations: Arc<dyn WorkerRegistrations>,
}

impl ServiceWorkerProbe {
    pub fn new(registrations: Arc<dyn WorkerRegistrations>) -> Self {
        Self { registrations }
    }
}

#[async_trait]
impl HealthProbe for ServiceWorkerProbe {
    async fn check(&self) -> anyhow::Result<ProbeOutcome> {
        if !self.registrations.is_supported() {
            return Ok(ProbeOutcome::warn("Service Worker not supported"));
        }

        match self.registrations.registration().await {
            None => Ok(ProbeOutcome::warn("Service Worker not registered")),
            Some(registration) => Ok(ProbeOutcome::pass("Service Worker is active").with_data(json!({
                "state": registration.state.to_string(),
                "scope": registration.scope,
            }))),
        }
    }
}

/// Looks for the Google Analytics and Meta Pixel globals
pub struct AnalyticsProbe {
    globals: Arc<dyn ScriptGlobals>,
}

impl AnalyticsProbe {
    pub fn new(globals: Arc<dyn ScriptGlobals>) -> Self {
        Self { globals }
    }
}

#[async_trait]
impl HealthProbe for AnalyticsProbe {
    async fn check(&self) -> anyhow::Result<ProbeOutcome> {
        let [google, facebook] = checks::ANALYTICS_GLOBALS;
        let has_google_analytics = self.globals.is_defined(google);
        let has_facebook_pixel = self.globals.is_defined(facebook);
        let data = json!({
            "hasGoogleAnalytics": has_google_analytics,
            "hasFacebookPixel": has_facebook_pixel,
        });

        if !has_google_analytics && !has_facebook_pixel {
            return Ok(ProbeOutcome::warn("No analytics tracking detected").with_data(data));
        }
        Ok(ProbeOutcome::pass("Analytics tracking is active").with_data(data))
    }
}

pub struct SeoMetaTagsProbe {
    document: Arc<dyn PageDocument>,
    required: Vec<String>,
}

impl SeoMetaTagsProbe {
    pub fn new(document: Arc<dyn PageDocument>, required: Vec<String>) -> Self {
        Self { document, required }
    }
}

#[async_trait]
impl HealthProbe for SeoMetaTagsProbe {
    async fn check(&self) -> anyhow::Result<ProbeOutcome> {
        let missing_meta: Vec<&String> = self
            .required
            .iter()
            .filter(|name| {
                self.document
                    .meta_content(name)
                    .map_or(true, |content| content.is_empty())
            })
            .collect();

        if !missing_meta.is_empty() {
            return Ok(
                ProbeOutcome::warn(format!("Missing {} SEO meta tags", missing_meta.len()))
                    .with_data(json!({ "missingMeta": missing_meta })),
            );
        }
        Ok(ProbeOutcome::pass("All required SEO meta tags present")
            .with_data(json!({ "checkedTags": self.required.len() })))
    }
}

/// Image alt text and heading presence
pub struct AccessibilityProbe {
    document: Arc<dyn PageDocument>,
}

impl AccessibilityProbe {
    pub fn new(document: Arc<dyn PageDocument>) -> Self {
        Self { document }
    }
}

#[async_trait]
impl HealthProbe for AccessibilityProbe {
    async fn check(&self) -> anyhow::Result<ProbeOutcome> {
        let images = self.document.image_alts();
        let headings = self.document.heading_count();
        let mut issues = Vec::new();

        let missing_alt = images
            .iter()
            .filter(|alt| alt.as_deref().map_or(true, str::is_empty))
            .count();
        if missing_alt > 0 {
            issues.push(format!("{missing_alt} images missing alt text"));
        }
        if headings == 0 {
            issues.push("No heading elements found".to_string());
        }

        if !issues.is_empty() {
            return Ok(
                ProbeOutcome::warn(format!("{} accessibility issues found", issues.len()))
                    .with_data(json!({ "issues": issues })),
            );
        }
        Ok(ProbeOutcome::pass("Basic accessibility checks passed").with_data(json!({
            "imagesChecked": images.len(),
            "headingsFound": headings,
            "focusableElements": self.document.focusable_count(),
        })))
    }
}
