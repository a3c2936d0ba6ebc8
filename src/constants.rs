//! # System Constants
//!
//! Partition naming, asset manifests, synthetic response bodies and probe
//! thresholds shared by the cache manager and the health check runner.

/// Partition naming
pub mod cache_names {
    pub const PREFIX: &str = "spylt";
    pub const VERSION: &str = "1.0.0";
}

/// Fixed asset lists
pub mod assets {
    /// App shell cached at install time
    pub const STATIC_MANIFEST: &[&str] = &[
        "/",
        "/index.html",
        "/images/nav-logo.svg",
        "/images/hero-img.png",
        "/images/Final.png",
        "/fonts/ProximaNova-Regular.otf",
        "/manifest.json",
    ];

    /// Assets the critical-assets probe requires to be reachable
    pub const CRITICAL_ASSETS: &[&str] = &["/images/nav-logo.svg", "/fonts/ProximaNova-Regular.otf"];

    /// Meta tags the SEO probe requires, matched on `name` or `property`
    pub const REQUIRED_META_TAGS: &[&str] =
        &["description", "og:title", "og:description", "twitter:card"];

    pub const NOTIFICATION_ICON: &str = "/images/nav-logo.svg";
}

/// Bodies of synthetic error responses
pub mod responses {
    pub const OFFLINE_BODY: &str = "Offline content not available";
    pub const NETWORK_ERROR_BODY: &str = "Network error and no cached version available";
    pub const SERVICE_UNAVAILABLE: u16 = 503;
}

/// Background sync and push
pub mod sync {
    pub const ANALYTICS_SYNC_TAG: &str = "analytics-sync";
    pub const DEFAULT_NOTIFICATION_TITLE: &str = "SPYLT™";
    pub const OPEN_ACTION: &str = "open";
    pub const CLOSE_ACTION: &str = "close";
    pub const VIBRATE_PATTERN: &[u32] = &[200, 100, 200];
}

/// Probe thresholds
pub mod thresholds {
    pub const MAX_LOAD_TIME_MS: f64 = 3000.0;
    pub const MAX_LCP_MS: f64 = 2500.0;
    pub const MAX_MEMORY_USAGE_PERCENT: f64 = 80.0;
    /// Error counts above this fail; anything above zero warns
    pub const MAX_ERROR_COUNT: u64 = 5;
}

/// Built-in probe names
pub mod checks {
    pub const CORE_WEB_VITALS: &str = "Core Web Vitals";
    pub const CRITICAL_ASSETS: &str = "Critical Assets";
    pub const JAVASCRIPT_ERRORS: &str = "JavaScript Errors";
    pub const MEMORY_USAGE: &str = "Memory Usage";
    pub const LOCAL_STORAGE: &str = "Local Storage";
    pub const SERVICE_WORKER: &str = "Service Worker";
    pub const ANALYTICS: &str = "Analytics";
    pub const SEO_META_TAGS: &str = "SEO Meta Tags";
    pub const ACCESSIBILITY: &str = "Accessibility";

    /// Throwaway key the local-storage probe writes and removes
    pub const STORAGE_TEST_KEY: &str = "spylt-health-test";
    pub const ANALYTICS_GLOBALS: [&str; 2] = ["gtag", "fbq"];
}
