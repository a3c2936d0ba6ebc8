//! Request classification and strategy selection.
//!
//! Classification is a pure function of the request URL. Predicates are
//! substring matches over the full URL and are evaluated in a fixed order:
//! static asset, then api/analytics, then dynamic asset. The first match
//! wins; anything else is `Other`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::http::Request;

/// Coarse request category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    StaticAsset,
    ApiOrAnalytics,
    DynamicAsset,
    Other,
}

/// How a request is resolved between cache and network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

impl RequestClass {
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::StaticAsset | Self::Other => Strategy::CacheFirst,
            Self::ApiOrAnalytics => Strategy::NetworkFirst,
            Self::DynamicAsset => Strategy::StaleWhileRevalidate,
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticAsset => write!(f, "static_asset"),
            Self::ApiOrAnalytics => write!(f, "api_or_analytics"),
            Self::DynamicAsset => write!(f, "dynamic_asset"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheFirst => write!(f, "cache_first"),
            Self::NetworkFirst => write!(f, "network_first"),
            Self::StaleWhileRevalidate => write!(f, "stale_while_revalidate"),
        }
    }
}

const STATIC_MARKERS: &[&str] = &[
    "/images/nav-logo.svg",
    "/images/hero-img.png",
    "/fonts/",
    ".css",
    ".js",
];
const API_MARKERS: &[&str] = &["/api/", "analytics", "tracking"];
const DYNAMIC_MARKERS: &[&str] = &["/images/", "/videos/", ".webp", ".mp4"];

pub fn is_static_asset(url: &str) -> bool {
    STATIC_MARKERS.iter().any(|marker| url.contains(marker)) || url.ends_with('/')
}

pub fn is_api_request(url: &str) -> bool {
    API_MARKERS.iter().any(|marker| url.contains(marker))
}

pub fn is_dynamic_asset(url: &str) -> bool {
    DYNAMIC_MARKERS.iter().any(|marker| url.contains(marker))
}

/// Classify a URL string
pub fn classify_url(url: &str) -> RequestClass {
    if is_static_asset(url) {
        RequestClass::StaticAsset
    } else if is_api_request(url) {
        RequestClass::ApiOrAnalytics
    } else if is_dynamic_asset(url) {
        RequestClass::DynamicAsset
    } else {
        RequestClass::Other
    }
}

/// Classify an intercepted request
pub fn classify(request: &Request) -> RequestClass {
    classify_url(request.url.as_str())
}
