//! # Platform Seams
//!
//! Capabilities the built-in probes read from the host environment. Each is
//! a narrow trait so a probe can be exercised with a fixed stand-in.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::cache::{CacheManager, WorkerRegistration, WorkerState};

/// JS-heap style memory reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeapUsage {
    pub used_bytes: u64,
    pub limit_bytes: u64,
}

impl HeapUsage {
    /// `used / limit` as a percentage; 0 when the limit is unknown
    pub fn usage_percent(&self) -> f64 {
        if self.limit_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.limit_bytes as f64) * 100.0
    }
}

/// Page performance timings. A missing entry reads as zero.
pub trait PerformanceTimings: Send + Sync {
    fn navigation_load_ms(&self) -> Option<f64>;
    fn largest_contentful_paint_ms(&self) -> Option<f64>;
    /// `None` when the memory API is unavailable. A zero `limit_bytes` is
    /// treated the same way.
    fn heap_usage(&self) -> Option<HeapUsage>;
}

/// Fixed timings, as reported once by the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticTimings {
    pub navigation_load_ms: Option<f64>,
    pub largest_contentful_paint_ms: Option<f64>,
    pub heap_usage: Option<HeapUsage>,
}

impl PerformanceTimings for StaticTimings {
    fn navigation_load_ms(&self) -> Option<f64> {
        self.navigation_load_ms
    }

    fn largest_contentful_paint_ms(&self) -> Option<f64> {
        self.largest_contentful_paint_ms
    }

    fn heap_usage(&self) -> Option<HeapUsage> {
        self.heap_usage
    }
}

/// Synchronous key-value storage
pub trait KeyValueStorage: Send + Sync {
    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove_item(&self, key: &str) -> anyhow::Result<()>;
}

/// Process-local key-value storage
#[derive(Debug, Default)]
pub struct MemoryKeyValueStorage {
    items: DashMap<String, String>,
}

impl MemoryKeyValueStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).map(|value| value.clone())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStorage for MemoryKeyValueStorage {
    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Worker registration lookup
#[async_trait]
pub trait WorkerRegistrations: Send + Sync {
    fn is_supported(&self) -> bool {
        true
    }

    async fn registration(&self) -> Option<WorkerRegistration>;
}

/// A host without service worker support
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl WorkerRegistrations for Unsupported {
    fn is_supported(&self) -> bool {
        false
    }

    async fn registration(&self) -> Option<WorkerRegistration> {
        None
    }
}

#[async_trait]
impl WorkerRegistrations for CacheManager {
    /// A worker that has not started installing, or was discarded, has no
    /// registration.
    async fn registration(&self) -> Option<WorkerRegistration> {
        match self.state() {
            WorkerState::Parsed | WorkerState::Redundant => None,
            _ => Some(CacheManager::registration(self)),
        }
    }
}

/// Read-only view of the rendered page
pub trait PageDocument: Send + Sync {
    /// `content` of the first `<meta>` whose `name` or `property` matches
    fn meta_content(&self, name: &str) -> Option<String>;
    /// Alt text of every `<img>`, `None` where missing
    fn image_alts(&self) -> Vec<Option<String>>;
    /// Number of `h1`..`h6` elements
    fn heading_count(&self) -> usize;
    /// Number of buttons, links, inputs, selects and textareas
    fn focusable_count(&self) -> usize;
}

/// Global names defined by page scripts
pub trait ScriptGlobals: Send + Sync {
    fn is_defined(&self, name: &str) -> bool;
}

/// Explicit set of defined globals
#[derive(Debug, Clone, Default)]
pub struct DeclaredGlobals {
    names: HashSet<String>,
}

impl DeclaredGlobals {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ScriptGlobals for DeclaredGlobals {
    fn is_defined(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_usage_percent() {
        let usage = HeapUsage {
            used_bytes: 45,
            limit_bytes: 100,
        };
        assert!((usage.usage_percent() - 45.0).abs() < f64::EPSILON);

        let unknown = HeapUsage {
            used_bytes: 10,
            limit_bytes: 0,
        };
        assert_eq!(unknown.usage_percent(), 0.0);
    }

    #[test]
    fn test_memory_storage_set_and_remove() {
        let storage = MemoryKeyValueStorage::new();
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").as_deref(), Some("v"));
        storage.remove_item("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_declared_globals() {
        let globals = DeclaredGlobals::new(["gtag"]);
        assert!(globals.is_defined("gtag"));
        assert!(!globals.is_defined("fbq"));
    }

    #[tokio::test]
    async fn test_unsupported_has_no_registration() {
        assert!(!Unsupported.is_supported());
        assert!(Unsupported.registration().await.is_none());
    }
}
