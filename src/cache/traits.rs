//! Platform seams for the cache manager
//!
//! A platform adapter implements `CacheStorage` over its cache API and
//! `Network` over its fetch primitive. The in-memory store in
//! `providers::memory` is used by default and in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::{CacheResult, NetworkResult};
use super::http::{Request, RequestKey, Response};

/// Stored response plus capture time
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub response: Response,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(response: Response) -> Self {
        Self {
            response,
            cached_at: Utc::now(),
        }
    }
}

/// Named partitions of request → response entries
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Names of all existing partitions
    async fn partition_names(&self) -> CacheResult<Vec<String>>;

    /// Create the partition if missing
    async fn open(&self, partition: &str) -> CacheResult<()>;

    /// Delete a partition; `Ok(false)` when it did not exist
    async fn delete_partition(&self, partition: &str) -> CacheResult<bool>;

    /// Look up a key in one partition
    async fn lookup(&self, partition: &str, key: &RequestKey) -> CacheResult<Option<CacheEntry>>;

    /// Write an entry, fully replacing any previous entry for the key
    async fn put(&self, partition: &str, key: RequestKey, response: Response) -> CacheResult<()>;

    /// Number of entries in a partition (0 when missing)
    async fn entry_count(&self, partition: &str) -> CacheResult<usize>;

    /// Look up a key across partitions, in the given order
    async fn lookup_any(
        &self,
        partitions: &[String],
        key: &RequestKey,
    ) -> CacheResult<Option<CacheEntry>> {
        for partition in partitions {
            if let Some(entry) = self.lookup(partition, key).await? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }
}

/// Network fetch primitive
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request. Non-2xx statuses are `Ok` responses; only
    /// transport failures are errors.
    async fn fetch(&self, request: &Request) -> NetworkResult<Response>;
}
