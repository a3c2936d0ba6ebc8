//! In-memory partition store
//!
//! Process-local and non-persistent. Each partition is a map from request
//! key to entry; writes replace the whole entry.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use tracing::debug;

use crate::cache::errors::CacheResult;
use crate::cache::http::{RequestKey, Response};
use crate::cache::traits::{CacheEntry, CacheStorage};

/// In-memory `CacheStorage`
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    partitions: DashMap<String, HashMap<RequestKey, CacheEntry>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn partition_names(&self) -> CacheResult<Vec<String>> {
        let mut names: Vec<String> = self
            .partitions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn open(&self, partition: &str) -> CacheResult<()> {
        self.partitions.entry(partition.to_string()).or_default();
        Ok(())
    }

    async fn delete_partition(&self, partition: &str) -> CacheResult<bool> {
        Ok(self.partitions.remove(partition).is_some())
    }

    async fn lookup(&self, partition: &str, key: &RequestKey) -> CacheResult<Option<CacheEntry>> {
        let result = self
            .partitions
            .get(partition)
            .and_then(|entries| entries.get(key).cloned());

        if result.is_some() {
            debug!(partition = partition, key = %key, "Cache HIT (memory)");
        } else {
            debug!(partition = partition, key = %key, "Cache MISS (memory)");
        }

        Ok(result)
    }

    async fn put(&self, partition: &str, key: RequestKey, response: Response) -> CacheResult<()> {
        debug!(partition = partition, key = %key, status = response.status, "Cache PUT (memory)");
        self.partitions
            .entry(partition.to_string())
            .or_default()
            .insert(key, CacheEntry::new(response));
        Ok(())
    }

    async fn entry_count(&self, partition: &str) -> CacheResult<usize> {
        Ok(self
            .partitions
            .get(partition)
            .map(|entries| entries.len())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::http::Request;

    fn key(path: &str) -> RequestKey {
        Request::get(&format!("https://spylt.example{path}"))
            .unwrap()
            .key()
    }

    #[tokio::test]
    async fn test_put_replaces_entry() {
        let storage = MemoryCacheStorage::new();
        storage.put("p", key("/a"), Response::ok("old")).await.unwrap();
        storage.put("p", key("/a"), Response::ok("new")).await.unwrap();

        let entry = storage.lookup("p", &key("/a")).await.unwrap().unwrap();
        assert_eq!(entry.response.text(), "new");
        assert_eq!(storage.entry_count("p").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_partition() {
        let storage = MemoryCacheStorage::new();
        storage.open("old").await.unwrap();
        storage.open("current").await.unwrap();

        assert!(storage.delete_partition("old").await.unwrap());
        assert!(!storage.delete_partition("old").await.unwrap());
        assert_eq!(storage.partition_names().await.unwrap(), vec!["current"]);
    }

    #[tokio::test]
    async fn test_lookup_any_respects_order() {
        let storage = MemoryCacheStorage::new();
        storage.put("first", key("/a"), Response::ok("one")).await.unwrap();
        storage.put("second", key("/a"), Response::ok("two")).await.unwrap();

        let partitions = vec!["second".to_string(), "first".to_string()];
        let entry = storage.lookup_any(&partitions, &key("/a")).await.unwrap().unwrap();
        assert_eq!(entry.response.text(), "two");

        assert!(storage
            .lookup_any(&partitions, &key("/missing"))
            .await
            .unwrap()
            .is_none());
    }
}
