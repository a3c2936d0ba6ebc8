//! Cache strategies.
//!
//! Every strategy turns network failures into a response: a cached copy when
//! one exists, otherwise a plain-text 503. Nothing here returns an error to
//! the caller.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::errors::{NetworkError, NetworkResult};
use super::http::{Request, Response};
use super::manager::CacheManager;
use super::traits::{CacheEntry, CacheStorage, Network};
use crate::constants::responses;

/// Where a served response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Cache,
    Network,
    /// Generated locally because neither cache nor network could answer
    Synthetic,
}

/// Response plus its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

impl Served {
    fn cache(entry: CacheEntry) -> Self {
        Self {
            response: entry.response,
            source: ResponseSource::Cache,
        }
    }

    fn network(response: Response) -> Self {
        Self {
            response,
            source: ResponseSource::Network,
        }
    }

    fn synthetic(message: &str) -> Self {
        Self {
            response: Response::service_unavailable(message),
            source: ResponseSource::Synthetic,
        }
    }
}

/// Fetch with an optional upper bound; a timeout is a network failure
pub(crate) async fn fetch_with_timeout(
    network: &dyn Network,
    request: &Request,
    timeout: Option<Duration>,
) -> NetworkResult<Response> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, network.fetch(request))
            .await
            .map_err(|_| NetworkError::Timeout {
                timeout_ms: limit.as_millis() as u64,
            })?,
        None => network.fetch(request).await,
    }
}

/// Store an ok response; failures are logged only
async fn write_through(storage: &dyn CacheStorage, partition: &str, request: &Request, response: Response) {
    if let Err(e) = storage.put(partition, request.key(), response).await {
        warn!(
            partition = partition,
            url = %request.url,
            error = %e,
            "Cache write failed; response still served"
        );
    }
}

impl CacheManager {
    /// Look up across the current partitions, static first. Store errors
    /// count as a miss.
    async fn lookup_current(&self, request: &Request) -> Option<CacheEntry> {
        let partitions = [
            self.static_partition().to_string(),
            self.dynamic_partition().to_string(),
        ];
        match self.storage().lookup_any(&partitions, &request.key()).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(url = %request.url, error = %e, "Cache lookup failed; treating as miss");
                None
            }
        }
    }

    async fn fetch(&self, request: &Request) -> NetworkResult<Response> {
        fetch_with_timeout(self.network().as_ref(), request, self.fetch_timeout()).await
    }

    /// Serve from cache when possible; otherwise fetch and store ok
    /// responses in the static partition.
    pub async fn cache_first(&self, request: &Request) -> Served {
        if let Some(entry) = self.lookup_current(request).await {
            return Served::cache(entry);
        }

        match self.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    write_through(
                        self.storage().as_ref(),
                        self.static_partition(),
                        request,
                        response.clone(),
                    )
                    .await;
                }
                Served::network(response)
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "Cache first strategy failed");
                Served::synthetic(responses::OFFLINE_BODY)
            }
        }
    }

    /// Always try the network; ok responses overwrite the dynamic partition.
    /// Falls back to any cached copy when the network fails.
    pub async fn network_first(&self, request: &Request) -> Served {
        match self.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    write_through(
                        self.storage().as_ref(),
                        self.dynamic_partition(),
                        request,
                        response.clone(),
                    )
                    .await;
                }
                Served::network(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Network failed, trying cache");
                match self.lookup_current(request).await {
                    Some(entry) => Served::cache(entry),
                    None => Served::synthetic(responses::NETWORK_ERROR_BODY),
                }
            }
        }
    }

    /// Serve the dynamic partition's copy immediately and refresh it in the
    /// background. Without a cached copy the caller waits for the network.
    ///
    /// The refresh runs on the injected scheduler and may land after the
    /// response was returned; concurrent refreshes of one key are
    /// last-writer-wins.
    pub async fn stale_while_revalidate(&self, request: &Request) -> Served {
        let partition = self.dynamic_partition().to_string();
        let cached = match self.storage().lookup(&partition, &request.key()).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(url = %request.url, error = %e, "Cache lookup failed; treating as miss");
                None
            }
        };

        let Some(entry) = cached else {
            return match self.fetch(request).await {
                Ok(response) => {
                    if response.is_ok() {
                        write_through(self.storage().as_ref(), &partition, request, response.clone())
                            .await;
                    }
                    Served::network(response)
                }
                Err(e) => {
                    warn!(url = %request.url, error = %e, "Revalidation fetch failed with nothing cached");
                    Served::synthetic(responses::OFFLINE_BODY)
                }
            };
        };

        let storage: Arc<dyn CacheStorage> = Arc::clone(self.storage());
        let network: Arc<dyn Network> = Arc::clone(self.network());
        let timeout = self.fetch_timeout();
        let request = request.clone();

        self.scheduler().spawn(
            "stale_while_revalidate",
            async move {
                match fetch_with_timeout(network.as_ref(), &request, timeout).await {
                    Ok(response) if response.is_ok() => {
                        write_through(storage.as_ref(), &partition, &request, response).await;
                        debug!(url = %request.url, "Revalidated cached entry");
                    }
                    Ok(response) => {
                        debug!(url = %request.url, status = response.status, "Revalidation returned non-ok status; keeping cached entry");
                    }
                    Err(e) => {
                        debug!(url = %request.url, error = %e, "Revalidation failed; keeping cached entry");
                    }
                }
            }
            .boxed(),
        );

        Served::cache(entry)
    }
}
