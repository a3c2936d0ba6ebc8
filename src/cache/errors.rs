//! Cache manager error types

use thiserror::Error;

/// Errors raised by a partition store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
    /// Partition does not exist
    #[error("Cache partition not found: {0}")]
    PartitionNotFound(String),

    /// Store rejected the write (quota, disabled storage)
    #[error("Cache quota exceeded for partition {partition}")]
    QuotaExceeded { partition: String },

    /// Generic backend error
    #[error("Cache backend error: {0}")]
    BackendError(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised while talking to the network
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// Connection could not be established or was dropped
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Fetch exceeded the configured timeout
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors raised by worker lifecycle transitions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    /// Event not valid in the current state
    #[error("Invalid lifecycle transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    /// App-shell population failed; nothing was committed
    #[error("Install failed: {reason} (failed assets: {failed_assets:?})")]
    InstallFailed {
        reason: String,
        failed_assets: Vec<String>,
    },

    /// Partition store failed during a lifecycle phase
    #[error("Cache failure during {phase}: {source}")]
    Cache {
        phase: String,
        #[source]
        source: CacheError,
    },
}

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;
