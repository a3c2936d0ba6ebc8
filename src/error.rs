//! Error types for the SPYLT core.
//!

use thiserror::Error;

use crate::cache::errors::{CacheError, LifecycleError, NetworkError};
use crate::config::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpyltError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Cache error: {0}")]
    CacheError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Lifecycle error: {0}")]
    LifecycleError(String),
    #[error("Health check error: {0}")]
    HealthError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ConfigurationError> for SpyltError {
    fn from(error: ConfigurationError) -> Self {
        SpyltError::ConfigurationError(error.to_string())
    }
}

impl From<CacheError> for SpyltError {
    fn from(error: CacheError) -> Self {
        SpyltError::CacheError(error.to_string())
    }
}

impl From<NetworkError> for SpyltError {
    fn from(error: NetworkError) -> Self {
        SpyltError::NetworkError(error.to_string())
    }
}

impl From<LifecycleError> for SpyltError {
    fn from(error: LifecycleError) -> Self {
        SpyltError::LifecycleError(error.to_string())
    }
}

impl From<serde_json::Error> for SpyltError {
    fn from(error: serde_json::Error) -> Self {
        SpyltError::Internal(format!("JSON serialization error: {error}"))
    }
}

pub type Result<T> = std::result::Result<T, SpyltError>;
