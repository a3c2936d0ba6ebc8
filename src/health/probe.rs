//! Probe trait and closure adapter

use async_trait::async_trait;
use std::future::Future;

use super::types::ProbeOutcome;

/// Independent diagnostic. Errors are recorded as a `fail` result by the
/// runner.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self) -> anyhow::Result<ProbeOutcome>;
}

/// Probe backed by an async closure; see [`probe_fn`]
pub struct FnProbe<F> {
    f: F,
}

/// Wrap an async closure as a probe
///
/// ```rust
/// use spylt_core::health::{probe_fn, HealthCheckRunner, ProbeOutcome};
///
/// let runner = HealthCheckRunner::new();
/// runner.register("always ok", probe_fn(|| async { Ok(ProbeOutcome::pass("fine")) }), false);
/// ```
pub fn probe_fn<F, Fut>(f: F) -> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<ProbeOutcome>> + Send,
{
    FnProbe { f }
}

#[async_trait]
impl<F, Fut> HealthProbe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<ProbeOutcome>> + Send,
{
    async fn check(&self) -> anyhow::Result<ProbeOutcome> {
        (self.f)().await
    }
}
