//! Background task execution for work that outlives a request, such as
//! stale-while-revalidate refreshes.
//!
//! Nothing awaits a spawned task on the request path. `TokioScheduler`
//! keeps the join handles so callers (tests, graceful shutdown) can wait
//! for outstanding work with `wait_idle`.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Executor for fire-and-forget tasks
pub trait TaskScheduler: Send + Sync {
    fn spawn(&self, name: &'static str, task: BoxFuture<'static, ()>);
}

/// Spawns onto the current tokio runtime and tracks the handles
#[derive(Debug, Default)]
pub struct TokioScheduler {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked tasks that have not finished yet
    pub fn pending(&self) -> usize {
        let mut handles = self.handles.lock();
        handles.retain(|handle| !handle.is_finished());
        handles.len()
    }

    /// Wait until every task spawned so far, and any task those spawn, has
    /// finished
    pub async fn wait_idle(&self) {
        loop {
            let drained: Vec<JoinHandle<()>> = std::mem::take(&mut *self.handles.lock());
            if drained.is_empty() {
                return;
            }
            for handle in drained {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Background task ended abnormally");
                }
            }
        }
    }
}

impl TaskScheduler for TokioScheduler {
    fn spawn(&self, name: &'static str, task: BoxFuture<'static, ()>) {
        debug!(task = name, "Spawning background task");
        let handle = tokio::spawn(task);
        let mut handles = self.handles.lock();
        handles.retain(|handle| !handle.is_finished());
        handles.push(handle);
    }
}
