//! Shared error counter
//!
//! The presentation layer increments it for every uncaught error or
//! unhandled rejection; the JavaScript-errors probe reads it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cloneable handle to one counter
#[derive(Debug, Clone, Default)]
pub struct ErrorCounter {
    count: Arc<AtomicU64>,
}

impl ErrorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one error; returns the new count
    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_count() {
        let counter = ErrorCounter::new();
        let reporter = counter.clone();

        assert_eq!(reporter.increment(), 1);
        assert_eq!(reporter.increment(), 2);
        assert_eq!(counter.get(), 2);

        counter.reset();
        assert_eq!(reporter.get(), 0);
    }
}
