//! Pool configuration and statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Configuration for a resolver pool
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Name reported in tracing events
    pub name: String,

    /// Let a waiting caller return [`AuthzError::Cancelled`] as soon as its
    /// context is cancelled. The shared construction keeps running for the
    /// other callers either way.
    ///
    /// [`AuthzError::Cancelled`]: crate::AuthzError::Cancelled
    pub abandon_on_cancel: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: "resolver-pool".to_string(),
            abandon_on_cancel: true,
        }
    }
}

impl PoolConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_abandon_on_cancel(mut self, abandon: bool) -> Self {
        self.abandon_on_cancel = abandon;
        self
    }
}

/// Pool statistics for monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Lookups answered from the resolver cache
    pub hits: u64,
    /// Lookups that had to start or join a construction
    pub misses: u64,
    /// Successful factory invocations
    pub constructions: u64,
    /// Failed (or panicked) factory invocations
    pub failures: u64,
    /// Scopes with a cached resolver
    pub cached: usize,
    /// Scopes with a construction currently in flight
    pub in_flight: usize,
}

impl PoolStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    constructions: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn constructed(&self) {
        self.constructions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failed(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, cached: usize, in_flight: usize) -> PoolStats {
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            constructions: self.constructions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            cached,
            in_flight,
        }
    }
}
