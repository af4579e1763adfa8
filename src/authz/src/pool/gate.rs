//! Single-flight construction of resolvers
//!
//! [`SingleFlight`] owns the two shared tables behind every pool:
//!
//! - `resolvers`: key → resolver, written once per key on success and never
//!   evicted
//! - `gates`: key → the shared outcome of the one construction attempt in
//!   flight for that key
//!
//! A gate only lives while its attempt runs. On success the resolver is
//! cached first and the gate removed second, so a caller that finds no gate
//! is guaranteed to find the resolver. On failure the gate is removed before
//! the error is published, so the next caller starts a fresh attempt.

use std::fmt::Debug;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::runtime::Handle;
use tracing::{debug, trace, Instrument};

use super::config::{Counters, PoolConfig, PoolStats};
use crate::context::Context;
use crate::error::{AuthzError, BoxError, Result};
use crate::types::Resolver;

/// Shared completion of one construction attempt
type Gate<R> = Shared<BoxFuture<'static, Result<Resolver<R>>>>;

/// Future producing a resolver, as handed over by a pool's factory
pub(crate) type Construction<R> = BoxFuture<'static, std::result::Result<Resolver<R>, BoxError>>;

pub(crate) struct SingleFlight<K, R> {
    resolvers: DashMap<K, Resolver<R>>,
    gates: DashMap<K, Gate<R>>,
    counters: Counters,
    config: PoolConfig,
}

impl<K, R> SingleFlight<K, R>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    R: 'static,
{
    pub(crate) fn new(config: PoolConfig) -> Self {
        Self {
            resolvers: DashMap::new(),
            gates: DashMap::new(),
            counters: Counters::default(),
            config,
        }
    }

    /// Returns the cached resolver for `key`, or builds it with `construct`.
    ///
    /// `construct` is called at most once per attempt, by the caller that
    /// opens the gate. Everyone else arriving while the attempt runs joins it
    /// and receives the same outcome.
    pub(crate) async fn resolve_with<F>(
        self: &Arc<Self>,
        ctx: &Context,
        key: K,
        construct: F,
    ) -> Result<Resolver<R>>
    where
        F: FnOnce(Context, K) -> Construction<R>,
    {
        if let Some(resolver) = self.cached(&key) {
            self.counters.hit();
            trace!(pool = %self.config.name, scope = ?key, "resolver cache hit");
            return Ok(resolver);
        }

        let gate = match self.gates.entry(key.clone()) {
            Entry::Occupied(gate) => {
                self.counters.miss();
                debug!(pool = %self.config.name, scope = ?key, "joining in-flight resolver construction");
                gate.get().clone()
            }
            Entry::Vacant(slot) => {
                // an attempt may have settled since the fast path looked
                if let Some(resolver) = self.cached(&key) {
                    self.counters.hit();
                    return Ok(resolver);
                }
                self.counters.miss();
                let runtime = Handle::try_current().map_err(|err| {
                    AuthzError::Internal(format!(
                        "no Tokio runtime to construct the resolver on: {}",
                        err
                    ))
                })?;
                let gate = self.open(&runtime, ctx.clone(), key, construct);
                slot.insert(gate.clone());
                gate
            }
        };

        self.wait(ctx, gate).await
    }

    fn cached(&self, key: &K) -> Option<Resolver<R>> {
        self.resolvers.get(key).map(|entry| entry.value().clone())
    }

    /// Spawns the construction so it runs to completion even if every
    /// caller waiting on it goes away.
    fn open<F>(
        self: &Arc<Self>,
        runtime: &Handle,
        ctx: Context,
        key: K,
        construct: F,
    ) -> Gate<R>
    where
        F: FnOnce(Context, K) -> Construction<R>,
    {
        debug!(pool = %self.config.name, scope = ?key, "starting resolver construction");

        let construction = construct(ctx, key.clone());
        let flight = Arc::clone(self);
        let task_key = key.clone();
        let handle = runtime.spawn(
            async move {
                let started = Instant::now();
                let outcome = match AssertUnwindSafe(construction).catch_unwind().await {
                    Ok(Ok(resolver)) => Ok(resolver),
                    Ok(Err(err)) => Err(AuthzError::Factory(Arc::from(err))),
                    Err(_) => Err(AuthzError::FactoryPanicked {
                        scope: format!("{:?}", task_key),
                    }),
                };
                flight.settle(task_key, &outcome, started.elapsed());
                outcome
            }
            .in_current_span(),
        );

        let flight = Arc::clone(self);
        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    // the task never reached settle()
                    flight.gates.remove(&key);
                    Err(AuthzError::Internal(format!(
                        "resolver construction task did not complete: {}",
                        err
                    )))
                }
            }
        }
        .boxed()
        .shared()
    }

    fn settle(&self, key: K, outcome: &Result<Resolver<R>>, elapsed: Duration) {
        match outcome {
            Ok(resolver) => {
                self.resolvers
                    .entry(key.clone())
                    .or_insert_with(|| resolver.clone());
                self.counters.constructed();
                debug!(
                    pool = %self.config.name,
                    scope = ?key,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "resolver constructed and cached"
                );
            }
            Err(_) => {
                self.counters.failed();
                debug!(
                    pool = %self.config.name,
                    scope = ?key,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "resolver construction failed, gate reset"
                );
            }
        }
        self.gates.remove(&key);
    }

    async fn wait(&self, ctx: &Context, gate: Gate<R>) -> Result<Resolver<R>> {
        if !self.config.abandon_on_cancel {
            return gate.await;
        }

        tokio::select! {
            biased;
            outcome = gate => outcome,
            _ = ctx.cancelled() => {
                debug!(pool = %self.config.name, "caller cancelled while waiting for resolver");
                Err(AuthzError::Cancelled)
            }
        }
    }

    pub(crate) fn is_cached(&self, key: &K) -> bool {
        self.resolvers.contains_key(key)
    }

    pub(crate) fn cached_len(&self) -> usize {
        self.resolvers.len()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.gates.len()
    }

    pub(crate) fn stats(&self) -> PoolStats {
        self.counters
            .snapshot(self.resolvers.len(), self.gates.len())
    }

    pub(crate) fn config(&self) -> &PoolConfig {
        &self.config
    }
}
