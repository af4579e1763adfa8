//! Scoped resolver pool backed by a single factory

use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use futures::FutureExt;

use super::config::{PoolConfig, PoolStats};
use super::factory::ResolverFactory;
use super::gate::SingleFlight;
use crate::context::Context;
use crate::error::Result;
use crate::types::{Resolver, Right};

/// Thread-safe cache of resolvers keyed by scope
///
/// The factory runs at most once per scope among concurrent callers. A
/// successful result is cached for the lifetime of the pool; a failed one is
/// returned to every caller that waited on it and the next call retries.
/// Callers for different scopes never wait on each other.
///
/// Resolution spawns the factory onto the current Tokio runtime, so
/// [`resolve`](Self::resolve) must be called from within one.
///
/// # Examples
///
/// ```
/// use scoped_authz::{BoxError, Context, Resolver, ResolverPool, Right};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // rights that are multiples of the scope are granted
/// let pool = ResolverPool::new(|_ctx: Context, n: Right| async move {
///     Ok::<_, BoxError>(Resolver::new(move |r: &Right| r % n == 0))
/// });
///
/// let resolver = pool.resolve(&Context::new(), 3).await?;
/// assert!(resolver.check(&9));
/// assert!(!resolver.check(&10));
/// # Ok(())
/// # }
/// ```
pub struct ResolverPool<S, R = Right> {
    factory: Arc<dyn ResolverFactory<S, R>>,
    flight: Arc<SingleFlight<S, R>>,
}

impl<S, R> ResolverPool<S, R>
where
    S: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    R: 'static,
{
    /// Creates a pool with the default configuration
    pub fn new<F>(factory: F) -> Self
    where
        F: ResolverFactory<S, R> + 'static,
    {
        Self::with_config(factory, PoolConfig::default())
    }

    /// Creates a pool with a custom configuration
    pub fn with_config<F>(factory: F, config: PoolConfig) -> Self
    where
        F: ResolverFactory<S, R> + 'static,
    {
        Self::from_factory(Arc::new(factory), config)
    }

    /// Creates a pool around an already shared factory
    pub fn from_factory(factory: Arc<dyn ResolverFactory<S, R>>, config: PoolConfig) -> Self {
        Self {
            factory,
            flight: Arc::new(SingleFlight::new(config)),
        }
    }

    /// Returns the resolver for `scope`, building it if needed.
    ///
    /// `ctx` is forwarded to the factory when this call starts the
    /// construction. Factory errors are returned unchanged (wrapped in
    /// [`AuthzError::Factory`](crate::AuthzError::Factory)) and never cached.
    pub async fn resolve(&self, ctx: &Context, scope: S) -> Result<Resolver<R>> {
        let factory = Arc::clone(&self.factory);
        self.flight
            .resolve_with(ctx, scope, move |ctx, scope| {
                async move { factory.build(&ctx, &scope).await }.boxed()
            })
            .await
    }

    /// Whether a resolver is cached for `scope`
    pub fn is_cached(&self, scope: &S) -> bool {
        self.flight.is_cached(scope)
    }

    /// Number of cached resolvers
    pub fn cached_len(&self) -> usize {
        self.flight.cached_len()
    }

    /// Number of scopes with a construction in flight
    pub fn in_flight(&self) -> usize {
        self.flight.in_flight()
    }

    pub fn stats(&self) -> PoolStats {
        self.flight.stats()
    }

    pub fn config(&self) -> &PoolConfig {
        self.flight.config()
    }
}

impl<S, R> fmt::Debug for ResolverPool<S, R>
where
    S: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    R: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverPool")
            .field("name", &self.config().name)
            .field("cached", &self.cached_len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
