//! Dictionary variant of the pool: one factory per namespace
//!
//! A namespace names a kind of relationship (e.g. `user-project`); a scope
//! within it is the pair of identities "by someone" and "on something". The
//! two identities have their own types, so a numeric user id can pair with a
//! project slug. The cache key is the namespace plus both identities
//! rendered through `Display`.

use std::collections::HashMap;
use std::fmt;
use std::fmt::Display;
use std::sync::Arc;

use futures::FutureExt;

use super::config::{PoolConfig, PoolStats};
use super::factory::NamespacedFactory;
use super::gate::SingleFlight;
use crate::context::Context;
use crate::error::{AuthzError, Result};
use crate::types::{Resolver, Right};

/// Cache key of a [`NamespacedPool`] entry
///
/// Components are compared individually, so identities containing the
/// display separator cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    namespace: String,
    by: String,
    on: String,
}

impl ScopeKey {
    pub fn new(namespace: impl Into<String>, by: &impl Display, on: &impl Display) -> Self {
        Self {
            namespace: namespace.into(),
            by: by.to_string(),
            on: on.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn by(&self) -> &str {
        &self.by
    }

    pub fn on(&self) -> &str {
        &self.on
    }
}

impl Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.namespace, self.by, self.on)
    }
}

type Dictionary<B, O, R> = HashMap<String, Arc<dyn NamespacedFactory<B, O, R>>>;

/// Pool holding a dictionary of factories, one per namespace
///
/// Concurrency and caching behave exactly like
/// [`ResolverPool`](crate::ResolverPool). Requests for an unregistered
/// namespace fail immediately with [`AuthzError::UnknownNamespace`].
///
/// # Examples
///
/// ```
/// use scoped_authz::{BoxError, Context, NamespacedPool, Resolver, Right};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = NamespacedPool::builder()
///     .register("user-project", |_ctx: Context, user: u64, project: String| async move {
///         // user 4 owns apollo and gets every right on it
///         Ok::<_, BoxError>(if user == 4 && project == "apollo" {
///             Resolver::allow()
///         } else {
///             Resolver::deny()
///         })
///     })
///     .build();
///
/// let ctx = Context::new();
/// let resolver: Resolver<Right> =
///     pool.resolve(&ctx, "user-project", 4, "apollo".to_string()).await?;
/// assert!(resolver.check(&1));
/// assert!(pool.resolve(&ctx, "group-project", 4, "apollo".to_string()).await.is_err());
/// # Ok(())
/// # }
/// ```
pub struct NamespacedPool<B, O, R = Right> {
    dictionary: Dictionary<B, O, R>,
    flight: Arc<SingleFlight<ScopeKey, R>>,
}

impl<B, O, R> NamespacedPool<B, O, R>
where
    B: Display + Send + Sync + 'static,
    O: Display + Send + Sync + 'static,
    R: 'static,
{
    /// Creates a pool from a ready-made dictionary
    pub fn new(dictionary: Dictionary<B, O, R>) -> Self {
        Self::with_config(dictionary, PoolConfig::default())
    }

    pub fn with_config(
        dictionary: Dictionary<B, O, R>,
        config: PoolConfig,
    ) -> Self {
        Self {
            dictionary,
            flight: Arc::new(SingleFlight::new(config)),
        }
    }

    pub fn builder() -> NamespacedPoolBuilder<B, O, R> {
        NamespacedPoolBuilder::default()
    }

    /// Returns the resolver of `by` on `on` within `namespace`, building it
    /// with that namespace's factory if needed.
    ///
    /// # Errors
    ///
    /// - [`AuthzError::UnknownNamespace`] if no factory is registered for
    ///   `namespace`; no factory runs and no gate is taken
    /// - [`AuthzError::Factory`] if the factory fails
    pub async fn resolve(
        &self,
        ctx: &Context,
        namespace: &str,
        by: B,
        on: O,
    ) -> Result<Resolver<R>> {
        let factory = self
            .dictionary
            .get(namespace)
            .cloned()
            .ok_or_else(|| AuthzError::UnknownNamespace {
                namespace: namespace.to_string(),
            })?;

        let key = ScopeKey::new(namespace, &by, &on);
        self.flight
            .resolve_with(ctx, key, move |ctx, _key| {
                async move { factory.build(&ctx, &by, &on).await }.boxed()
            })
            .await
    }

    /// Registered namespaces, in no particular order
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.dictionary.keys().map(String::as_str)
    }

    pub fn is_cached(&self, namespace: &str, by: &B, on: &O) -> bool {
        self.flight.is_cached(&ScopeKey::new(namespace, by, on))
    }

    pub fn cached_len(&self) -> usize {
        self.flight.cached_len()
    }

    pub fn in_flight(&self) -> usize {
        self.flight.in_flight()
    }

    pub fn stats(&self) -> PoolStats {
        self.flight.stats()
    }
}

impl<B, O, R> fmt::Debug for NamespacedPool<B, O, R>
where
    B: Display + Send + Sync + 'static,
    O: Display + Send + Sync + 'static,
    R: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut namespaces: Vec<&str> = self.namespaces().collect();
        namespaces.sort_unstable();
        f.debug_struct("NamespacedPool")
            .field("namespaces", &namespaces)
            .field("cached", &self.cached_len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Builder for [`NamespacedPool`]
pub struct NamespacedPoolBuilder<B, O, R = Right> {
    dictionary: Dictionary<B, O, R>,
    config: PoolConfig,
}

impl<B, O, R> Default for NamespacedPoolBuilder<B, O, R> {
    fn default() -> Self {
        Self {
            dictionary: HashMap::new(),
            config: PoolConfig::default(),
        }
    }
}

impl<B, O, R> NamespacedPoolBuilder<B, O, R>
where
    B: Display + Send + Sync + 'static,
    O: Display + Send + Sync + 'static,
    R: 'static,
{
    /// Registers the factory for `namespace`, replacing any previous one
    pub fn register<F>(mut self, namespace: impl Into<String>, factory: F) -> Self
    where
        F: NamespacedFactory<B, O, R> + 'static,
    {
        self.dictionary.insert(namespace.into(), Arc::new(factory));
        self
    }

    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> NamespacedPool<B, O, R> {
        NamespacedPool::with_config(self.dictionary, self.config)
    }
}
