//! Request-scoped context: cancellation plus an attachment slot for pools
//!
//! A [`Context`] is passed explicitly to every pool call and forwarded to
//! the resolver factory. It carries a cancellation token and, optionally,
//! the pool instance itself so that handlers deep in a request can look it
//! up without a process-wide singleton.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

type Slots = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Cancellable, cheaply cloneable request context
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use scoped_authz::{Context, Resolver, ResolverPool, BoxError};
///
/// let pool: ResolverPool<u32> = ResolverPool::new(|_ctx: Context, _scope: u32| async {
///     Ok::<_, BoxError>(Resolver::allow())
/// });
///
/// let ctx = Context::new().with_pool(Arc::new(pool));
/// assert!(ctx.pool::<ResolverPool<u32>>().is_some());
/// assert!(Context::new().pool::<ResolverPool<u32>>().is_none());
/// ```
#[derive(Clone, Default)]
pub struct Context {
    token: CancellationToken,
    slots: Arc<Slots>,
}

impl Context {
    /// Creates an empty, uncancelled context
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context driven by an existing cancellation token
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            slots: Arc::default(),
        }
    }

    /// Derives a context whose token is cancelled along with this one, but
    /// can also be cancelled on its own. Attachments are shared.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            slots: Arc::clone(&self.slots),
        }
    }

    /// The underlying cancellation token
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancels this context and every child derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the context is cancelled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Returns a copy of this context with `pool` attached.
    ///
    /// The receiver is left untouched. Attaching a second pool of the same
    /// type replaces the first in the returned context.
    pub fn with_pool<P>(&self, pool: Arc<P>) -> Self
    where
        P: Send + Sync + 'static,
    {
        let mut slots = Slots::clone(&self.slots);
        slots.insert(TypeId::of::<P>(), pool);
        Self {
            token: self.token.clone(),
            slots: Arc::new(slots),
        }
    }

    /// Retrieves the attached pool of type `P`, or `None` if none was attached
    pub fn pool<P>(&self) -> Option<Arc<P>>
    where
        P: Send + Sync + 'static,
    {
        let slot = self.slots.get(&TypeId::of::<P>())?;
        Arc::clone(slot).downcast::<P>().ok()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .field("attachments", &self.slots.len())
            .finish()
    }
}
