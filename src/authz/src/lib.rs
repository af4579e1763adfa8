//! # Scoped Authorization Resolvers (scoped-authz)
//!
//! Memoized, scoped permission checks. A permission is "a right, by someone,
//! on something": global rights (is admin, can read) and scoped rights (a
//! user on a project) are both answered by a [`Resolver`], a boolean
//! decision over a [`Right`].
//!
//! Building a resolver is usually expensive (a database lookup of the
//! rights held in a scope) while evaluating it is cheap. This crate
//! provides:
//! - **Resolver algebra**: [`and`], [`or`], [`allow`], [`deny`] (plus `&`,
//!   `|` and `!` on resolvers)
//! - **Resolver pools**: thread-safe caches that build each scope's
//!   resolver at most once among concurrent callers, never cache failures,
//!   and keep successes for the pool's lifetime
//! - **Request context**: cancellation and an attachment slot for carrying a
//!   pool through a request
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scoped_authz::{and, BoxError, Context, Resolver, ResolverPool, Right};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! struct UserOnProject {
//!     user: u64,
//!     project: u64,
//! }
//!
//! let pool = ResolverPool::new(|_ctx: Context, scope: UserOnProject| async move {
//!     // fetch the rights of scope.user on scope.project here
//!     let rights: Vec<Right> = vec![1, 2, 3];
//!     Ok::<_, BoxError>(Resolver::new(move |right: &Right| rights.contains(right)))
//! });
//!
//! let ctx = Context::new().with_pool(Arc::new(pool));
//!
//! // later, deep in a request handler
//! let pool = ctx.pool::<ResolverPool<UserOnProject>>().expect("pool attached");
//! let on_project = pool.resolve(&ctx, UserOnProject { user: 4, project: 7 }).await?;
//! let can_edit = and([on_project, Resolver::new(|right: &Right| *right != 3)]);
//!
//! assert!(can_edit.check(&1));
//! # Ok(())
//! # }
//! ```

pub mod algebra;
pub mod context;
pub mod error;
pub mod pool;
pub mod types;

pub use algebra::{allow, and, deny, or};
pub use context::Context;
pub use error::{AuthzError, BoxError, Result};
pub use pool::{
    NamespacedFactory, NamespacedPool, NamespacedPoolBuilder, PoolConfig, PoolStats,
    ResolverFactory, ResolverPool, ScopeKey,
};
pub use types::{Resolver, Right};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
