//! Resolver factories: the user-supplied code that builds a resolver for a
//! scope, typically by loading a set of rights from a database.

use std::fmt::Display;
use std::future::Future;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::BoxError;
use crate::types::{Resolver, Right};

/// Builds the resolver for one scope.
///
/// Any `Fn(Context, S) -> impl Future<Output = Result<Resolver<R>, E>>`
/// closure is a factory, as long as `E` converts into [`BoxError`].
///
/// # Examples
///
/// ```
/// use scoped_authz::{BoxError, Context, Resolver, ResolverFactory, Right};
/// use async_trait::async_trait;
///
/// struct ProjectMembers;
///
/// #[async_trait]
/// impl ResolverFactory<(u64, u64)> for ProjectMembers {
///     async fn build(&self, _ctx: &Context, scope: &(u64, u64)) -> Result<Resolver, BoxError> {
///         let (user, _project) = *scope;
///         // look the user's rights up here
///         let rights: Vec<Right> = if user == 4 { vec![1, 2] } else { vec![] };
///         Ok(Resolver::new(move |right: &Right| rights.contains(right)))
///     }
/// }
/// ```
#[async_trait]
pub trait ResolverFactory<S, R = Right>: Send + Sync {
    async fn build(&self, ctx: &Context, scope: &S) -> Result<Resolver<R>, BoxError>;
}

#[async_trait]
impl<S, R, F, Fut, E> ResolverFactory<S, R> for F
where
    S: Clone + Send + Sync + 'static,
    R: 'static,
    F: Fn(Context, S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resolver<R>, E>> + Send,
    E: Into<BoxError>,
{
    async fn build(&self, ctx: &Context, scope: &S) -> Result<Resolver<R>, BoxError> {
        (self)(ctx.clone(), scope.clone()).await.map_err(Into::into)
    }
}

/// Builds the resolver for a (`by`, `on`) identity pair within one
/// namespace of a [`NamespacedPool`](crate::NamespacedPool), e.g. "user 4 on
/// project `apollo`" in the `user-project` namespace. The two identities may
/// be of different types.
#[async_trait]
pub trait NamespacedFactory<B, O, R = Right>: Send + Sync {
    async fn build(&self, ctx: &Context, by: &B, on: &O) -> Result<Resolver<R>, BoxError>;
}

#[async_trait]
impl<B, O, R, F, Fut, E> NamespacedFactory<B, O, R> for F
where
    B: Display + Clone + Send + Sync + 'static,
    O: Display + Clone + Send + Sync + 'static,
    R: 'static,
    F: Fn(Context, B, O) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resolver<R>, E>> + Send,
    E: Into<BoxError>,
{
    async fn build(&self, ctx: &Context, by: &B, on: &O) -> Result<Resolver<R>, BoxError> {
        (self)(ctx.clone(), by.clone(), on.clone()).await.map_err(Into::into)
    }
}
