//! Boolean combinators over resolvers
//!
//! Absent resolvers (`None`) are skipped rather than treated as a denial, so
//! optional constraints can be passed straight through. Evaluation follows
//! input order and short-circuits.

use std::ops::{BitAnd, BitOr, Not};

use crate::types::Resolver;

/// Resolver that grants a right when every present resolver grants it.
///
/// An empty (or all-absent) list grants everything.
///
/// # Examples
///
/// ```
/// use scoped_authz::{and, Resolver, Right};
///
/// let even = Resolver::new(|r: &Right| r % 2 == 0);
/// let positive = Resolver::new(|r: &Right| *r > 0);
///
/// let both = and([Some(even), None, Some(positive)]);
/// assert!(both.check(&4));
/// assert!(!both.check(&-4));
/// ```
pub fn and<R, I>(resolvers: I) -> Resolver<R>
where
    R: 'static,
    I: IntoIterator,
    I::Item: Into<Option<Resolver<R>>>,
{
    let resolvers: Vec<Resolver<R>> = resolvers.into_iter().filter_map(Into::into).collect();
    Resolver::new(move |right| resolvers.iter().all(|resolver| resolver.check(right)))
}

/// Resolver that grants a right when at least one present resolver grants it.
///
/// An empty (or all-absent) list grants nothing.
pub fn or<R, I>(resolvers: I) -> Resolver<R>
where
    R: 'static,
    I: IntoIterator,
    I::Item: Into<Option<Resolver<R>>>,
{
    let resolvers: Vec<Resolver<R>> = resolvers.into_iter().filter_map(Into::into).collect();
    Resolver::new(move |right| resolvers.iter().any(|resolver| resolver.check(right)))
}

/// Resolver that grants every right
pub fn allow<R: 'static>() -> Resolver<R> {
    Resolver::allow()
}

/// Resolver that denies every right
pub fn deny<R: 'static>() -> Resolver<R> {
    Resolver::deny()
}

impl<R: 'static> BitAnd for Resolver<R> {
    type Output = Resolver<R>;

    fn bitand(self, rhs: Self) -> Self::Output {
        and([self, rhs])
    }
}

impl<R: 'static> BitOr for Resolver<R> {
    type Output = Resolver<R>;

    fn bitor(self, rhs: Self) -> Self::Output {
        or([self, rhs])
    }
}

impl<R: 'static> Not for Resolver<R> {
    type Output = Resolver<R>;

    fn not(self) -> Self::Output {
        Resolver::new(move |right| !self.check(right))
    }
}
