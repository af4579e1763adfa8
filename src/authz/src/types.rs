//! Core types for scoped permission checks

use std::fmt;
use std::sync::Arc;

/// Permission code checked by a resolver.
///
/// Every API is generic over the right type; this is the default.
pub type Right = i64;

/// A boolean decision over a right: "is this right granted?"
///
/// Resolvers are immutable and cheap to clone. Clones share the same
/// underlying function, so [`Resolver::ptr_eq`] identifies the instance a
/// pool handed out.
///
/// # Examples
///
/// ```
/// use scoped_authz::Resolver;
///
/// let granted = vec![1, 2, 3];
/// let resolver = Resolver::new(move |right: &i64| granted.contains(right));
///
/// assert!(resolver.check(&1));
/// assert!(!resolver.check(&7));
/// ```
pub struct Resolver<R = Right> {
    decide: Arc<dyn Fn(&R) -> bool + Send + Sync>,
}

impl<R: 'static> Resolver<R> {
    /// Wraps a decision function
    pub fn new<F>(decide: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Self {
            decide: Arc::new(decide),
        }
    }

    /// Resolver that grants every right
    pub fn allow() -> Self {
        Self::new(|_| true)
    }

    /// Resolver that denies every right
    pub fn deny() -> Self {
        Self::new(|_| false)
    }
}

impl<R> Resolver<R> {
    /// Returns `true` if `right` is granted
    #[inline]
    pub fn check(&self, right: &R) -> bool {
        (self.decide)(right)
    }

    /// Returns `true` if both handles point at the same resolver instance
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&a.decide) as *const u8,
            Arc::as_ptr(&b.decide) as *const u8,
        )
    }
}

impl<R> Clone for Resolver<R> {
    fn clone(&self) -> Self {
        Self {
            decide: Arc::clone(&self.decide),
        }
    }
}

impl<R> fmt::Debug for Resolver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("instance", &(Arc::as_ptr(&self.decide) as *const u8))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(Resolver::<Right>::allow().check(&0));
        assert!(!Resolver::<Right>::deny().check(&0));
    }

    #[test]
    fn test_clone_is_same_instance() {
        let a = Resolver::new(|r: &Right| r % 2 == 0);
        let b = a.clone();
        let c = Resolver::new(|r: &Right| r % 2 == 0);

        assert!(Resolver::ptr_eq(&a, &b));
        assert!(!Resolver::ptr_eq(&a, &c));
    }

    #[test]
    fn test_non_integer_rights() {
        let resolver = Resolver::new(|right: &&str| right.starts_with("document:"));
        assert!(resolver.check(&"document:read"));
        assert!(!resolver.check(&"project:delete"));
    }
}
