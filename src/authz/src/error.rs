//! Error types for the resolver pool

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error returned by resolver factories
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Resolver pool errors
///
/// Cloneable so that the outcome of one construction attempt can be handed
/// to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum AuthzError {
    /// The resolver factory returned an error (passed through unchanged)
    #[error("Resolver factory failed: {0}")]
    Factory(#[source] Arc<dyn StdError + Send + Sync + 'static>),

    /// The resolver factory panicked while building the resolver
    #[error("Resolver factory panicked for scope {scope}")]
    FactoryPanicked { scope: String },

    /// No factory is registered for the namespace
    #[error("No resolver factory registered for namespace '{namespace}'")]
    UnknownNamespace { namespace: String },

    /// A factory received a scope of a shape it does not handle
    #[error("Invalid scope, expected {expected}: {reason}")]
    InvalidScope { expected: &'static str, reason: String },

    /// The caller's context was cancelled while waiting for a resolver
    #[error("Resolver request cancelled")]
    Cancelled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthzError {
    /// Wraps a factory error
    pub fn factory(err: impl Into<BoxError>) -> Self {
        AuthzError::Factory(Arc::from(err.into()))
    }

    /// Returns the factory's own error, if this is a factory failure.
    ///
    /// The returned value can be downcast to the concrete error type the
    /// factory produced.
    pub fn factory_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            AuthzError::Factory(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Whether a later call for the same scope may succeed without any
    /// reconfiguration of the pool.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            AuthzError::UnknownNamespace { .. } | AuthzError::InvalidScope { .. }
        )
    }
}

/// Result type for resolver pool operations
pub type Result<T> = std::result::Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("database unavailable")]
    struct DbDown;

    #[test]
    fn test_factory_error_display_and_source() {
        let err = AuthzError::factory(DbDown);
        assert!(err.to_string().contains("database unavailable"));
        assert!(err.source().is_some());
        assert!(err.factory_error().unwrap().downcast_ref::<DbDown>().is_some());
    }

    #[test]
    fn test_unknown_namespace_display() {
        let err = AuthzError::UnknownNamespace {
            namespace: "user-project".to_string(),
        };
        assert!(err.to_string().contains("user-project"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable() {
        assert!(AuthzError::factory(DbDown).is_retryable());
        assert!(AuthzError::Cancelled.is_retryable());
        assert!(AuthzError::FactoryPanicked { scope: "3".into() }.is_retryable());
    }

    #[test]
    fn test_clone_shares_factory_error() {
        let err = AuthzError::factory(DbDown);
        let cloned = err.clone();
        match (&err, &cloned) {
            (AuthzError::Factory(a), AuthzError::Factory(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected factory errors"),
        }
    }
}
