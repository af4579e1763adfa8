//! Scoped resolver pools
//!
//! This module provides the cache-or-construct layer over resolver
//! factories:
//! - [`ResolverPool`]: one factory, arbitrary hashable scope values
//! - [`NamespacedPool`]: a dictionary of factories keyed by namespace, with
//!   scopes made of two identities
//! - Single-flight construction per scope using DashMap
//! - Retry after failure; successes are cached for the pool's lifetime

mod config;
mod factory;
mod gate;
mod namespaced;
mod resolver;

pub use config::{PoolConfig, PoolStats};
pub use factory::{NamespacedFactory, ResolverFactory};
pub use namespaced::{NamespacedPool, NamespacedPoolBuilder, ScopeKey};
pub use resolver::ResolverPool;
