//! Route resolution cache for the Stellar render layer.
//!
//! This crate provides:
//! - `RouteCache` - Memoized route matches with O(1) bulk invalidation
//! - `RouteCacheKey` - Pathname + mode cache key
//! - `CachedRoute` - A stored match or an explicit "no match"
//!
//! # Example
//!
//! ```ignore
//! use stellar_cache::{CachedRoute, RouteCache};
//! use stellar_core::RuntimeMode;
//! use stellar_observability::LogOptions;
//!
//! let cache = RouteCache::new(LogOptions::default(), RuntimeMode::Development);
//!
//! // Dev servers start every request from a clean slate
//! cache.clear_all();
//!
//! let key = cache.key("/blog/hello");
//! if cache.get(&key).is_none() {
//!     cache.set(key, CachedRoute::NoMatch);
//! }
//! ```

mod key;
mod route_cache;

pub use key::*;
pub use route_cache::*;
