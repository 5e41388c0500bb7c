//! Cached route resolution.

use std::sync::Arc;

use async_trait::async_trait;
use stellar_cache::CachedRoute;
use stellar_core::RouteMatch;

use crate::environment::Environment;
use crate::error::RenderError;

/// The full route-matching algorithm, supplied by the host.
#[async_trait]
pub trait RouteMatcher: Send + Sync {
    /// Match a pathname against the current route set.
    async fn match_route(&self, pathname: &str) -> anyhow::Result<Option<RouteMatch>>;
}

/// Resolve a pathname, consulting the environment's route cache first.
///
/// The matcher only runs on a cache miss. Matcher failures are returned
/// and leave the cache untouched.
pub async fn resolve_route(
    env: &Environment,
    pathname: &str,
    matcher: &dyn RouteMatcher,
) -> Result<Option<Arc<RouteMatch>>, RenderError> {
    let cache = env.route_cache();
    let key = cache.key(pathname);
    let lookup = key.pathname().to_string();

    let (cached, status) = cache
        .get_or_compute(key, || async {
            matcher
                .match_route(&lookup)
                .await
                .map(CachedRoute::from)
                .map_err(|source| RenderError::Match {
                    pathname: lookup.clone(),
                    source,
                })
        })
        .await?;

    env.logging()
        .debug_builder("router", "resolved route")
        .field("pathname", lookup.as_str())
        .field("cache", status.to_string())
        .field_bool("matched", cached.is_match())
        .emit();

    Ok(cached.into_match())
}
