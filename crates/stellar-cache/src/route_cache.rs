//! Route resolution cache with generation-based invalidation.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use stellar_core::{RouteMatch, RuntimeMode};
use stellar_observability::LogOptions;

use crate::key::RouteCacheKey;

const LOG_LABEL: &str = "routeCache";

/// A stored route resolution.
///
/// "No route matches this pathname" is a result worth remembering too.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedRoute {
    /// The pathname matched a route.
    Matched(Arc<RouteMatch>),
    /// The pathname matched nothing.
    NoMatch,
}

impl CachedRoute {
    /// Get the match, if any.
    pub fn route_match(&self) -> Option<&Arc<RouteMatch>> {
        match self {
            Self::Matched(m) => Some(m),
            Self::NoMatch => None,
        }
    }

    /// Convert into the match, if any.
    pub fn into_match(self) -> Option<Arc<RouteMatch>> {
        match self {
            Self::Matched(m) => Some(m),
            Self::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

impl From<Option<RouteMatch>> for CachedRoute {
    fn from(value: Option<RouteMatch>) -> Self {
        match value {
            Some(m) => Self::Matched(Arc::new(m)),
            None => Self::NoMatch,
        }
    }
}

/// Status of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from the current generation.
    Hit,
    /// Computed by the caller.
    Miss,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
        }
    }
}

/// Counters describing cache behavior so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the current generation.
    pub hits: u64,
    /// Lookups that found nothing usable.
    pub misses: u64,
    /// Current generation.
    pub generation: u64,
    /// Entries belonging to the current generation.
    pub live_entries: usize,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedRoute,
    generation: u64,
}

/// Memoizes route resolution across requests.
///
/// Entries are tagged with the generation they were written in.
/// `clear_all` bumps the generation, which turns every older entry into a
/// miss without touching the table. Whether and when to clear is up to the
/// caller: dev servers clear once per request, built sites never do.
///
/// Lookups and stores are short synchronous critical sections. Two tasks that
/// miss on the same key both compute and the later `set` wins.
#[derive(Debug)]
pub struct RouteCache {
    logging: LogOptions,
    mode: RuntimeMode,
    generation: AtomicU64,
    entries: RwLock<HashMap<RouteCacheKey, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RouteCache {
    /// Create an empty cache scoped to the given logging and mode.
    pub fn new(logging: LogOptions, mode: RuntimeMode) -> Self {
        Self {
            logging,
            mode,
            generation: AtomicU64::new(0),
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Mode this cache was created for.
    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    /// Build the key for a pathname in this cache's mode.
    pub fn key(&self, pathname: &str) -> RouteCacheKey {
        RouteCacheKey::new(pathname, self.mode)
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Look up a stored result. Never performs matching.
    pub fn get(&self, key: &RouteCacheKey) -> Option<CachedRoute> {
        let current = self.generation();
        let found = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .filter(|entry| entry.generation == current)
            .map(|entry| entry.value.clone());

        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };

        found
    }

    /// Store a result, replacing any entry for `key`.
    pub fn set(&self, key: RouteCacheKey, value: CachedRoute) {
        self.store(key, value, self.generation());
    }

    /// Store a result computed while `generation` was current.
    ///
    /// Stores nothing when the cache was cleared since.
    fn store(&self, key: RouteCacheKey, value: CachedRoute, generation: u64) {
        let matched = value.is_match();

        let replaced_live = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if self.generation() != generation {
                drop(entries);
                self.logging
                    .debug_builder(LOG_LABEL, "discarded stale route resolution")
                    .field("pathname", key.pathname())
                    .field_u64("generation", generation)
                    .emit();
                return;
            }
            // A clear racing past the check above leaves this entry tagged
            // with the older generation, so it still reads as a miss.
            entries
                .insert(key.clone(), CacheEntry { value, generation })
                .is_some_and(|old| old.generation == generation)
        };

        // Routes of a built site never change, so a second store means
        // two requests resolved the same pathname concurrently.
        if replaced_live && self.mode.is_production() {
            self.logging.warn(
                LOG_LABEL,
                &format!(
                    "Internal Warning: route cache overwritten. ({})",
                    key.pathname()
                ),
            );
        }

        self.logging
            .debug_builder(LOG_LABEL, "stored route resolution")
            .field("pathname", key.pathname())
            .field_bool("matched", matched)
            .field_u64("generation", generation)
            .emit();
    }

    /// Invalidate every stored entry in O(1).
    pub fn clear_all(&self) {
        let previous = self.generation.fetch_add(1, Ordering::AcqRel);
        self.logging
            .debug_builder(LOG_LABEL, "cleared route cache")
            .field_u64("generation", previous + 1)
            .emit();
    }

    /// Return the stored result for `key`, or compute and store it.
    ///
    /// A failed computation is returned to the caller and not stored, and so
    /// is a result computed across a `clear_all`. Concurrent misses are not
    /// deduplicated.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: RouteCacheKey,
        compute: F,
    ) -> Result<(CachedRoute, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CachedRoute, E>>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok((hit, CacheStatus::Hit));
        }

        let generation = self.generation();
        let value = compute().await?;
        self.store(key, value.clone(), generation);
        Ok((value, CacheStatus::Miss))
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let generation = self.generation();
        let live_entries = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|entry| entry.generation == generation)
            .count();

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            generation,
            live_entries,
        }
    }
}
