//! Route cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use stellar_core::RuntimeMode;

/// Key identifying one route resolution.
///
/// Derived from the request pathname and the runtime mode, so a cache shared
/// by mistake between modes can never serve a dev result to a built site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteCacheKey {
    pathname: String,
    mode: RuntimeMode,
}

impl RouteCacheKey {
    /// Create a key from a pathname.
    ///
    /// Any query string or fragment is dropped.
    pub fn new(pathname: &str, mode: RuntimeMode) -> Self {
        let end = pathname.find(['?', '#']).unwrap_or(pathname.len());
        let pathname = &pathname[..end];
        let pathname = if pathname.is_empty() { "/" } else { pathname };

        Self {
            pathname: pathname.to_string(),
            mode,
        }
    }

    /// Get the pathname part.
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Get the mode part.
    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }
}

impl fmt::Display for RouteCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mode, self.pathname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_strips_query_and_fragment() {
        let key = RouteCacheKey::new("/blog/post?page=2#top", RuntimeMode::Production);
        assert_eq!(key.pathname(), "/blog/post");
        assert_eq!(key.to_string(), "production:/blog/post");
    }

    #[test]
    fn test_empty_pathname_is_root() {
        let key = RouteCacheKey::new("", RuntimeMode::Development);
        assert_eq!(key.pathname(), "/");
    }

    #[test]
    fn test_mode_is_part_of_identity() {
        let dev = RouteCacheKey::new("/about", RuntimeMode::Development);
        let prod = RouteCacheKey::new("/about", RuntimeMode::Production);
        assert_ne!(dev, prod);
        assert_eq!(dev, RouteCacheKey::new("/about?x=1", RuntimeMode::Development));
    }
}
