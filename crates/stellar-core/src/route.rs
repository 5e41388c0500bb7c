//! Route definitions and match results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Extracted route parameters (e.g., `slug` from `/blog/[slug]`).
pub type RouteParams = HashMap<String, String>;

/// What a route produces when matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// A rendered page.
    #[default]
    Page,
    /// A programmatic endpoint.
    Endpoint,
    /// A redirect to another location.
    Redirect,
}

/// A route known to the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteData {
    /// Route pattern (e.g., "/blog/[slug]").
    pub route: String,
    /// Source component backing the route.
    pub component: String,
    /// Route kind.
    #[serde(default)]
    pub kind: RouteKind,
    /// Parameter names in pattern order.
    #[serde(default)]
    pub params: Vec<String>,
    /// Whether the route is rendered at build time.
    #[serde(default)]
    pub prerender: bool,
}

impl RouteData {
    /// Create a page route.
    pub fn page(route: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            component: component.into(),
            kind: RouteKind::Page,
            params: Vec::new(),
            prerender: false,
        }
    }

    /// Create an endpoint route.
    pub fn endpoint(route: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            kind: RouteKind::Endpoint,
            ..Self::page(route, component)
        }
    }

    /// Set parameter names.
    pub fn with_params(mut self, params: Vec<&str>) -> Self {
        self.params = params.into_iter().map(String::from).collect();
        self
    }

    /// Mark as prerendered.
    pub fn with_prerender(mut self, prerender: bool) -> Self {
        self.prerender = prerender;
        self
    }
}

/// Result of matching a pathname against the route set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    /// The matched route.
    pub route: RouteData,
    /// Parameters extracted from the pathname.
    pub params: RouteParams,
}

impl RouteMatch {
    /// Create a match without parameters.
    pub fn new(route: RouteData) -> Self {
        Self {
            route,
            params: RouteParams::new(),
        }
    }

    /// Add an extracted parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Get a parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_data_builders() {
        let route = RouteData::page("/blog/[slug]", "src/pages/blog/[slug].stellar")
            .with_params(vec!["slug"])
            .with_prerender(true);

        assert_eq!(route.kind, RouteKind::Page);
        assert_eq!(route.params, vec!["slug".to_string()]);
        assert!(route.prerender);

        let api = RouteData::endpoint("/api/cart", "src/pages/api/cart.ts");
        assert_eq!(api.kind, RouteKind::Endpoint);
        assert!(!api.prerender);
    }

    #[test]
    fn test_route_match_params() {
        let m = RouteMatch::new(RouteData::page("/blog/[slug]", "blog.stellar"))
            .with_param("slug", "hello-world");

        assert_eq!(m.param("slug"), Some("hello-world"));
        assert_eq!(m.param("missing"), None);
    }
}
