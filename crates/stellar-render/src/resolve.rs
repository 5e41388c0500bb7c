//! Asset specifier resolution.

use async_trait::async_trait;

/// Maps a logical asset specifier to the URL it is served from.
///
/// Owned by the host (dev server or adapter); the render layer only calls it.
#[async_trait]
pub trait AssetResolver: Send + Sync {
    async fn resolve(&self, specifier: &str) -> anyhow::Result<String>;
}

/// Resolver that serves every specifier at its own path.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

#[async_trait]
impl AssetResolver for IdentityResolver {
    async fn resolve(&self, specifier: &str) -> anyhow::Result<String> {
        Ok(specifier.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identity_resolver_passes_through() {
        let url = IdentityResolver.resolve("/_stellar/hoisted.js").await.unwrap();
        assert_eq!(url, "/_stellar/hoisted.js");
    }
}
