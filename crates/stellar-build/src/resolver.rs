//! Module resolution delegated to by build plugins.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ResolveError;

/// A resolved module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    /// Canonical module id, normally an absolute file path.
    pub id: String,
    /// Whether the module is left out of the bundle.
    pub external: bool,
}

impl ResolvedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: false,
        }
    }
}

/// The bundler's own resolution, as seen by plugins.
///
/// `ResolveError::NotFound` means nothing exists at the specifier. Any other
/// error is a real failure and must not be mistaken for absence.
#[async_trait]
pub trait ModuleResolver: Send + Sync {
    async fn resolve(&self, specifier: &str) -> Result<ResolvedId, ResolveError>;
}

/// Default script extensions tried for extensionless specifiers.
pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "mts", "js", "mjs"];

/// Filesystem resolver for absolute or root-relative specifiers.
///
/// A specifier is tried as-is, then with each extension appended, then as a
/// directory holding an `index` file.
#[derive(Debug, Clone)]
pub struct FsModuleResolver {
    root: PathBuf,
    extensions: Vec<String>,
}

impl FsModuleResolver {
    /// Resolver rooted at `root` with the default extensions.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replace the tried extensions.
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, target: &Path) -> Vec<PathBuf> {
        let mut candidates = vec![target.to_path_buf()];
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for ext in &self.extensions {
            candidates.push(target.with_file_name(format!("{file_name}.{ext}")));
        }
        for ext in &self.extensions {
            candidates.push(target.join(format!("index.{ext}")));
        }
        candidates
    }
}

#[async_trait]
impl ModuleResolver for FsModuleResolver {
    async fn resolve(&self, specifier: &str) -> Result<ResolvedId, ResolveError> {
        if specifier.is_empty() {
            return Err(ResolveError::Malformed {
                specifier: String::new(),
                reason: "empty specifier".into(),
            });
        }
        if specifier.contains('\0') {
            return Err(ResolveError::Malformed {
                specifier: specifier.escape_default().to_string(),
                reason: "contains a NUL byte".into(),
            });
        }

        let target = self.root.join(specifier);
        for candidate in self.candidates(&target) {
            if is_file(&candidate).await.map_err(|source| ResolveError::Io {
                specifier: specifier.to_string(),
                source,
            })? {
                return Ok(ResolvedId::new(candidate.to_string_lossy()));
            }
        }

        Err(ResolveError::NotFound(specifier.to_string()))
    }
}

async fn is_file(path: &Path) -> io::Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_extensionless_specifier() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("middleware.ts"), "export const onRequest = undefined").unwrap();

        let resolver = FsModuleResolver::new(dir.path());
        let resolved = resolver.resolve("middleware").await.unwrap();

        assert!(resolved.id.ends_with("middleware.ts"));
        assert!(!resolved.external);
    }

    #[tokio::test]
    async fn test_extension_order_prefers_typescript() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("middleware.js"), "").unwrap();
        std::fs::write(dir.path().join("middleware.ts"), "").unwrap();

        let resolved = FsModuleResolver::new(dir.path()).resolve("middleware").await.unwrap();
        assert!(resolved.id.ends_with("middleware.ts"));
    }

    #[tokio::test]
    async fn test_resolves_directory_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("middleware")).unwrap();
        std::fs::write(dir.path().join("middleware").join("index.mjs"), "").unwrap();

        let resolved = FsModuleResolver::new(dir.path()).resolve("middleware").await.unwrap();
        assert!(resolved.id.ends_with("index.mjs"));
    }

    #[tokio::test]
    async fn test_missing_module_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsModuleResolver::new(dir.path()).resolve("middleware").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("middleware.ts"), "").unwrap();

        let resolver = FsModuleResolver::new(dir.path()).with_extensions(&["js"]);
        assert!(resolver.resolve("middleware").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_nul_specifier_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsModuleResolver::new(dir.path())
            .resolve("\0empty-middleware")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Malformed { .. }));
    }
}
