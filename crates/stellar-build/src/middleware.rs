//! Resolution of the project's middleware module.
//!
//! Renderers import [`MIDDLEWARE_MODULE_ID`]. During the SSR pass this plugin
//! points that id at `<src_dir>/middleware` when the file exists, and at the
//! synthesized [`EMPTY_MIDDLEWARE`] module when it does not, so the import
//! never fails for projects without middleware.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use stellar_core::{
    RuntimeMode, EMPTY_MIDDLEWARE, EMPTY_MIDDLEWARE_SOURCE, MIDDLEWARE_MODULE_ID,
    MIDDLEWARE_PATH_SEGMENT_NAME,
};
use stellar_observability::LogOptions;

use crate::error::{BuildError, ResolveError};
use crate::input::{add_input, BuildOptions};
use crate::plugin::{BuildHookResult, BuildPlugin, BuildTarget, BundlerPlugin};
use crate::resolver::ModuleResolver;

/// Bundler plugin name.
pub const MIDDLEWARE_PLUGIN_NAME: &str = "@stellar/plugin-middleware";

const LOG_LABEL: &str = "middleware";

/// Project settings the static build runs with.
#[derive(Debug, Clone)]
pub struct StaticBuildOptions {
    /// Project root.
    pub root: PathBuf,
    /// Source directory searched for the middleware file.
    pub src_dir: PathBuf,
    pub mode: RuntimeMode,
    pub logging: LogOptions,
}

impl StaticBuildOptions {
    /// Options for `root` with `src/` as the source directory.
    pub fn new(root: impl Into<PathBuf>, logging: LogOptions) -> Self {
        let root = root.into();
        Self {
            src_dir: root.join("src"),
            root,
            mode: RuntimeMode::Production,
            logging,
        }
    }

    pub fn with_src_dir(mut self, src_dir: impl Into<PathBuf>) -> Self {
        self.src_dir = src_dir.into();
        self
    }

    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Bundler plugin that resolves [`MIDDLEWARE_MODULE_ID`].
#[derive(Debug, Clone)]
pub struct MiddlewarePlugin {
    src_dir: PathBuf,
    mode: RuntimeMode,
    logging: LogOptions,
}

impl MiddlewarePlugin {
    /// Plugin for a production build.
    pub fn new(src_dir: impl Into<PathBuf>, logging: LogOptions) -> Self {
        Self {
            src_dir: src_dir.into(),
            mode: RuntimeMode::Production,
            logging,
        }
    }

    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Mode the build runs in.
    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    /// Location searched for the project's middleware, without extension.
    pub fn middleware_path(&self) -> PathBuf {
        self.src_dir.join(MIDDLEWARE_PATH_SEGMENT_NAME)
    }
}

#[async_trait]
impl BundlerPlugin for MiddlewarePlugin {
    fn name(&self) -> &str {
        MIDDLEWARE_PLUGIN_NAME
    }

    fn options(&self, options: BuildOptions) -> BuildOptions {
        add_input(options, &[MIDDLEWARE_MODULE_ID])
    }

    async fn resolve_id(
        &self,
        id: &str,
        resolver: &dyn ModuleResolver,
    ) -> Result<Option<String>, BuildError> {
        if id == EMPTY_MIDDLEWARE {
            return Ok(Some(EMPTY_MIDDLEWARE.to_string()));
        }
        if id != MIDDLEWARE_MODULE_ID {
            return Ok(None);
        }

        let path = self.middleware_path();
        let specifier = path.to_str().ok_or_else(|| ResolveError::Malformed {
            specifier: path.to_string_lossy().into_owned(),
            reason: "source directory is not valid UTF-8".into(),
        })?;
        match resolver.resolve(specifier).await {
            Ok(resolved) => {
                self.logging
                    .debug_builder(LOG_LABEL, "using project middleware")
                    .field("id", resolved.id.as_str())
                    .field("mode", self.mode.as_str())
                    .emit();
                Ok(Some(resolved.id))
            }
            Err(e) if e.is_not_found() => {
                self.logging
                    .debug_builder(LOG_LABEL, "no project middleware, using empty module")
                    .field("searched", specifier)
                    .field("mode", self.mode.as_str())
                    .emit();
                Ok(Some(EMPTY_MIDDLEWARE.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn load(&self, id: &str) -> Result<Option<String>, BuildError> {
        if id == EMPTY_MIDDLEWARE {
            return Ok(Some(EMPTY_MIDDLEWARE_SOURCE.to_string()));
        }
        Ok(None)
    }
}

/// Registers [`MiddlewarePlugin`] for the SSR pass.
#[derive(Debug, Clone)]
pub struct MiddlewareBuildPlugin {
    plugin: Arc<MiddlewarePlugin>,
}

impl MiddlewareBuildPlugin {
    pub fn bundler_plugin(&self) -> &Arc<MiddlewarePlugin> {
        &self.plugin
    }
}

impl BuildPlugin for MiddlewareBuildPlugin {
    fn target(&self) -> BuildTarget {
        BuildTarget::Ssr
    }

    fn before_build(&self) -> BuildHookResult {
        BuildHookResult {
            bundler_plugin: Some(self.plugin.clone()),
        }
    }
}

/// Build plugin that wires middleware resolution into the SSR pass.
pub fn plugin_middleware(options: &StaticBuildOptions) -> MiddlewareBuildPlugin {
    MiddlewareBuildPlugin {
        plugin: Arc::new(
            MiddlewarePlugin::new(options.src_dir.clone(), options.logging.clone())
                .with_mode(options.mode),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolvedId;
    use stellar_observability::LogLevel;

    struct NothingResolver;

    #[async_trait]
    impl ModuleResolver for NothingResolver {
        async fn resolve(&self, specifier: &str) -> Result<ResolvedId, ResolveError> {
            Err(ResolveError::NotFound(specifier.to_string()))
        }
    }

    fn plugin() -> MiddlewarePlugin {
        MiddlewarePlugin::new("/project/src", LogOptions::new(LogLevel::Silent))
    }

    #[test]
    fn test_middleware_path_under_src_dir() {
        assert_eq!(plugin().middleware_path(), PathBuf::from("/project/src/middleware"));
    }

    #[test]
    fn test_options_seed_middleware_input() {
        let options = plugin().options(BuildOptions::default());
        assert_eq!(options.entries(), vec![MIDDLEWARE_MODULE_ID]);
    }

    #[tokio::test]
    async fn test_sentinel_resolves_to_itself() {
        let resolved = plugin().resolve_id(EMPTY_MIDDLEWARE, &NothingResolver).await.unwrap();
        assert_eq!(resolved.as_deref(), Some(EMPTY_MIDDLEWARE));
    }

    #[tokio::test]
    async fn test_load_ignores_other_ids() {
        assert!(plugin().load("/project/src/pages/index.ts").await.unwrap().is_none());
        assert!(plugin().load(MIDDLEWARE_MODULE_ID).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_build_mode_reaches_plugin_logs() {
        let (logging, sink) = LogOptions::memory(LogLevel::Debug);
        let options = StaticBuildOptions::new("/project", logging).with_mode(RuntimeMode::Development);
        let build = plugin_middleware(&options);
        assert_eq!(build.bundler_plugin().mode(), RuntimeMode::Development);

        let resolved = build
            .bundler_plugin()
            .resolve_id(MIDDLEWARE_MODULE_ID, &NothingResolver)
            .await
            .unwrap();
        assert_eq!(resolved.as_deref(), Some(EMPTY_MIDDLEWARE));

        let entries = sink.with_label(LOG_LABEL);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].fields["mode"], serde_json::json!("development"));
        assert_eq!(entries[0].fields["searched"], serde_json::json!("/project/src/middleware"));
    }

    #[test]
    fn test_default_build_mode_is_production() {
        assert_eq!(plugin().mode(), RuntimeMode::Production);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_src_dir_is_malformed() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let src_dir = PathBuf::from(OsStr::from_bytes(b"/project/sr\xffc"));
        let plugin = MiddlewarePlugin::new(src_dir, LogOptions::new(LogLevel::Silent));

        let err = plugin
            .resolve_id(MIDDLEWARE_MODULE_ID, &NothingResolver)
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Resolve(ResolveError::Malformed { .. })));
    }

    #[test]
    fn test_registers_for_ssr_pass() {
        let build = plugin_middleware(&StaticBuildOptions::new(
            "/project",
            LogOptions::new(LogLevel::Silent),
        ));
        assert_eq!(build.target(), BuildTarget::Ssr);
        assert_eq!(build.bundler_plugin().middleware_path(), PathBuf::from("/project/src/middleware"));

        let hook = build.before_build();
        let contributed = hook.bundler_plugin.expect("plugin contributed");
        assert_eq!(contributed.name(), MIDDLEWARE_PLUGIN_NAME);
    }
}
