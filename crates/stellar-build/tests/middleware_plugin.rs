//! Middleware module resolution against real and failing resolvers.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use stellar_build::{
    plugin_middleware, BuildError, BuildOptions, BuildPlugin, BundlerPlugin, FsModuleResolver,
    MiddlewarePlugin, ModuleResolver, PluginDriver, ResolveError, ResolvedId, StaticBuildOptions,
};
use stellar_build::BuildTarget;
use stellar_core::{HandlerExport, EMPTY_MIDDLEWARE, MIDDLEWARE_MODULE_ID};
use stellar_observability::{LogLevel, LogOptions};

fn silent() -> LogOptions {
    LogOptions::new(LogLevel::Silent)
}

fn project(with_middleware: Option<&str>) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src/pages")).unwrap();
    std::fs::write(dir.path().join("src/pages/index.ts"), "export default 1").unwrap();
    if let Some(source) = with_middleware {
        std::fs::write(dir.path().join("src/middleware.ts"), source).unwrap();
    }
    dir
}

fn plugin_for(root: &Path) -> MiddlewarePlugin {
    MiddlewarePlugin::new(root.join("src"), silent())
}

/// Fails every lookup with the given error kind.
struct BrokenResolver {
    malformed: bool,
}

#[async_trait]
impl ModuleResolver for BrokenResolver {
    async fn resolve(&self, specifier: &str) -> Result<ResolvedId, ResolveError> {
        if self.malformed {
            Err(ResolveError::Malformed {
                specifier: specifier.to_string(),
                reason: "unsupported scheme".into(),
            })
        } else {
            Err(ResolveError::Io {
                specifier: specifier.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }
    }
}

#[tokio::test]
async fn resolves_to_project_middleware_when_present() {
    let dir = project(Some("export const onRequest = (ctx, next) => next();"));
    let resolver = FsModuleResolver::new(dir.path());

    let resolved = plugin_for(dir.path())
        .resolve_id(MIDDLEWARE_MODULE_ID, &resolver)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(Path::new(&resolved), dir.path().join("src/middleware.ts"));
}

#[tokio::test]
async fn falls_back_to_empty_module_when_absent() {
    let dir = project(None);
    let resolver = FsModuleResolver::new(dir.path());
    let plugin = plugin_for(dir.path());

    let resolved = plugin.resolve_id(MIDDLEWARE_MODULE_ID, &resolver).await.unwrap();
    assert_eq!(resolved.as_deref(), Some(EMPTY_MIDDLEWARE));

    let source = plugin.load(EMPTY_MIDDLEWARE).await.unwrap().unwrap();
    assert_eq!(HandlerExport::of_source(&source), HandlerExport::Absent);
}

#[tokio::test]
async fn unrelated_ids_are_left_to_other_resolvers() {
    let dir = project(Some("export const onRequest = undefined"));
    let resolver = FsModuleResolver::new(dir.path());
    let plugin = plugin_for(dir.path());

    for id in ["./pages/index.ts", "react", "@stellar-middleware/extra", "middleware"] {
        assert!(plugin.resolve_id(id, &resolver).await.unwrap().is_none(), "{id}");
    }
}

#[tokio::test]
async fn resolver_failures_other_than_not_found_propagate() {
    let dir = project(None);
    let plugin = plugin_for(dir.path());

    let err = plugin
        .resolve_id(MIDDLEWARE_MODULE_ID, &BrokenResolver { malformed: true })
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Resolve(ResolveError::Malformed { .. })));

    let err = plugin
        .resolve_id(MIDDLEWARE_MODULE_ID, &BrokenResolver { malformed: false })
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Resolve(ResolveError::Io { .. })));
}

#[tokio::test]
async fn options_hook_keeps_existing_inputs() {
    let dir = project(None);
    let plugin = plugin_for(dir.path());

    let options = plugin.options(BuildOptions::with_inputs(&["src/pages/index.ts"]));
    assert_eq!(options.entries(), vec!["src/pages/index.ts", MIDDLEWARE_MODULE_ID]);

    let again = plugin.options(options.clone());
    assert_eq!(again, options);
}

#[tokio::test]
async fn ssr_pass_loads_project_middleware() {
    let source = "import type { MiddlewareHandler } from 'stellar';\n\nexport const onRequest: MiddlewareHandler = async (ctx, next) => next();\n";
    let dir = project(Some(source));
    let build_options = StaticBuildOptions::new(dir.path(), silent());
    let build_plugins: Vec<Arc<dyn BuildPlugin>> = vec![Arc::new(plugin_middleware(&build_options))];

    let driver = PluginDriver::for_target(
        BuildTarget::Ssr,
        &build_plugins,
        Arc::new(FsModuleResolver::new(dir.path())),
        silent(),
    );
    assert_eq!(driver.plugin_names(), vec!["@stellar/plugin-middleware"]);

    let inputs = driver.options(BuildOptions::with_inputs(&["src/pages/index.ts"]));
    let modules = driver.build_inputs(&inputs).await.unwrap();

    assert_eq!(modules.len(), 2);
    let middleware = &modules[1];
    assert_eq!(middleware.request, MIDDLEWARE_MODULE_ID);
    assert_eq!(middleware.source, source);
    assert!(!middleware.is_virtual);
    assert_eq!(HandlerExport::of_source(&middleware.source), HandlerExport::Present);
}

#[tokio::test]
async fn ssr_pass_synthesizes_empty_middleware() {
    let dir = project(None);
    let build_options = StaticBuildOptions::new(dir.path(), silent());
    let build_plugins: Vec<Arc<dyn BuildPlugin>> = vec![Arc::new(plugin_middleware(&build_options))];

    let driver = PluginDriver::for_target(
        BuildTarget::Ssr,
        &build_plugins,
        Arc::new(FsModuleResolver::new(dir.path())),
        silent(),
    );
    let inputs = driver.options(BuildOptions::default());
    let modules = driver.build_inputs(&inputs).await.unwrap();

    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].id, EMPTY_MIDDLEWARE);
    assert!(modules[0].is_virtual);
    assert_eq!(HandlerExport::of_source(&modules[0].source), HandlerExport::Absent);
}

#[tokio::test]
async fn client_pass_does_not_install_middleware_plugin() {
    let dir = project(None);
    let build_options = StaticBuildOptions::new(dir.path(), silent());
    let build_plugins: Vec<Arc<dyn BuildPlugin>> = vec![Arc::new(plugin_middleware(&build_options))];

    let driver = PluginDriver::for_target(
        BuildTarget::Client,
        &build_plugins,
        Arc::new(FsModuleResolver::new(dir.path())),
        silent(),
    );
    assert!(driver.plugin_names().is_empty());

    // Without the plugin the logical id is just an unresolvable specifier.
    let err = driver
        .build_inputs(&BuildOptions::with_inputs(&[MIDDLEWARE_MODULE_ID]))
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Unresolved(ref id) if id == MIDDLEWARE_MODULE_ID));
}

#[tokio::test]
async fn unclaimed_virtual_id_is_an_error() {
    let dir = project(None);
    let driver = PluginDriver::for_target(
        BuildTarget::Ssr,
        &[],
        Arc::new(FsModuleResolver::new(dir.path())),
        silent(),
    );

    let err = driver.load(EMPTY_MIDDLEWARE).await.unwrap_err();
    assert!(matches!(err, BuildError::UnloadableVirtual(_)));
}
