//! Run the SSR plugin pass over the project inputs.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;
use stellar_build::{
    plugin_middleware, BuildOptions, BuildPlugin, BuildTarget, FsModuleResolver, LoadedModule,
    PluginDriver, StaticBuildOptions,
};
use stellar_core::{HandlerExport, RuntimeMode, EMPTY_MIDDLEWARE, MIDDLEWARE_MODULE_ID};

use super::BuildArgs;
use crate::context::Context;

#[derive(Serialize)]
struct BuildReport<'a> {
    target: BuildTarget,
    mode: RuntimeMode,
    plugins: Vec<&'a str>,
    modules: Vec<ModuleReport<'a>>,
}

#[derive(Serialize)]
struct ModuleReport<'a> {
    request: &'a str,
    id: String,
    #[serde(rename = "virtual")]
    is_virtual: bool,
    bytes: usize,
}

/// Run the build command.
pub async fn run(args: BuildArgs, ctx: &Context) -> Result<()> {
    let root = ctx.root();
    let mode = args.mode.unwrap_or(RuntimeMode::Production);
    let logging = ctx.config.log_options();

    let options = StaticBuildOptions::new(&root, logging.clone())
        .with_src_dir(ctx.src_dir())
        .with_mode(mode);

    ctx.output.header("Building SSR entries");
    ctx.output.kv("Mode", mode.as_str());
    ctx.output.step(1, 3, "Registering build plugins");

    let build_plugins: Vec<Arc<dyn BuildPlugin>> = vec![Arc::new(plugin_middleware(&options))];
    let driver = PluginDriver::for_target(
        BuildTarget::Ssr,
        &build_plugins,
        Arc::new(FsModuleResolver::new(&root)),
        logging,
    );
    for name in driver.plugin_names() {
        ctx.output.debug(&format!("plugin {}", name));
    }

    ctx.output.step(2, 3, "Resolving entries");
    let inputs: Vec<&str> = args.input.iter().map(String::as_str).collect();
    let build_options = driver.options(BuildOptions::with_inputs(&inputs));

    ctx.output.step(3, 3, "Loading modules");
    let modules = driver
        .build_inputs(&build_options)
        .await
        .with_context(|| format!("SSR build failed in {}", root.display()))?;

    if ctx.output.is_json() {
        ctx.output.json(&BuildReport {
            target: driver.target(),
            mode,
            plugins: driver.plugin_names(),
            modules: modules.iter().map(module_report).collect(),
        });
        return Ok(());
    }

    for module in &modules {
        if module.request == MIDDLEWARE_MODULE_ID {
            report_middleware(ctx, module);
        } else {
            ctx.output.kv(&module.request, &module.id);
        }
    }

    ctx.output.success(&format!("Loaded {} entry module(s)", modules.len()));
    Ok(())
}

fn module_report(module: &LoadedModule) -> ModuleReport<'_> {
    ModuleReport {
        request: &module.request,
        id: module.id.escape_default().to_string(),
        is_virtual: module.is_virtual,
        bytes: module.source.len(),
    }
}

fn report_middleware(ctx: &Context, module: &LoadedModule) {
    if module.id == EMPTY_MIDDLEWARE {
        ctx.output.kv("Middleware", "none (empty module)");
        return;
    }

    ctx.output.kv("Middleware", &module.id);
    match HandlerExport::of_source(&module.source) {
        HandlerExport::Present => {}
        HandlerExport::Absent => ctx.output.warn("Middleware exports onRequest as undefined"),
        HandlerExport::Missing => ctx.output.warn("Middleware does not export onRequest"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_carries_build_mode() {
        let report = BuildReport {
            target: BuildTarget::Ssr,
            mode: RuntimeMode::Development,
            plugins: vec!["@stellar/plugin-middleware"],
            modules: Vec::new(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "development");
        assert_eq!(json["target"], "ssr");
    }
}
