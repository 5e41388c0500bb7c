//! Show the render environment built from project config.

use anyhow::Result;
use stellar_render::create_environment;

use super::InfoArgs;
use crate::context::Context;
use crate::output::flag;

/// Run the info command.
pub async fn run(args: InfoArgs, ctx: &Context) -> Result<()> {
    let mode = args.mode.unwrap_or(ctx.config.project.mode);
    let env = create_environment(ctx.config.environment_config(mode))?;
    let summary = env.summary();

    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return Ok(());
    }

    ctx.output.header("Render environment");
    ctx.output.kv("Root", &ctx.root().display().to_string());
    ctx.output.kv("Mode", summary.mode.as_str());
    ctx.output.kv("Adapter", summary.adapter_name.as_deref().unwrap_or("none"));
    ctx.output.kv("Site", summary.site.as_deref().unwrap_or("unset"));
    ctx.output.kv("SSR", &flag(summary.ssr));
    ctx.output.kv("Streaming", &flag(summary.streaming));
    ctx.output.kv(
        "Route cache",
        if summary.mode.is_production() {
            "persistent"
        } else {
            "cleared per request"
        },
    );

    ctx.output.header("Renderers");
    if summary.renderers.is_empty() {
        ctx.output.list_item("none");
    }
    for name in &summary.renderers {
        ctx.output.list_item(name);
    }

    ctx.output.header("Client directives");
    for name in &summary.client_directives {
        ctx.output.list_item(name);
    }

    Ok(())
}
