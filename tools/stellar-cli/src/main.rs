//! Stellar CLI - Command line tool for Stellar SSR projects.
//!
//! Commands:
//! - `stellar info` - Show the render environment built from project config
//! - `stellar build` - Run the SSR plugin pass and report selected modules

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stellar_observability::LogTarget;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{BuildArgs, InfoArgs};
use config::StellarConfig;

/// Stellar CLI - Inspect and build Stellar SSR projects
#[derive(Parser)]
#[command(name = "stellar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the render environment for this project
    Info(InfoArgs),

    /// Run the SSR build plugins over the project inputs
    Build(BuildArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;
    init_tracing(&ctx.config)?;

    let result = match cli.command {
        Commands::Info(args) => commands::info::run(args, &ctx).await,
        Commands::Build(args) => commands::build::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

/// Install a subscriber when project logs are routed through `tracing`.
fn init_tracing(config: &StellarConfig) -> Result<()> {
    if config.logging.dest != LogTarget::Tracing {
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.tracing_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
