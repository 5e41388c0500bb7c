//! CLI command implementations.

pub mod build;
pub mod info;

use clap::Args;
use stellar_core::RuntimeMode;

/// Arguments for the info command.
#[derive(Args)]
pub struct InfoArgs {
    /// Runtime mode (overrides config).
    #[arg(short, long)]
    pub mode: Option<RuntimeMode>,
}

/// Arguments for the build command.
#[derive(Args)]
pub struct BuildArgs {
    /// Runtime mode (default: production).
    #[arg(short, long)]
    pub mode: Option<RuntimeMode>,

    /// Extra entry modules, relative to the project root.
    #[arg(short, long)]
    pub input: Vec<String>,
}
