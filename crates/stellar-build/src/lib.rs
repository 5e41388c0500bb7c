//! Static build plugins for Stellar.
//!
//! This crate provides:
//! - `BundlerPlugin` / `BuildPlugin` - Bundler hooks and build-phase registration
//! - `plugin_middleware` - Resolves the middleware virtual module for the SSR pass
//! - `FsModuleResolver` - Filesystem module resolution plugins delegate to
//! - `PluginDriver` - Runs plugin hooks over the build inputs
//!
//! # Example
//!
//! ```rust,ignore
//! let build_plugin: Arc<dyn BuildPlugin> = Arc::new(plugin_middleware(&options));
//! let resolver = Arc::new(FsModuleResolver::new(&options.root));
//! let driver = PluginDriver::for_target(BuildTarget::Ssr, &[build_plugin], resolver, logging);
//!
//! let inputs = driver.options(BuildOptions::default());
//! let modules = driver.build_inputs(&inputs).await?;
//! ```

mod driver;
mod error;
mod input;
mod middleware;
mod plugin;
mod resolver;

pub use driver::*;
pub use error::*;
pub use input::*;
pub use middleware::*;
pub use plugin::*;
pub use resolver::*;
