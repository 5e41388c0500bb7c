//! Runs bundler plugin hooks for one build pass.

use std::sync::Arc;

use stellar_observability::LogOptions;

use crate::error::BuildError;
use crate::input::BuildOptions;
use crate::plugin::{BuildPlugin, BuildTarget, BundlerPlugin};
use crate::resolver::ModuleResolver;

const LOG_LABEL: &str = "build";

/// An entry module after resolution and loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    /// Specifier as it appeared in the input.
    pub request: String,
    /// Resolved module id.
    pub id: String,
    /// Module source text.
    pub source: String,
    /// Whether the module was synthesized by a plugin.
    pub is_virtual: bool,
}

/// Drives bundler plugins in registration order.
///
/// # Example
///
/// ```rust,ignore
/// let driver = PluginDriver::for_target(BuildTarget::Ssr, &plugins, resolver, logging);
/// let options = driver.options(BuildOptions::default());
/// let modules = driver.build_inputs(&options).await?;
/// ```
pub struct PluginDriver {
    target: BuildTarget,
    plugins: Vec<Arc<dyn BundlerPlugin>>,
    resolver: Arc<dyn ModuleResolver>,
    logging: LogOptions,
}

impl PluginDriver {
    /// Collect the bundler plugins that build plugins contribute to `target`.
    pub fn for_target(
        target: BuildTarget,
        build_plugins: &[Arc<dyn BuildPlugin>],
        resolver: Arc<dyn ModuleResolver>,
        logging: LogOptions,
    ) -> Self {
        let plugins = build_plugins
            .iter()
            .filter(|p| p.target() == target)
            .filter_map(|p| p.before_build().bundler_plugin)
            .collect();

        Self {
            target,
            plugins,
            resolver,
            logging,
        }
    }

    pub fn target(&self) -> BuildTarget {
        self.target
    }

    /// Names of the installed bundler plugins.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Thread the bundler options through every plugin.
    pub fn options(&self, options: BuildOptions) -> BuildOptions {
        self.plugins
            .iter()
            .fold(options, |options, plugin| plugin.options(options))
    }

    /// Resolve a specifier, falling back to the host resolver.
    ///
    /// `Ok(None)` means nothing could resolve it.
    pub async fn resolve_id(&self, id: &str) -> Result<Option<String>, BuildError> {
        for plugin in &self.plugins {
            if let Some(resolved) = plugin.resolve_id(id, self.resolver.as_ref()).await? {
                return Ok(Some(resolved));
            }
        }

        match self.resolver.resolve(id).await {
            Ok(resolved) => Ok(Some(resolved.id)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a resolved module, returning its source and whether it is virtual.
    pub async fn load(&self, id: &str) -> Result<(String, bool), BuildError> {
        for plugin in &self.plugins {
            if let Some(source) = plugin.load(id).await? {
                return Ok((source, true));
            }
        }

        if id.starts_with('\0') {
            return Err(BuildError::UnloadableVirtual(id.to_string()));
        }

        let source = tokio::fs::read_to_string(id)
            .await
            .map_err(|source| BuildError::Read {
                id: id.to_string(),
                source,
            })?;
        Ok((source, false))
    }

    /// Resolve and load every entry in `options`.
    pub async fn build_inputs(&self, options: &BuildOptions) -> Result<Vec<LoadedModule>, BuildError> {
        let mut modules = Vec::new();
        for request in options.entries() {
            let id = self
                .resolve_id(request)
                .await?
                .ok_or_else(|| BuildError::Unresolved(request.to_string()))?;
            let (source, is_virtual) = self.load(&id).await?;

            self.logging
                .debug_builder(LOG_LABEL, "loaded entry")
                .field("target", self.target.to_string())
                .field("request", request)
                .field("id", id.escape_default().to_string())
                .field_bool("virtual", is_virtual)
                .emit();

            modules.push(LoadedModule {
                request: request.to_string(),
                id,
                source,
                is_virtual,
            });
        }
        Ok(modules)
    }
}
