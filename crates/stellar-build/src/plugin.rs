//! Bundler plugin hooks and build-phase registration.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::input::BuildOptions;
use crate::resolver::ModuleResolver;

/// Hooks a bundler calls while building a module graph.
///
/// Returning `Ok(None)` from `resolve_id` or `load` defers to the next
/// plugin, then to the bundler's default behavior.
#[async_trait]
pub trait BundlerPlugin: Send + Sync {
    /// Plugin name used in diagnostics.
    fn name(&self) -> &str;

    /// Adjust the bundler's options before the build starts.
    fn options(&self, options: BuildOptions) -> BuildOptions {
        options
    }

    /// Map an import specifier to a module id.
    async fn resolve_id(
        &self,
        _id: &str,
        _resolver: &dyn ModuleResolver,
    ) -> Result<Option<String>, BuildError> {
        Ok(None)
    }

    /// Supply the source text for a module id.
    async fn load(&self, _id: &str) -> Result<Option<String>, BuildError> {
        Ok(None)
    }
}

/// Which output a build pass produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTarget {
    Client,
    Ssr,
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Ssr => write!(f, "ssr"),
        }
    }
}

/// What a build plugin contributes when its phase begins.
#[derive(Default, Clone)]
pub struct BuildHookResult {
    /// Bundler plugin to install for this pass, if any.
    pub bundler_plugin: Option<Arc<dyn BundlerPlugin>>,
}

impl fmt::Debug for BuildHookResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildHookResult")
            .field("bundler_plugin", &self.bundler_plugin.as_ref().map(|p| p.name()))
            .finish()
    }
}

/// Registration with the static build orchestrator.
pub trait BuildPlugin: Send + Sync {
    /// Pass this plugin takes part in.
    fn target(&self) -> BuildTarget;

    /// Called once before the bundler starts the pass.
    fn before_build(&self) -> BuildHookResult;
}
