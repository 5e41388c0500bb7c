//! Project configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stellar_cache::RouteCache;
use stellar_core::{MarkdownOptions, RendererDescriptor, RuntimeMode};
use stellar_observability::{LogFormat, LogLevel, LogOptions, LogTarget};
use stellar_render::{default_client_directives, EnvironmentConfig, IdentityResolver};

/// Contents of `stellar.toml` / `stellar.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StellarConfig {
    /// Project layout and render settings.
    #[serde(default)]
    pub project: ProjectConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Renderer integrations.
    #[serde(default)]
    pub renderers: Vec<RendererDescriptor>,

    /// Markdown options, passed through untouched.
    #[serde(default)]
    pub markdown: MarkdownOptions,
}

impl StellarConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Logging options for the environment and build.
    pub fn log_options(&self) -> LogOptions {
        LogOptions::new(self.logging.level)
            .with_format(self.logging.format)
            .with_dest(self.logging.dest.into())
    }

    /// Default `tracing` filter directive for the configured level.
    pub fn tracing_filter(&self) -> String {
        let level = match self.logging.level {
            LogLevel::Silent => "off".to_string(),
            level => level.to_string().to_ascii_lowercase(),
        };
        format!("stellar={}", level)
    }

    /// Project root, relative paths taken from `base`.
    pub fn root(&self, base: &Path) -> PathBuf {
        match &self.project.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => base.join(root),
            None => base.to_path_buf(),
        }
    }

    /// Source directory under the project root.
    pub fn src_dir(&self, base: &Path) -> PathBuf {
        self.root(base).join(&self.project.src_dir)
    }

    /// Full environment configuration, with a fresh route cache.
    pub fn environment_config(&self, mode: RuntimeMode) -> EnvironmentConfig {
        let logging = self.log_options();
        EnvironmentConfig {
            adapter_name: self.project.adapter.clone(),
            route_cache: RouteCache::new(logging.clone(), mode),
            logging: Some(logging),
            markdown: self.markdown.clone(),
            mode,
            renderers: self.renderers.clone(),
            client_directives: default_client_directives(),
            resolve: Arc::new(IdentityResolver),
            site: self.project.site.clone(),
            ssr: self.project.output.is_ssr(),
            streaming: self.project.streaming,
        }
    }
}

/// Project layout and render settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project root (default: the config file's directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Source directory relative to the root (default: src).
    #[serde(default = "default_src_dir")]
    pub src_dir: PathBuf,

    /// Public site URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,

    /// Deployment adapter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,

    /// Output kind.
    #[serde(default)]
    pub output: OutputKind,

    /// Whether HTML responses stream.
    #[serde(default = "default_true")]
    pub streaming: bool,

    /// Runtime mode (default: development).
    #[serde(default)]
    pub mode: RuntimeMode,
}

fn default_src_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_true() -> bool {
    true
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: None,
            src_dir: default_src_dir(),
            site: None,
            adapter: None,
            output: OutputKind::default(),
            streaming: true,
            mode: RuntimeMode::default(),
        }
    }
}

/// How pages are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Prerendered at build time.
    #[default]
    Static,
    /// Rendered per request.
    Server,
    /// Prerendered by default, per request where opted in.
    Hybrid,
}

impl OutputKind {
    /// Whether any page renders on the server at request time.
    pub fn is_ssr(self) -> bool {
        !matches!(self, Self::Static)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LogFormat,
    /// `stderr`, or `tracing` to hand entries to the CLI's subscriber.
    #[serde(default)]
    pub dest: LogTarget,
}
