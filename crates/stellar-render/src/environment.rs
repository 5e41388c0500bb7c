//! Render environment: the parts of rendering that do not change between requests.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use serde::Serialize;
use stellar_cache::RouteCache;
use stellar_core::{MarkdownOptions, RendererDescriptor, RequestContext, RuntimeMode};
use stellar_observability::LogOptions;

use crate::directives::default_client_directives;
use crate::error::{ConfigError, RenderError};
use crate::resolve::{AssetResolver, IdentityResolver};

/// Fully populated input for [`create_environment`].
///
/// Every field is semantically required; `logging` is checked at
/// construction and the rest are the caller's responsibility.
pub struct EnvironmentConfig {
    /// Deployment target, used to enrich error messages.
    pub adapter_name: Option<String>,
    /// Logging options.
    pub logging: Option<LogOptions>,
    /// Markdown engine configuration.
    pub markdown: MarkdownOptions,
    /// Runtime mode.
    pub mode: RuntimeMode,
    /// Renderers, in priority order.
    pub renderers: Vec<RendererDescriptor>,
    /// Client directive name to runtime script reference.
    pub client_directives: HashMap<String, String>,
    /// Asset specifier resolver.
    pub resolve: Arc<dyn AssetResolver>,
    /// Route cache owned by this environment.
    pub route_cache: RouteCache,
    /// Canonical site origin.
    pub site: Option<String>,
    /// Whether server rendering is enabled.
    pub ssr: bool,
    /// Whether responses may be flushed incrementally.
    pub streaming: bool,
}

/// The static parts of rendering, fixed at startup.
///
/// Built once per server process or build and shared read-only by every
/// request (wrap it in an `Arc`). Fields cannot be reassigned after
/// construction; only the route cache's contents change. No teardown is
/// needed since the environment holds no external resources.
pub struct Environment {
    adapter_name: Option<String>,
    logging: LogOptions,
    markdown: MarkdownOptions,
    mode: RuntimeMode,
    renderers: Vec<RendererDescriptor>,
    client_directives: HashMap<String, String>,
    resolve: Arc<dyn AssetResolver>,
    route_cache: RouteCache,
    site: Option<String>,
    ssr: bool,
    streaming: bool,
}

/// Build an environment from a fully populated configuration.
///
/// The configuration is taken as-is; defaults are the caller's job.
pub fn create_environment(config: EnvironmentConfig) -> Result<Environment, ConfigError> {
    let logging = config.logging.ok_or(ConfigError::MissingLogging)?;

    Ok(Environment {
        adapter_name: config.adapter_name,
        logging,
        markdown: config.markdown,
        mode: config.mode,
        renderers: config.renderers,
        client_directives: config.client_directives,
        resolve: config.resolve,
        route_cache: config.route_cache,
        site: config.site,
        ssr: config.ssr,
        streaming: config.streaming,
    })
}

/// Partial input for [`create_basic_environment`].
///
/// Has no route cache field: every environment built
/// from these options gets a fresh cache.
pub struct BasicEnvironmentOptions {
    pub logging: LogOptions,
    pub adapter_name: Option<String>,
    pub markdown: Option<MarkdownOptions>,
    pub mode: Option<RuntimeMode>,
    pub renderers: Option<Vec<RendererDescriptor>>,
    pub client_directives: Option<HashMap<String, String>>,
    pub resolve: Option<Arc<dyn AssetResolver>>,
    pub site: Option<String>,
    pub ssr: Option<bool>,
    pub streaming: Option<bool>,
}

impl BasicEnvironmentOptions {
    /// Options with only the mandatory logging set.
    pub fn new(logging: LogOptions) -> Self {
        Self {
            logging,
            adapter_name: None,
            markdown: None,
            mode: None,
            renderers: None,
            client_directives: None,
            resolve: None,
            site: None,
            ssr: None,
            streaming: None,
        }
    }

    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_adapter(mut self, name: impl Into<String>) -> Self {
        self.adapter_name = Some(name.into());
        self
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn with_renderers(mut self, renderers: Vec<RendererDescriptor>) -> Self {
        self.renderers = Some(renderers);
        self
    }

    pub fn with_client_directives(mut self, directives: HashMap<String, String>) -> Self {
        self.client_directives = Some(directives);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn AssetResolver>) -> Self {
        self.resolve = Some(resolver);
        self
    }

    pub fn with_markdown(mut self, markdown: MarkdownOptions) -> Self {
        self.markdown = Some(markdown);
        self
    }

    pub fn with_ssr(mut self, ssr: bool) -> Self {
        self.ssr = Some(ssr);
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = Some(streaming);
        self
    }
}

/// Build an environment filling sensible defaults.
///
/// Intended for tests and bootstrapping. Defaults: development mode, no
/// renderers, the built-in client directives, an identity resolver, SSR and
/// streaming on, empty Markdown options, and a new route cache.
pub fn create_basic_environment(options: BasicEnvironmentOptions) -> Environment {
    let mode = options.mode.unwrap_or_default();
    let route_cache = RouteCache::new(options.logging.clone(), mode);

    Environment {
        adapter_name: options.adapter_name,
        markdown: options.markdown.unwrap_or_default(),
        mode,
        renderers: options.renderers.unwrap_or_default(),
        client_directives: options
            .client_directives
            .unwrap_or_else(default_client_directives),
        resolve: options.resolve.unwrap_or_else(|| Arc::new(IdentityResolver)),
        route_cache,
        site: options.site,
        ssr: options.ssr.unwrap_or(true),
        streaming: options.streaming.unwrap_or(true),
        logging: options.logging,
    }
}

impl Environment {
    pub fn adapter_name(&self) -> Option<&str> {
        self.adapter_name.as_deref()
    }

    pub fn logging(&self) -> &LogOptions {
        &self.logging
    }

    pub fn markdown(&self) -> &MarkdownOptions {
        &self.markdown
    }

    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    pub fn renderers(&self) -> &[RendererDescriptor] {
        &self.renderers
    }

    pub fn client_directives(&self) -> &HashMap<String, String> {
        &self.client_directives
    }

    pub fn route_cache(&self) -> &RouteCache {
        &self.route_cache
    }

    pub fn site(&self) -> Option<&str> {
        self.site.as_deref()
    }

    pub fn ssr(&self) -> bool {
        self.ssr
    }

    pub fn streaming(&self) -> bool {
        self.streaming
    }

    /// Resolve an asset specifier to its served URL.
    pub async fn resolve(&self, specifier: &str) -> Result<String, RenderError> {
        self.resolve
            .resolve(specifier)
            .await
            .map_err(|source| RenderError::Resolve {
                specifier: specifier.to_string(),
                source,
            })
    }

    /// Prepare the route cache for a new request.
    ///
    /// Dev servers drop every cached match so on-disk route changes are
    /// picked up; built sites keep the cache for the life of the process.
    pub fn begin_request(&self) {
        if self.mode.is_development() {
            self.route_cache.clear_all();
        }
    }

    /// Client address of the request, as reported by the host adapter.
    pub fn client_address(&self, ctx: &RequestContext) -> Result<IpAddr, RenderError> {
        if !self.ssr {
            return Err(RenderError::StaticClientAddressNotAvailable);
        }
        ctx.client_address
            .ok_or_else(|| RenderError::ClientAddressNotAvailable {
                adapter: self.adapter_name.clone(),
            })
    }

    /// Serializable overview of the environment.
    pub fn summary(&self) -> EnvironmentSummary {
        let mut client_directives: Vec<String> = self.client_directives.keys().cloned().collect();
        client_directives.sort();

        EnvironmentSummary {
            adapter_name: self.adapter_name.clone(),
            mode: self.mode,
            renderers: self.renderers.iter().map(|r| r.name.clone()).collect(),
            client_directives,
            site: self.site.clone(),
            ssr: self.ssr,
            streaming: self.streaming,
            route_cache_generation: self.route_cache.generation(),
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("adapter_name", &self.adapter_name)
            .field("mode", &self.mode)
            .field("renderers", &self.renderers)
            .field("client_directives", &self.client_directives)
            .field("site", &self.site)
            .field("ssr", &self.ssr)
            .field("streaming", &self.streaming)
            .field("route_cache", &self.route_cache)
            .finish_non_exhaustive()
    }
}

/// Serializable overview of an [`Environment`].
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter_name: Option<String>,
    pub mode: RuntimeMode,
    pub renderers: Vec<String>,
    pub client_directives: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    pub ssr: bool,
    pub streaming: bool,
    pub route_cache_generation: u64,
}
