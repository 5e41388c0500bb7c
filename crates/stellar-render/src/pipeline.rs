//! Per-request render pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use http::{Request, Response};
use stellar_core::{RequestContext, RouteMatch};

use crate::environment::Environment;
use crate::error::RenderError;
use crate::middleware::{MiddlewareModule, Next};
use crate::routing::{resolve_route, RouteMatcher};

/// Produces the response for a matched route (HTML streaming, endpoints).
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(
        &self,
        env: &Environment,
        ctx: &RequestContext,
        route: &RouteMatch,
    ) -> Result<Response<String>, RenderError>;
}

/// Handles requests against one shared environment.
///
/// # Example
///
/// ```rust,ignore
/// let env = Arc::new(create_environment(config)?);
/// let pipeline = RenderPipeline::new(env, matcher, renderer)
///     .with_middleware(middleware);
///
/// let response = pipeline.handle_request(&request).await?;
/// ```
pub struct RenderPipeline {
    env: Arc<Environment>,
    matcher: Arc<dyn RouteMatcher>,
    renderer: Arc<dyn PageRenderer>,
    middleware: MiddlewareModule,
}

impl RenderPipeline {
    /// Create a pipeline without middleware.
    pub fn new(
        env: Arc<Environment>,
        matcher: Arc<dyn RouteMatcher>,
        renderer: Arc<dyn PageRenderer>,
    ) -> Self {
        Self {
            env,
            matcher,
            renderer,
            middleware: MiddlewareModule::empty(),
        }
    }

    /// Set the loaded middleware module.
    pub fn with_middleware(mut self, middleware: MiddlewareModule) -> Self {
        self.middleware = middleware;
        self
    }

    /// The shared environment.
    pub fn environment(&self) -> &Arc<Environment> {
        &self.env
    }

    /// Handle an HTTP request.
    pub async fn handle_request<B>(&self, request: &Request<B>) -> Result<Response<String>, RenderError> {
        self.handle(RequestContext::from_request(request)).await
    }

    /// Handle a request context.
    pub async fn handle(&self, ctx: RequestContext) -> Result<Response<String>, RenderError> {
        let env = self.env.as_ref();
        env.begin_request();

        let route = resolve_route(env, &ctx.pathname, self.matcher.as_ref())
            .await?
            .ok_or_else(|| RenderError::RouteNotFound(ctx.pathname.clone()))?;

        let next = Next {
            env,
            ctx: &ctx,
            route: &route,
            renderer: self.renderer.as_ref(),
        };

        match self.middleware.on_request() {
            Some(handler) => handler.on_request(&ctx, next).await,
            None => next.run().await,
        }
    }
}
