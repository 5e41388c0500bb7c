//! Request middleware.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use http::Response;
use stellar_core::{HandlerExport, RequestContext, RouteMatch};

use crate::environment::Environment;
use crate::error::RenderError;
use crate::pipeline::PageRenderer;

/// Continuation handed to middleware; renders the matched page.
pub struct Next<'a> {
    pub(crate) env: &'a Environment,
    pub(crate) ctx: &'a RequestContext,
    pub(crate) route: &'a RouteMatch,
    pub(crate) renderer: &'a dyn PageRenderer,
}

impl Next<'_> {
    /// The matched route.
    pub fn route(&self) -> &RouteMatch {
        self.route
    }

    /// Render the page.
    pub async fn run(self) -> Result<Response<String>, RenderError> {
        self.renderer.render(self.env, self.ctx, self.route).await
    }
}

/// A project's request interception hook (`onRequest`).
#[async_trait]
pub trait MiddlewareHandler: Send + Sync {
    async fn on_request(
        &self,
        ctx: &RequestContext,
        next: Next<'_>,
    ) -> Result<Response<String>, RenderError>;
}

/// The loaded middleware module.
///
/// A project without middleware loads the synthesized stub, which has no
/// handler; callers branch on [`MiddlewareModule::on_request`].
#[derive(Clone, Default)]
pub struct MiddlewareModule {
    on_request: Option<Arc<dyn MiddlewareHandler>>,
}

impl MiddlewareModule {
    /// Module with no handler.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Module exporting the given handler.
    pub fn new(handler: Arc<dyn MiddlewareHandler>) -> Self {
        Self {
            on_request: Some(handler),
        }
    }

    /// Pair a built module's source with the handler registered for it.
    ///
    /// Source whose `onRequest` export is explicitly `undefined` yields an
    /// empty module. Source that exports a handler must come with one, and a
    /// handler cannot be paired with source that never exports it.
    pub fn from_source(
        source: &str,
        handler: Option<Arc<dyn MiddlewareHandler>>,
    ) -> Result<Self, RenderError> {
        match (HandlerExport::of_source(source), handler) {
            (HandlerExport::Present, Some(handler)) => Ok(Self::new(handler)),
            (HandlerExport::Present, None) => Err(RenderError::Middleware(
                "module exports `onRequest` but no handler was registered for it".to_string(),
            )),
            (HandlerExport::Missing, Some(_)) => Err(RenderError::Middleware(
                "a handler was registered but the module does not export `onRequest`".to_string(),
            )),
            (HandlerExport::Absent, _) | (HandlerExport::Missing, None) => Ok(Self::empty()),
        }
    }

    /// The handler, if the project configured one.
    pub fn on_request(&self) -> Option<&Arc<dyn MiddlewareHandler>> {
        self.on_request.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.on_request.is_some()
    }
}

impl fmt::Debug for MiddlewareModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareModule")
            .field("on_request", &self.on_request.as_ref().map(|_| "<handler>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_core::EMPTY_MIDDLEWARE_SOURCE;

    struct Passthrough;

    #[async_trait]
    impl MiddlewareHandler for Passthrough {
        async fn on_request(
            &self,
            _ctx: &RequestContext,
            next: Next<'_>,
        ) -> Result<Response<String>, RenderError> {
            next.run().await
        }
    }

    #[test]
    fn test_stub_source_yields_empty_module() {
        let module = MiddlewareModule::from_source(EMPTY_MIDDLEWARE_SOURCE, None).unwrap();
        assert!(!module.is_configured());
        assert!(module.on_request().is_none());
    }

    #[test]
    fn test_stub_source_ignores_registered_handler() {
        let module =
            MiddlewareModule::from_source(EMPTY_MIDDLEWARE_SOURCE, Some(Arc::new(Passthrough)))
                .unwrap();
        assert!(!module.is_configured());
    }

    #[test]
    fn test_user_source_requires_handler() {
        let src = "export const onRequest = (ctx, next) => next();";

        assert!(MiddlewareModule::from_source(src, None).is_err());

        let module = MiddlewareModule::from_source(src, Some(Arc::new(Passthrough))).unwrap();
        assert!(module.is_configured());
    }

    #[test]
    fn test_typescript_handler_keeps_registered_handler() {
        let src = "export const onRequest: MiddlewareHandler = async (ctx, next) => next();";
        let module = MiddlewareModule::from_source(src, Some(Arc::new(Passthrough))).unwrap();
        assert!(module.is_configured());

        let src = "const handle = defineMiddleware(auth);\nexport { handle as onRequest };";
        let module = MiddlewareModule::from_source(src, Some(Arc::new(Passthrough))).unwrap();
        assert!(module.is_configured());
    }

    #[test]
    fn test_handler_without_export_is_rejected() {
        let src = "export const config = { auth: true };";

        let err = MiddlewareModule::from_source(src, Some(Arc::new(Passthrough))).unwrap_err();
        assert!(matches!(err, RenderError::Middleware(_)));

        assert!(!MiddlewareModule::from_source(src, None).unwrap().is_configured());
    }
}
