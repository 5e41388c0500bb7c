//! Request context passed through the render pipeline.

use std::fmt;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use http::{HeaderMap, Method, Request};

/// Unique request identifier for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:x}-{:x}", nanos, seq))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-request data handed to route resolution, middleware and page rendering.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// URL pathname, without query string.
    pub pathname: String,
    /// Raw query string, if any.
    pub query: Option<String>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Client address, when the host adapter provides one.
    pub client_address: Option<IpAddr>,
}

impl RequestContext {
    /// Create a context for a bare method and pathname.
    pub fn new(method: Method, pathname: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            method,
            pathname: pathname.into(),
            query: None,
            headers: HeaderMap::new(),
            client_address: None,
        }
    }

    /// Build a context from an incoming HTTP request.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            request_id: RequestId::generate(),
            method: request.method().clone(),
            pathname: request.uri().path().to_string(),
            query: request.uri().query().map(String::from),
            headers: request.headers().clone(),
            client_address: None,
        }
    }

    /// Attach the client address reported by the host.
    pub fn with_client_address(mut self, addr: IpAddr) -> Self {
        self.client_address = Some(addr);
        self
    }

    /// Get a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_request_splits_path_and_query() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("https://example.com/blog/post?page=2")
            .header("accept-language", "en")
            .body(())
            .unwrap();

        let ctx = RequestContext::from_request(&request);

        assert_eq!(ctx.method, Method::GET);
        assert_eq!(ctx.pathname, "/blog/post");
        assert_eq!(ctx.query.as_deref(), Some("page=2"));
        assert_eq!(ctx.header("Accept-Language"), Some("en"));
        assert!(ctx.client_address.is_none());
    }
}
