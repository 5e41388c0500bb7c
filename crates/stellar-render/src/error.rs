//! Error types for the render layer.

use thiserror::Error;

/// Errors raised while constructing an environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The logging configuration was not supplied.
    #[error("Configuration error: render environment requires `logging` options")]
    MissingLogging,
}

/// Errors that can occur while handling a request.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No route matches the pathname.
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// The route matcher failed.
    #[error("Route matching failed for {pathname}: {source}")]
    Match {
        pathname: String,
        #[source]
        source: anyhow::Error,
    },

    /// The asset resolver failed.
    #[error("Could not resolve asset '{specifier}': {source}")]
    Resolve {
        specifier: String,
        #[source]
        source: anyhow::Error,
    },

    /// Client address requested on a static (non-SSR) build.
    #[error("Client address is only available in server-rendered output. Enable `output: \"server\"` or `\"hybrid\"` to use it.")]
    StaticClientAddressNotAvailable,

    /// Client address requested but the host did not provide one.
    #[error("{}", client_address_message(.adapter.as_deref()))]
    ClientAddressNotAvailable { adapter: Option<String> },

    /// Middleware module and registered handler disagree.
    #[error("Middleware error: {0}")]
    Middleware(String),

    /// Page renderer error.
    #[error("Render error: {0}")]
    Render(String),
}

fn client_address_message(adapter: Option<&str>) -> String {
    match adapter {
        Some(name) => format!(
            "Client address is not available in the `{}` adapter. File an issue with the adapter to add support.",
            name
        ),
        None => "Client address is not available in your environment. Ensure that you are using an SSR adapter that supports this feature.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_address_message_names_adapter() {
        let err = RenderError::ClientAddressNotAvailable {
            adapter: Some("@stellar/node".to_string()),
        };
        assert!(err.to_string().contains("`@stellar/node` adapter"));

        let err = RenderError::ClientAddressNotAvailable { adapter: None };
        assert!(err.to_string().contains("your environment"));
    }

    #[test]
    fn test_missing_logging_message() {
        assert!(ConfigError::MissingLogging.to_string().contains("`logging`"));
    }
}
