//! Render configuration passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A framework renderer loaded for server rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererDescriptor {
    /// Renderer name (e.g., "@stellar/preact").
    pub name: String,
    /// Client-side hydration entrypoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_entrypoint: Option<String>,
    /// Server-side render entrypoint.
    pub server_entrypoint: String,
}

impl RendererDescriptor {
    /// Create a renderer descriptor.
    pub fn new(name: impl Into<String>, server_entrypoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client_entrypoint: None,
            server_entrypoint: server_entrypoint.into(),
        }
    }

    /// Set the client entrypoint.
    pub fn with_client_entrypoint(mut self, entrypoint: impl Into<String>) -> Self {
        self.client_entrypoint = Some(entrypoint.into());
        self
    }
}

/// Configuration for the Markdown subsystem.
///
/// Opaque to the render layer; handed to the Markdown engine as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkdownOptions(pub Map<String, Value>);

impl MarkdownOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get an option.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_options_serialize_as_plain_object() {
        let opts = MarkdownOptions::new()
            .with("gfm", true)
            .with("syntaxHighlight", "shiki");

        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["gfm"], Value::Bool(true));

        let back: MarkdownOptions = serde_json::from_value(json).unwrap();
        assert_eq!(back.get("syntaxHighlight"), Some(&Value::from("shiki")));
    }
}
