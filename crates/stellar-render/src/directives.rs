//! Built-in client hydration directives.

use std::collections::HashMap;

/// Names of the directives every environment supports out of the box.
pub const BUILTIN_CLIENT_DIRECTIVES: &[&str] = &["idle", "load", "media", "only", "visible"];

/// Runtime script reference for a built-in directive.
pub fn client_directive_script(name: &str) -> String {
    format!("/_stellar/client/directives/{}.js", name)
}

/// The platform's built-in directive set, keyed by directive name.
pub fn default_client_directives() -> HashMap<String, String> {
    BUILTIN_CLIENT_DIRECTIVES
        .iter()
        .map(|name| (name.to_string(), client_directive_script(name)))
        .collect()
}
