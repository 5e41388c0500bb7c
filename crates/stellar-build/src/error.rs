//! Build error types.

use thiserror::Error;

/// Failure of the host's module resolution.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Nothing exists at the requested location.
    #[error("Cannot find module '{0}'")]
    NotFound(String),

    /// The specifier cannot name a module at all.
    #[error("Invalid module specifier '{specifier}': {reason}")]
    Malformed { specifier: String, reason: String },

    /// The filesystem failed while probing candidates.
    #[error("Failed to resolve '{specifier}': {source}")]
    Io {
        specifier: String,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    /// Whether this is the "module absent" outcome rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors surfaced to the build orchestrator.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Delegated resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// An entry point resolved to nothing.
    #[error("Could not resolve entry module '{0}'")]
    Unresolved(String),

    /// A virtual module id reached the loader with no plugin to supply it.
    #[error("No plugin could load virtual module '{}'", .0.escape_default())]
    UnloadableVirtual(String),

    /// Reading a module from disk failed.
    #[error("Failed to read module '{id}': {source}")]
    Read {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguished() {
        assert!(ResolveError::NotFound("src/middleware".into()).is_not_found());
        assert!(!ResolveError::Malformed {
            specifier: "a\0b".into(),
            reason: "contains NUL".into(),
        }
        .is_not_found());
    }

    #[test]
    fn test_virtual_ids_are_escaped_in_messages() {
        let err = BuildError::UnloadableVirtual("\0virtual:thing".into());
        assert_eq!(err.to_string(), "No plugin could load virtual module '\\u{0}virtual:thing'");
    }
}
