//! Runtime mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether the process is serving a dev server or a built site.
///
/// Governs route cache invalidation and error verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Dev server: routes may change on disk between requests.
    #[default]
    Development,
    /// Built output: routes are immutable.
    Production,
}

impl RuntimeMode {
    /// Check if this is development mode.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is production mode.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Lowercase name as used in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown runtime mode '{0}' (expected 'development' or 'production')")]
pub struct ParseModeError(pub String);

impl FromStr for RuntimeMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}
