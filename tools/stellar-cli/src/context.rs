//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::StellarConfig;
use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["stellar.toml", ".stellar.toml", "stellar.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Project configuration.
    pub config: StellarConfig,
    /// Output handler.
    pub output: Output,
    /// Directory project paths are relative to.
    pub base_dir: PathBuf,
}

impl Context {
    /// Load context from a config file, or search upwards from the working directory.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, base_dir) = match config_path {
            Some(path) => {
                let config = StellarConfig::load(path)?;
                let base = Path::new(path)
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(|p| cwd.join(p))
                    .unwrap_or_else(|| cwd.clone());
                (config, base)
            }
            None => match Self::find_config(&cwd) {
                Some(found) => found,
                None => {
                    output.debug("No stellar config found, using defaults");
                    (StellarConfig::default(), cwd)
                }
            },
        };

        Ok(Self {
            config,
            output,
            base_dir,
        })
    }

    /// Find a config file in the directory tree, returning it with its directory.
    fn find_config(start: &Path) -> Option<(StellarConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = StellarConfig::load(config_path.to_str()?) {
                        return Some((config, current));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Project root.
    pub fn root(&self) -> PathBuf {
        self.config.root(&self.base_dir)
    }

    /// Project source directory.
    pub fn src_dir(&self) -> PathBuf {
        self.config.src_dir(&self.base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stellar.toml"), "[project]\nadapter = \"node\"\n").unwrap();
        let nested = dir.path().join("src").join("pages");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, base) = Context::find_config(&nested).unwrap();
        assert_eq!(config.project.adapter.as_deref(), Some("node"));
        assert_eq!(base, dir.path());
    }
}
