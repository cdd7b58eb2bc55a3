//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Values resolve in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Workspace config file (`trellis.toml` in the workspace root)
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$TRELLIS_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/trellis/config.toml` (via the platform config dir)
//! 3. `~/.trellis/config.toml`

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::paths::WorkspacePaths;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a config file.
    #[error("config i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// TOML parse error.
    #[error("config parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings accepted at both global and workspace scope.
///
/// # Example
///
/// ```toml
/// strict = true
/// json = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Treat warnings as blocking in transactions.
    pub strict: Option<bool>,

    /// Default to JSON output.
    pub json: Option<bool>,
}

/// Resolved configuration with precedence applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    global: ConfigFile,
    workspace: ConfigFile,
}

impl Config {
    /// Load configuration for a workspace root (global scope only when
    /// `root` is `None`). A missing file at either scope is simply an
    /// empty layer.
    pub fn load(root: Option<&Path>) -> Result<Self, ConfigError> {
        let global = match global_config_path() {
            Some(path) => read_layer(&path)?,
            None => ConfigFile::default(),
        };
        let workspace = match root {
            Some(root) => read_layer(&WorkspacePaths::new(root).config_path())?,
            None => ConfigFile::default(),
        };
        Ok(Self { global, workspace })
    }

    /// Whether strict mode is on by default.
    pub fn strict(&self) -> bool {
        self.workspace
            .strict
            .or(self.global.strict)
            .unwrap_or(false)
    }

    /// Whether JSON output is on by default.
    pub fn json(&self) -> bool {
        self.workspace.json.or(self.global.json).unwrap_or(false)
    }
}

fn read_layer(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the global config path, if any scope exists for it.
fn global_config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("TRELLIS_CONFIG") {
        return Some(PathBuf::from(explicit));
    }
    if let Some(config_dir) = dirs::config_dir() {
        let candidate = config_dir.join("trellis").join("config.toml");
        if candidate.exists() {
            return Some(candidate);
        }
    }
    dirs::home_dir().map(|home| home.join(".trellis").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_layer_overrides_global() {
        let config = Config {
            global: ConfigFile {
                strict: Some(false),
                json: Some(true),
            },
            workspace: ConfigFile {
                strict: Some(true),
                json: None,
            },
        };
        assert!(config.strict());
        assert!(config.json());
    }

    #[test]
    fn defaults_are_off() {
        let config = Config::default();
        assert!(!config.strict());
        assert!(!config.json());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = toml::from_str::<ConfigFile>("unknown = 1\n");
        assert!(err.is_err());
    }

    #[test]
    fn workspace_layer_reads_trellis_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("trellis.toml"), "strict = true\n").unwrap();
        let config = Config::load(Some(dir.path())).unwrap();
        assert!(config.strict());
    }
}
