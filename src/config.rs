//! Application configuration
//!
//! Read from a TOML file, then overridden by environment variables:
//!
//! ```toml
//! database_path = "prompt_builder.db"
//! plugins_dir = "plugins"
//! log_filter = "prompt_builder=debug"
//!
//! [defaults]
//! include_tree = true
//! global_ignore = ".git, target"
//! ```
//!
//! Environment overrides: `PROMPT_BUILDER_DB`, `PROMPT_BUILDER_PLUGINS` and
//! `RUST_LOG`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::document::{DocumentSettings, DEFAULT_GLOBAL_IGNORE};
use crate::store::DEFAULT_DB_PATH;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "prompt-builder.toml";
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";
pub const DEFAULT_LOG_FILTER: &str = "prompt_builder=info";

pub const ENV_DB: &str = "PROMPT_BUILDER_DB";
pub const ENV_PLUGINS: &str = "PROMPT_BUILDER_PLUGINS";
pub const ENV_LOG: &str = "RUST_LOG";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings given to newly created documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentDefaults {
    pub include_tree: bool,
    pub global_ignore: String,
}

impl Default for DocumentDefaults {
    fn default() -> Self {
        Self {
            include_tree: false,
            global_ignore: DEFAULT_GLOBAL_IGNORE.to_string(),
        }
    }
}

impl DocumentDefaults {
    pub fn to_settings(&self) -> DocumentSettings {
        DocumentSettings {
            include_tree: self.include_tree,
            global_ignore: self.global_ignore.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub plugins_dir: PathBuf,
    pub log_filter: String,
    pub defaults: DocumentDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            plugins_dir: PathBuf::from(DEFAULT_PLUGINS_DIR),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            defaults: DocumentDefaults::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(source: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the config file
    ///
    /// An explicit path must exist. Without one, `prompt-builder.toml` in the
    /// working directory is used when present and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    debug!("no config file; using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let source = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&source, &path)
    }

    /// Apply overrides from the process environment
    pub fn with_env(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; empty values are ignored
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(db) = get(ENV_DB) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(plugins) = get(ENV_PLUGINS) {
            self.plugins_dir = PathBuf::from(plugins);
        }
        if let Some(filter) = get(ENV_LOG) {
            self.log_filter = filter;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            "plugins_dir = \"/opt/kinds\"\n[defaults]\ninclude_tree = true\n",
            Path::new("t.toml"),
        )
        .unwrap();
        assert_eq!(config.plugins_dir, PathBuf::from("/opt/kinds"));
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DB_PATH));
        assert!(config.defaults.include_tree);
        assert_eq!(config.defaults.global_ignore, DEFAULT_GLOBAL_IGNORE);
    }

    #[test]
    fn test_malformed_file() {
        let err = AppConfig::from_toml_str("database_path = [", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = AppConfig::load(Some(Path::new("/no/such/prompt-builder.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        fs::write(&path, "database_path = \"x.db\"\n").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("x.db"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DB, "/data/p.db"),
            (ENV_PLUGINS, ""),
            (ENV_LOG, "prompt_builder=trace"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::default().with_env_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.database_path, PathBuf::from("/data/p.db"));
        assert_eq!(config.plugins_dir, PathBuf::from(DEFAULT_PLUGINS_DIR));
        assert_eq!(config.log_filter, "prompt_builder=trace");
    }

    #[test]
    fn test_defaults_to_settings() {
        let settings = DocumentDefaults::default().to_settings();
        assert_eq!(settings, DocumentSettings::default());
    }
}
