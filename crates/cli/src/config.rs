//! `canvass.toml` configuration.
//!
//! ```toml
//! [storage]
//! catalog_path = "data/survey_questions.json"
//! submissions_path = "data/survey_submissions.jsonl"
//!
//! [server]
//! port = 8080
//! rate_limit = 60
//! ```
//!
//! Every section and key is optional. Relative storage paths are resolved
//! against a base directory chosen once at load time: `--data-dir` if given,
//! else the directory holding the config file, else the directory the
//! command was started from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding `server.rate_limit`.
pub(crate) const RATE_LIMIT_ENV: &str = "CANVASS_RATE_LIMIT";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("could not read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) storage: StorageConfig,
    pub(crate) server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StorageConfig {
    pub(crate) catalog_path: PathBuf,
    pub(crate) submissions_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            catalog_path: PathBuf::from("data/survey_questions.json"),
            submissions_path: PathBuf::from("data/survey_submissions.jsonl"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ServerConfig {
    pub(crate) port: u16,
    /// Requests per minute per client IP.
    pub(crate) rate_limit: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 8080,
            rate_limit: 60,
        }
    }
}

impl Config {
    /// Load `path` (or defaults when `None`) and resolve storage paths.
    pub(crate) fn load(path: Option<&Path>, data_dir: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => Config::default(),
        };

        let base = match (data_dir, path.and_then(Path::parent)) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(parent)) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
        };
        config.resolve_paths(&base);
        config.apply_env(std::env::var(RATE_LIMIT_ENV).ok().as_deref());
        Ok(config)
    }

    fn read(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn resolve_paths(&mut self, base: &Path) {
        for p in [
            &mut self.storage.catalog_path,
            &mut self.storage.submissions_path,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }

    fn apply_env(&mut self, rate_limit: Option<&str>) {
        if let Some(limit) = rate_limit.and_then(|v| v.parse::<u64>().ok()) {
            self.server.rate_limit = limit;
        }
    }
}
