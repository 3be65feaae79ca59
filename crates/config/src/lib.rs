//! Configuration loading and validation.
//!
//! Sources are layered, later ones overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A TOML file: the path given on the command line, otherwise
//!    `config.toml` in the platform config directory (if it exists).
//! 3. Environment variables prefixed with `LIBRIS_`, using `__` to reach
//!    nested keys (`LIBRIS_CHAT__ENDPOINT=http://...`).
//!
//! ```toml
//! [chat]
//! endpoint = "http://localhost:8000/chat"
//! timeout_secs = 120
//!
//! [[catalog.seed]]
//! title = "The Great Gatsby"
//! creator = "F. Scott Fitzgerald"
//! identifier = "1234567890"
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use libris_catalog::Entry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "LIBRIS_";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/chat";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chat: ChatConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// URL the chat request is `POST`ed to.
    pub endpoint: String,
    /// Deadline for one complete reply; `0` disables it.
    pub timeout_secs: u64,
}
impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
impl ChatConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Entries loaded into a fresh catalog at startup.
    pub seed: Vec<Entry>,
}

/// Platform config file location, e.g. `~/.config/libris/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "libris").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Load from defaults, a TOML file, and the environment.
    ///
    /// An explicit `path` must exist; the platform default is skipped when
    /// missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
                }
                tracing::debug!(path = %path.display(), "Loading configuration file");
                figment = figment.merge(Toml::file(path));
            },
            None => {
                if let Some(path) = default_path().filter(|p| p.is_file()) {
                    tracing::debug!(path = %path.display(), "Loading default configuration file");
                    figment = figment.merge(Toml::file(path));
                }
            },
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and [`validate`](Self::validate) from an assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chat.endpoint.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("chat.endpoint must not be empty".to_string()));
        }
        let mut seen = HashSet::new();
        for entry in &self.catalog.seed {
            let identifier = entry.identifier.trim();
            if identifier.is_empty() {
                exn::bail!(ErrorKind::Invalid(format!("catalog seed {:?} has no identifier", entry.title)));
            }
            if !seen.insert(identifier) {
                exn::bail!(ErrorKind::Invalid(format!("catalog seed identifier {identifier:?} is duplicated")));
            }
        }
        Ok(())
    }
}
