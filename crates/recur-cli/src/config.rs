//! Configuration loading.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Occurrence cap for `expand` when `--limit` is not given.
    pub default_limit: usize,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_limit: 100,
            pretty: true,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, `<config dir>/recur/config.toml`, the
    /// given file, then `RECUR_*` environment variables.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("RECUR_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for recur.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("recur"))
}
