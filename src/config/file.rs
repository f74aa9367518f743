//! Optional TOML config file supplying file-level defaults.
//!
//! Located at the platform config dir (e.g. `~/.config/howdah/config.toml`):
//!
//! ```toml
//! [defaults]
//! model = "claude-sonnet-4-5-20250929"
//! transport = "hosted-proxy"
//!
//! [claude-code]
//! cli-path = "/usr/local/bin/claude"
//!
//! [toolkit]
//! base-url = "https://gateway.internal/v1"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::{HowdahError, Result};

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConfigFile {
    pub defaults: DefaultsSection,
    pub claude_code: ClaudeCodeSection,
    pub toolkit: ToolkitSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct DefaultsSection {
    pub model: Option<String>,
    pub transport: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClaudeCodeSection {
    pub cli_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolkitSection {
    pub base_url: Option<String>,
}

impl ConfigFile {
    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| HowdahError::Configuration(e.to_string()))
    }

    /// Read and parse `path`. Returns `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Platform default location for the config file.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "howdah")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from the default location; a missing or malformed file yields the
    /// empty config (malformed files are logged, not fatal).
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(Some(file)) => file,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                Self::default()
            }
        }
    }
}
