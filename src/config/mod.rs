//! Session configuration (layered: explicit > env > config file > built-in default).

pub mod file;

pub use file::ConfigFile;

use std::path::PathBuf;

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::error::{HowdahError, Result};

/// Model used when the caller specifies none.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Region used for hosted-proxy access when none is configured.
pub const DEFAULT_REGION: &str = "us-west-2";

/// Credential variable for direct claude-code access.
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
/// Credential variable for direct toolkit access.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Region variable consulted in hosted-proxy mode.
pub const ENV_AWS_REGION: &str = "AWS_DEFAULT_REGION";
/// Gateway endpoint for the toolkit backend in hosted-proxy mode.
pub const ENV_TOOLKIT_GATEWAY_URL: &str = "TOOLKIT_GATEWAY_URL";

/// How the backend is reached.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TransportMode {
    /// Vendor API reached with an explicit credential.
    #[default]
    Direct,
    /// Managed access path (Bedrock, gateway); ambient credentials.
    HostedProxy,
}

/// Which backend adapter a session is built on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BackendKind {
    ClaudeCode,
    Toolkit,
}

fn default_allowed_tools() -> Vec<String> {
    [
        "Read",
        "Write",
        "Edit",
        "Bash",
        "Glob",
        "Grep",
        "WebSearch",
        "WebFetch",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Options recognized when opening a session. Read once at connect time and
/// never mutated afterward; the session keeps its own copy.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Model identifier forwarded to the backend.
    #[builder(into, default = DEFAULT_MODEL.to_string())]
    pub model: String,

    /// Response token budget.
    #[builder(default = 4096)]
    pub max_tokens: u32,

    /// Sampling temperature, 0.0–1.0.
    #[builder(default = 0.7)]
    pub temperature: f64,

    /// Forward backend event detail to the log.
    #[builder(default)]
    pub verbose: bool,

    #[builder(default)]
    pub transport: TransportMode,

    /// Capability names the backend may invoke, in order.
    #[builder(default = default_allowed_tools())]
    pub allowed_tools: Vec<String>,

    /// Directory the backend operates in.
    #[builder(default = default_working_dir())]
    pub working_dir: PathBuf,

    /// Region override, hosted-proxy only.
    pub region: Option<String>,

    /// Credential, direct only. Falls back to the backend's env variable.
    /// Never serialized.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// Endpoint override for the toolkit backend.
    pub base_url: Option<String>,

    /// Binary override for the claude-code backend.
    pub cli_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SessionConfig {
    /// Load configuration from the environment, layered over the config file.
    ///
    /// Reads a `.env` file if present, then `HOWDAH_MODEL`,
    /// `HOWDAH_TRANSPORT`, `HOWDAH_WORKDIR`, `HOWDAH_MAX_TOKENS`,
    /// `HOWDAH_TEMPERATURE`. Credentials are not resolved here; each backend
    /// consults its own variable at connect time.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::layered(&ConfigFile::load_default())
    }

    /// Build a config from `file` defaults with env overrides on top.
    pub fn layered(file: &ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(ref model) = file.defaults.model {
            config.model = model.clone();
        }
        if let Some(ref transport) = file.defaults.transport {
            match transport.parse() {
                Ok(t) => config.transport = t,
                Err(_) => warn!(value = %transport, "ignoring unrecognized transport in config file"),
            }
        }
        if let Some(max_tokens) = file.defaults.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = file.defaults.temperature {
            config.temperature = temperature;
        }
        config.cli_path = file.claude_code.cli_path.clone();
        config.base_url = file.toolkit.base_url.clone();

        if let Ok(model) = std::env::var("HOWDAH_MODEL") {
            config.model = model;
        }
        if let Ok(transport) = std::env::var("HOWDAH_TRANSPORT") {
            match transport.parse() {
                Ok(t) => config.transport = t,
                Err(_) => warn!(value = %transport, "ignoring unrecognized HOWDAH_TRANSPORT"),
            }
        }
        if let Ok(dir) = std::env::var("HOWDAH_WORKDIR") {
            config.working_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = std::env::var("HOWDAH_MAX_TOKENS") {
            match raw.parse() {
                Ok(v) => config.max_tokens = v,
                Err(_) => warn!(value = %raw, "ignoring unparseable HOWDAH_MAX_TOKENS"),
            }
        }
        if let Ok(raw) = std::env::var("HOWDAH_TEMPERATURE") {
            match raw.parse() {
                Ok(v) => config.temperature = v,
                Err(_) => warn!(value = %raw, "ignoring unparseable HOWDAH_TEMPERATURE"),
            }
        }

        config
    }

    /// Validate option ranges. Called once when a session is opened.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(HowdahError::Validation(format!(
                "temperature must be within 0.0–1.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(HowdahError::Validation(
                "max_tokens must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SessionConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.transport, TransportMode::Direct);
        assert!(config.allowed_tools.contains(&"Bash".to_string()));
        assert_eq!(config.allowed_tools.len(), 8);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn builder_overrides_selected_fields() {
        let config = SessionConfig::builder()
            .model("claude-opus-4")
            .transport(TransportMode::HostedProxy)
            .region("eu-central-1".to_string())
            .build();
        assert_eq!(config.model, "claude-opus-4");
        assert_eq!(config.transport, TransportMode::HostedProxy);
        assert_eq!(config.region.as_deref(), Some("eu-central-1"));
        // untouched fields keep their defaults
        assert_eq!(config.max_tokens, 4096);
    }

    #[test]
    fn validate_rejects_out_of_range_temperature() {
        let config = SessionConfig::builder().temperature(1.5).build();
        assert!(matches!(
            config.validate(),
            Err(HowdahError::Validation(_))
        ));

        let config = SessionConfig::builder().temperature(-0.1).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_max_tokens() {
        let config = SessionConfig::builder().max_tokens(0).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn transport_mode_round_trips_through_strings() {
        assert_eq!(
            "hosted-proxy".parse::<TransportMode>().unwrap(),
            TransportMode::HostedProxy
        );
        assert_eq!(TransportMode::Direct.to_string(), "direct");
        assert!("bedrock".parse::<TransportMode>().is_err());
    }

    #[test]
    fn backend_kind_round_trips_through_strings() {
        assert_eq!(
            "claude-code".parse::<BackendKind>().unwrap(),
            BackendKind::ClaudeCode
        );
        assert_eq!(BackendKind::Toolkit.to_string(), "toolkit");
    }
}
