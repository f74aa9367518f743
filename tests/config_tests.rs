//! Tests for the layered configuration system.

use std::sync::{Mutex, OnceLock};

use howdah::config::{ConfigFile, SessionConfig, TransportMode, DEFAULT_MODEL};
use pretty_assertions::assert_eq;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 5] = [
    "HOWDAH_MODEL",
    "HOWDAH_TRANSPORT",
    "HOWDAH_WORKDIR",
    "HOWDAH_MAX_TOKENS",
    "HOWDAH_TEMPERATURE",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_config_env() {
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
}

#[test]
fn layered_without_env_or_file_uses_built_in_defaults() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    let config = SessionConfig::layered(&ConfigFile::default());

    assert_eq!(config.model, DEFAULT_MODEL);
    assert_eq!(config.max_tokens, 4096);
    assert_eq!(config.temperature, 0.7);
    assert_eq!(config.transport, TransportMode::Direct);
    assert!(config.cli_path.is_none());
    assert!(config.base_url.is_none());
}

#[test]
fn file_defaults_apply_below_built_ins() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    let file = ConfigFile::parse(
        r#"
        [defaults]
        model = "gpt-4o"
        transport = "hosted-proxy"
        max-tokens = 2048

        [claude-code]
        cli-path = "/opt/claude"

        [toolkit]
        base-url = "https://gateway.test/v1"
        "#,
    )
    .unwrap();

    let config = SessionConfig::layered(&file);

    assert_eq!(config.model, "gpt-4o");
    assert_eq!(config.transport, TransportMode::HostedProxy);
    assert_eq!(config.max_tokens, 2048);
    // fields the file does not set keep their defaults
    assert_eq!(config.temperature, 0.7);
    assert_eq!(
        config.cli_path.as_deref(),
        Some(std::path::Path::new("/opt/claude"))
    );
    assert_eq!(config.base_url.as_deref(), Some("https://gateway.test/v1"));
}

#[test]
fn environment_overrides_file_defaults() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var("HOWDAH_MODEL", "env-model");
    std::env::set_var("HOWDAH_TRANSPORT", "direct");
    std::env::set_var("HOWDAH_MAX_TOKENS", "512");
    std::env::set_var("HOWDAH_TEMPERATURE", "0.0");

    let file = ConfigFile::parse(
        r#"
        [defaults]
        model = "file-model"
        transport = "hosted-proxy"
        max-tokens = 2048
        temperature = 0.9
        "#,
    )
    .unwrap();

    let config = SessionConfig::layered(&file);

    assert_eq!(config.model, "env-model");
    assert_eq!(config.transport, TransportMode::Direct);
    assert_eq!(config.max_tokens, 512);
    assert_eq!(config.temperature, 0.0);
}

#[test]
fn unparseable_env_values_fall_back_instead_of_failing() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var("HOWDAH_TRANSPORT", "smoke-signals");
    std::env::set_var("HOWDAH_MAX_TOKENS", "lots");

    let config = SessionConfig::layered(&ConfigFile::default());

    assert_eq!(config.transport, TransportMode::Direct);
    assert_eq!(config.max_tokens, 4096);
}

#[test]
fn workdir_env_is_applied() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var("HOWDAH_WORKDIR", "/srv/tasks");

    let config = SessionConfig::layered(&ConfigFile::default());

    assert_eq!(config.working_dir, std::path::PathBuf::from("/srv/tasks"));
}
