//! Claude Code CLI backend.
//!
//! Spawns the `claude` binary per turn with `--output-format stream-json` and
//! decodes its line-delimited event stream. Credentials, region, and the
//! transport-mode flag are injected into the child process environment only;
//! the parent environment is never written.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_stream::{wrappers::LinesStream, StreamExt};
use tracing::debug;

use crate::config::{
    SessionConfig, TransportMode, DEFAULT_REGION, ENV_ANTHROPIC_API_KEY, ENV_AWS_REGION,
};
use crate::error::{HowdahError, Result};
use crate::types::TokenUsage;

use super::{AgentBackend, BackendEvent, EventStream};

pub const BACKEND_ID: &str = "claude-code";

const CLI_BINARY: &str = "claude";

/// Backend adapter over the Claude Code CLI.
pub struct ClaudeCodeBackend {
    model: String,
    transport: TransportMode,
    api_key: Option<String>,
    region: Option<String>,
    allowed_tools: Vec<String>,
    working_dir: PathBuf,
    max_tokens: u32,
    cli_path: PathBuf,
}

impl ClaudeCodeBackend {
    /// Build the adapter from config.
    ///
    /// Direct transport requires an API key (config field or
    /// `ANTHROPIC_API_KEY`); hosted-proxy transport requires none and resolves
    /// a region instead. The credential check runs before the binary lookup so
    /// a missing secret surfaces as a credential error, not an install error.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let (api_key, region) = match config.transport {
            TransportMode::Direct => {
                let key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var(ENV_ANTHROPIC_API_KEY).ok())
                    .ok_or_else(|| {
                        HowdahError::Credential(format!(
                            "{ENV_ANTHROPIC_API_KEY} must be set or api_key supplied for direct access"
                        ))
                    })?;
                (Some(key), None)
            }
            TransportMode::HostedProxy => {
                let region = config
                    .region
                    .clone()
                    .or_else(|| std::env::var(ENV_AWS_REGION).ok())
                    .unwrap_or_else(|| DEFAULT_REGION.to_string());
                debug!(%region, "claude-code hosted-proxy access");
                (None, Some(region))
            }
        };

        let cli_path = resolve_cli(config.cli_path.as_deref())?;

        Ok(Self {
            model: config.model.clone(),
            transport: config.transport,
            api_key,
            region,
            allowed_tools: config.allowed_tools.clone(),
            working_dir: config.working_dir.clone(),
            max_tokens: config.max_tokens,
            cli_path,
        })
    }
}

#[async_trait]
impl AgentBackend for ClaudeCodeBackend {
    fn backend_id(&self) -> &str {
        BACKEND_ID
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn transport(&self) -> TransportMode {
        self.transport
    }

    async fn run(&self, prompt: &str) -> Result<EventStream> {
        let mut cmd = Command::new(&self.cli_path);
        cmd.arg("-p")
            .arg(prompt)
            .arg("--output-format")
            .arg("stream-json")
            .arg("--verbose")
            .arg("--permission-mode")
            .arg("bypassPermissions")
            .arg("--model")
            .arg(&self.model);
        if !self.allowed_tools.is_empty() {
            cmd.arg("--allowedTools").arg(self.allowed_tools.join(","));
        }
        cmd.current_dir(&self.working_dir);
        // Model override and token budget are scoped to this child process.
        cmd.env("ANTHROPIC_MODEL", &self.model);
        cmd.env("CLAUDE_CODE_MAX_OUTPUT_TOKENS", self.max_tokens.to_string());
        match self.transport {
            TransportMode::Direct => {
                if let Some(ref key) = self.api_key {
                    cmd.env(ENV_ANTHROPIC_API_KEY, key);
                }
            }
            TransportMode::HostedProxy => {
                cmd.env("CLAUDE_CODE_USE_BEDROCK", "1");
                if let Some(ref region) = self.region {
                    cmd.env(ENV_AWS_REGION, region);
                }
            }
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(model = %self.model, cli = %self.cli_path.display(), "spawning claude-code turn");

        let mut child = cmd.spawn().map_err(|e| {
            HowdahError::connection_with_source(BACKEND_ID, "failed to spawn CLI", e)
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            HowdahError::connection(BACKEND_ID, "CLI spawned without a stdout pipe")
        })?;
        let stderr = child.stderr.take();

        let stream = async_stream::stream! {
            let mut lines = LinesStream::new(BufReader::new(stdout).lines());
            while let Some(line) = lines.next().await {
                match line {
                    Ok(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        yield Ok(decode_line(line));
                    }
                    Err(e) => {
                        yield Err(HowdahError::connection_with_source(
                            BACKEND_ID,
                            "error reading CLI stream",
                            e,
                        ));
                        return;
                    }
                }
            }

            let mut detail = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut detail).await;
            }
            match child.wait().await {
                Ok(status) if status.success() => {}
                Ok(status) => {
                    yield Err(HowdahError::sdk(
                        BACKEND_ID,
                        format!("CLI exited with {status}: {}", detail.trim()),
                    ));
                }
                Err(e) => {
                    yield Err(HowdahError::connection_with_source(
                        BACKEND_ID,
                        "failed waiting for CLI",
                        e,
                    ));
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Resolve the CLI binary: explicit override first, then `PATH`.
fn resolve_cli(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(HowdahError::sdk(
            BACKEND_ID,
            format!("configured CLI path does not exist: {}", path.display()),
        ));
    }

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(CLI_BINARY);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(HowdahError::sdk(
        BACKEND_ID,
        format!("'{CLI_BINARY}' not found on PATH; install the Claude Code CLI"),
    ))
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    System {
        #[serde(default)]
        session_id: Option<String>,
    },
    Assistant {
        message: WireAssistantMessage,
    },
    Result {
        #[serde(default)]
        result: Option<String>,
        #[serde(default)]
        usage: Option<WireUsage>,
    },
}

#[derive(Deserialize)]
struct WireAssistantMessage {
    #[serde(default)]
    content: Vec<WireContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Decode one stream-json line into a normalized event.
///
/// Lines the typed decoder does not recognize (tool progress, user frames,
/// malformed output) become `Other` and are dropped by the fold.
fn decode_line(line: &str) -> BackendEvent {
    match serde_json::from_str::<WireEvent>(line) {
        Ok(WireEvent::System { session_id }) => BackendEvent::Started { session_id },
        Ok(WireEvent::Assistant { message }) => {
            let text: Vec<&str> = message
                .content
                .iter()
                .filter_map(|block| match block {
                    WireContentBlock::Text { text } => Some(text.as_str()),
                    WireContentBlock::Other => None,
                })
                .collect();
            if text.is_empty() {
                BackendEvent::Other {
                    kind: "assistant".into(),
                }
            } else {
                BackendEvent::Content {
                    text: text.join("\n"),
                }
            }
        }
        Ok(WireEvent::Result { result, usage }) => BackendEvent::Result {
            text: result,
            usage: usage.map(|u| TokenUsage::new(u.input_tokens, u.output_tokens)),
        },
        Err(_) => {
            let kind = serde_json::from_str::<serde_json::Value>(line)
                .ok()
                .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(String::from))
                .unwrap_or_else(|| "undecodable".into());
            BackendEvent::Other { kind }
        }
    }
}
