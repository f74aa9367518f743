//! CLI surface for the launcher binary.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{BackendKind, SessionConfig};
use crate::error::{HowdahError, Result};

/// Howdah agent session launcher
#[derive(Parser, Debug)]
#[command(name = "howdah", version, about = "Howdah — agent session launcher")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Forward one prompt to a backend and print the reply
    Send(SendArgs),
    /// Run a directory-based task (solve inputs, write results to an output dir)
    Task(TaskArgs),
}

/// Options shared by every command that opens a session.
#[derive(Parser, Debug)]
pub struct ConnectionArgs {
    /// Backend to use (claude-code, toolkit); defaults to HOWDAH_BACKEND
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// Transport mode (direct, hosted-proxy)
    #[arg(long)]
    pub transport: Option<String>,

    /// Region override (hosted-proxy only)
    #[arg(long)]
    pub region: Option<String>,

    /// Working directory for the backend
    #[arg(short = 'C', long)]
    pub workdir: Option<PathBuf>,

    /// Allow a tool (repeatable; replaces the default tool set)
    #[arg(long = "tool")]
    pub tools: Vec<String>,

    /// Response token budget
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0–1.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Session name used in logs and tracking
    #[arg(long, default_value = "default-session")]
    pub session: String,

    /// Log backend events at info level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments for `howdah send`.
#[derive(Parser, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Task prompt
    pub prompt: String,
}

/// Arguments for `howdah task`.
#[derive(Parser, Debug)]
pub struct TaskArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Directory holding the task inputs (never modified)
    #[arg(short, long)]
    pub input_dir: PathBuf,

    /// Directory for temporary and result files (created if missing)
    #[arg(short, long)]
    pub output_dir: PathBuf,
}

/// Resolve the backend kind: flag, then `HOWDAH_BACKEND`, then claude-code.
pub fn resolve_backend(args: &ConnectionArgs) -> Result<BackendKind> {
    let raw = args
        .backend
        .clone()
        .or_else(|| std::env::var("HOWDAH_BACKEND").ok())
        .unwrap_or_else(|| "claude-code".to_string());
    raw.parse()
        .map_err(|_| HowdahError::Configuration(format!("unknown backend '{raw}'")))
}

/// Build the session config: environment layers first, flags on top.
pub fn build_config(args: &ConnectionArgs) -> Result<SessionConfig> {
    let mut config = SessionConfig::from_env();

    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(ref transport) = args.transport {
        config.transport = transport
            .parse()
            .map_err(|_| HowdahError::Configuration(format!("unknown transport '{transport}'")))?;
    }
    if let Some(ref region) = args.region {
        config.region = Some(region.clone());
    }
    if let Some(ref workdir) = args.workdir {
        config.working_dir = workdir.clone();
    }
    if !args.tools.is_empty() {
        config.allowed_tools = args.tools.clone();
    }
    if let Some(max_tokens) = args.max_tokens {
        config.max_tokens = max_tokens;
    }
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    config.verbose = args.verbose;

    Ok(config)
}

/// Compose the prompt for a directory-based task.
pub fn task_prompt(input_dir: &Path, output_dir: &Path) -> String {
    format!(
        "Solve the task described in folder {input}. \
         Do not modify any files in {input}. \
         All temporary or saved files should be located somewhere under {output}. \
         Save the final results to {output}; the result file name should be \"results\", \
         with the same format and extension as the task's test data file.",
        input = input_dir.display(),
        output = output_dir.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportMode;

    fn bare_args() -> ConnectionArgs {
        ConnectionArgs {
            backend: None,
            model: None,
            transport: None,
            region: None,
            workdir: None,
            tools: Vec::new(),
            max_tokens: None,
            temperature: None,
            session: "default-session".into(),
            verbose: false,
        }
    }

    #[test]
    fn flags_override_environment_layers() {
        let mut args = bare_args();
        args.model = Some("gpt-4o".into());
        args.transport = Some("hosted-proxy".into());
        args.tools = vec!["Read".into(), "Bash".into()];
        args.max_tokens = Some(1024);

        let config = build_config(&args).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.transport, TransportMode::HostedProxy);
        assert_eq!(config.allowed_tools, vec!["Read", "Bash"]);
        assert_eq!(config.max_tokens, 1024);
    }

    #[test]
    fn unknown_transport_flag_is_a_configuration_error() {
        let mut args = bare_args();
        args.transport = Some("carrier-pigeon".into());
        assert!(matches!(
            build_config(&args),
            Err(HowdahError::Configuration(_))
        ));
    }

    #[test]
    fn explicit_backend_flag_wins() {
        let mut args = bare_args();
        args.backend = Some("toolkit".into());
        assert_eq!(resolve_backend(&args).unwrap(), BackendKind::Toolkit);

        args.backend = Some("nonsense".into());
        assert!(resolve_backend(&args).is_err());
    }

    #[test]
    fn task_prompt_names_both_directories() {
        let prompt = task_prompt(Path::new("/data/in"), Path::new("/data/out"));
        assert!(prompt.contains("/data/in"));
        assert!(prompt.contains("/data/out"));
        assert!(prompt.contains("\"results\""));
    }
}
