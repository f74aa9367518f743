//! Howdah — uniform sessions over conversational-agent backends.
//!
//! Normalizes heterogeneous agent backends (the Claude Code CLI, an
//! OpenAI-compatible agent service) behind one request/response contract:
//! open a session against a configured backend, then send task prompts and
//! read back reply text and token usage.
//!
//! # Quick Start
//!
//! ```no_run
//! use howdah::prelude::*;
//!
//! # async fn example() -> howdah::error::Result<()> {
//! let config = SessionConfig::from_env();
//! let mut session = Session::connect(BackendKind::ClaudeCode, config, "default-session")?;
//! let reply = session.send("Summarize the README in this directory").await?;
//! println!("{reply}");
//! println!("{:?}", session.usage());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod prelude;
pub mod session;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
