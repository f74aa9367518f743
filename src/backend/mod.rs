//! Backend adapter trait and implementations.

pub mod event;

#[cfg(feature = "claude-code")]
pub mod claude_code;

#[cfg(feature = "toolkit")]
pub mod http;
#[cfg(feature = "toolkit")]
pub mod toolkit;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::{BackendKind, SessionConfig, TransportMode};
use crate::error::Result;

pub use event::{collect_reply, BackendEvent};

/// Stream of normalized events for one agent turn.
pub type EventStream = BoxStream<'static, Result<BackendEvent>>;

/// Core trait implemented by all backend adapters.
///
/// One instance wraps one configured backend; `run` performs a single agent
/// turn and yields the backend's events in normalized form.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Backend identifier (e.g., "claude-code").
    fn backend_id(&self) -> &str;
    /// The model ID this backend instance serves.
    fn model_id(&self) -> &str;
    /// How this instance reaches the backend.
    fn transport(&self) -> TransportMode;

    /// Run one agent turn for `prompt`.
    async fn run(&self, prompt: &str) -> Result<EventStream>;
}

/// Create a backend adapter for the given kind, using the provided config.
///
/// Credential requirements are checked here, before any transport is touched:
/// direct access without a usable credential fails with
/// [`HowdahError::Credential`](crate::error::HowdahError::Credential).
#[allow(unused_variables)]
pub fn create_backend(
    kind: BackendKind,
    config: &SessionConfig,
) -> Result<Box<dyn AgentBackend>> {
    match kind {
        #[cfg(feature = "claude-code")]
        BackendKind::ClaudeCode => Ok(Box::new(claude_code::ClaudeCodeBackend::new(config)?)),
        #[cfg(feature = "toolkit")]
        BackendKind::Toolkit => Ok(Box::new(toolkit::ToolkitBackend::new(config)?)),
        #[allow(unreachable_patterns)]
        _ => Err(crate::error::HowdahError::Configuration(format!(
            "backend '{kind}' not enabled via feature flags"
        ))),
    }
}
