//! One logical conversation against a backend.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backend::{collect_reply, create_backend, AgentBackend};
use crate::config::{BackendKind, SessionConfig, TransportMode};
use crate::error::{HowdahError, Result};
use crate::types::TokenUsage;

use super::transcript::{Exchange, Transcript};

enum SessionState {
    Ready(Box<dyn AgentBackend>),
    /// Terminal: the backend could not be initialized. The reason is kept so
    /// every subsequent send can fail fast with it.
    Failed(String),
}

/// A stateful conversation bound to one configured backend.
///
/// `send` takes `&mut self`, so at most one send is in flight per session;
/// independent sessions share no mutable state and may run concurrently.
pub struct Session {
    id: Uuid,
    name: String,
    kind: BackendKind,
    config: SessionConfig,
    state: SessionState,
    usage: TokenUsage,
    transcript: Transcript,
    created_at: DateTime<Utc>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("ready", &self.is_ready())
            .field("exchanges", &self.transcript.len())
            .finish()
    }
}

/// Metadata snapshot returned by [`Session::describe`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionDescription {
    pub session: String,
    pub backend: BackendKind,
    pub model: String,
    pub transport: TransportMode,
    pub working_dir: PathBuf,
    pub allowed_tools: Vec<String>,
    pub ready: bool,
    pub exchanges: usize,
    pub usage: TokenUsage,
}

impl Session {
    /// Open a session on the given backend.
    ///
    /// Config is validated once here. A missing required credential fails
    /// construction; any other backend initialization failure yields a
    /// session in the terminal failed state so the problem surfaces on use.
    pub fn connect(
        kind: BackendKind,
        config: SessionConfig,
        name: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        config.validate()?;

        info!(
            session = %name,
            backend = %kind,
            transport = %config.transport,
            model = %config.model,
            "opening session"
        );

        let state = match create_backend(kind, &config) {
            Ok(backend) => SessionState::Ready(backend),
            Err(e) if e.is_credential() => return Err(e),
            Err(e) => {
                warn!(session = %name, error = %e, "backend failed to initialize");
                SessionState::Failed(e.to_string())
            }
        };

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            kind,
            config,
            state,
            usage: TokenUsage::default(),
            transcript: Transcript::new(),
            created_at: Utc::now(),
        })
    }

    /// Send one message and return the reply text.
    ///
    /// The empty message is rejected before anything else, including the
    /// readiness check. On success the exchange is recorded and the session's
    /// cumulative counters are updated before returning.
    pub async fn send(&mut self, message: impl Into<String>) -> Result<String> {
        let message = message.into();
        if message.is_empty() {
            return Err(HowdahError::Validation("message cannot be empty".into()));
        }

        let backend = match &self.state {
            SessionState::Ready(backend) => backend.as_ref(),
            SessionState::Failed(reason) => {
                return Err(HowdahError::SessionNotReady(reason.clone()));
            }
        };

        debug!(session = %self.name, backend = backend.backend_id(), "sending message");

        let stream = match backend.run(&message).await {
            Ok(stream) => stream,
            Err(e) => {
                error!(session = %self.name, error = %e, "backend call failed");
                return Err(e);
            }
        };
        let reply = match collect_reply(stream, self.config.verbose).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(session = %self.name, error = %e, "backend stream failed");
                return Err(e);
            }
        };

        self.usage.merge(&reply.usage);
        self.transcript.push(Exchange {
            input: message,
            output: reply.text.clone(),
            usage: reply.usage,
            at: Utc::now(),
        });

        debug!(
            session = %self.name,
            input_tokens = reply.usage.input_tokens,
            output_tokens = reply.usage.output_tokens,
            "turn complete"
        );

        Ok(reply.text)
    }

    /// Describe the session. Pure: no counters or history are touched.
    pub fn describe(&self) -> SessionDescription {
        SessionDescription {
            session: self.name.clone(),
            backend: self.kind,
            model: self.config.model.clone(),
            transport: self.config.transport,
            working_dir: self.config.working_dir.clone(),
            allowed_tools: self.config.allowed_tools.clone(),
            ready: self.is_ready(),
            exchanges: self.transcript.len(),
            usage: self.usage,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    /// Why the session failed to initialize, if it did.
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            SessionState::Ready(_) => None,
            SessionState::Failed(reason) => Some(reason),
        }
    }

    /// Cumulative token usage across all completed sends.
    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
