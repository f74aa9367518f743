//! Convenience re-exports for common use.

pub use crate::backend::{AgentBackend, BackendEvent};
pub use crate::config::{BackendKind, SessionConfig, TransportMode};
pub use crate::error::{HowdahError, Result};
pub use crate::session::{Session, SessionDescription, SessionManager};
pub use crate::types::{AgentReply, TokenUsage};
