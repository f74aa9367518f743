//! The normalized response value produced by a backend turn.

use serde::{Deserialize, Serialize};

use super::usage::TokenUsage;

/// Final outcome of one agent turn: the reply text plus any token usage the
/// backend reported. The text may be empty and the usage may be zero when the
/// backend's event stream carried neither.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AgentReply {
    pub text: String,
    pub usage: TokenUsage,
}

impl AgentReply {
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}
