//! Error types for Howdah.

use thiserror::Error;

/// Primary error type for all Howdah operations.
#[derive(Error, Debug)]
pub enum HowdahError {
    #[error("Missing credential: {0}")]
    Credential(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session not ready: {0}")]
    SessionNotReady(String),

    #[error("Connection error ({backend}): {message}")]
    Connection {
        backend: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Backend error ({backend}): {message}")]
    Sdk { backend: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HowdahError {
    /// Create a connection error without an underlying source.
    pub fn connection(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            backend: backend.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error wrapping an underlying transport failure.
    pub fn connection_with_source(
        backend: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            backend: backend.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a backend-reported (SDK) error.
    pub fn sdk(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sdk {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Whether this error indicates a missing or rejected credential.
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::Credential(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, HowdahError>;
