//! Error types for envview sessions

use envview_document::PatchError;
use envview_engine::{EngineError, OverrideError, PatchGenError};
use std::path::PathBuf;

/// Errors from a document session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Another override round trip is in flight
    #[error("session busy: an override is already being applied")]
    Busy,

    /// Override rejected by the engine
    #[error("override rejected: {0}")]
    Override(#[from] OverrideError),

    /// Patch could not be generated
    #[error("patch generation failed: {0}")]
    Patch(#[from] PatchGenError),

    /// Host failed to read, patch or save
    #[error("host error: {0}")]
    Host(#[from] HostError),
}

impl SessionError {
    /// Check if retrying later may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy | Self::Host(HostError::Patch(PatchError::BaseMismatch { .. })))
    }
}

impl From<EngineError> for SessionError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Override(e) => Self::Override(e),
            EngineError::Patch(e) => Self::Patch(e),
        }
    }
}

/// Errors reported by a [`DocumentHost`](crate::DocumentHost)
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Patch could not be applied to the host's buffer
    #[error("patch rejected: {0}")]
    Patch(#[from] PatchError),

    /// Underlying I/O failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Host-specific failure
    #[error("{0}")]
    Other(String),
}

/// Errors loading a [`SessionConfig`](crate::SessionConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid TOML for the schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
