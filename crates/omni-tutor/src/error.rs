//! Error taxonomy for a tutor turn.
//!
//! Two families reach the user:
//!
//! - [`ConfigError`]: something local is wrong (no API key, a style or
//!   subject outside the catalog). The turn halts before any network call
//!   and the session history is left untouched.
//! - [`RemoteError`]: the completion endpoint failed (transport, HTTP
//!   status, an error object or an unparseable chunk in the stream). The
//!   user message stays in history; no assistant message is appended.
//!
//! Neither is retried here.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TutorError>;

/// Local configuration problems, detected before a request is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "no API key found: set the {env_var} environment variable or add {env_var} to {}",
        secrets_path.display()
    )]
    MissingCredential {
        env_var: String,
        secrets_path: PathBuf,
    },

    #[error("failed to read secrets file {}: {message}", path.display())]
    SecretsFile { path: PathBuf, message: String },

    #[error("unknown teaching style: {0:?}")]
    UnknownStyle(String),

    #[error("unknown subject: {0:?}")]
    UnknownSubject(String),

    #[error("invalid completion endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Failures reported by, or while talking to, the completion endpoint.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to completion endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion endpoint HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion endpoint error: {0}")]
    Api(String),

    #[error("malformed streaming response: {0}")]
    MalformedStream(String),
}

/// Any failure of a tutor turn.
#[derive(Debug, Error)]
pub enum TutorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl TutorError {
    /// Stable, machine-readable category for UI shells.
    pub fn kind(&self) -> &'static str {
        match self {
            TutorError::Config(_) => "configuration",
            TutorError::Remote(_) => "remote_service",
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, TutorError::Config(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, TutorError::Remote(_))
    }
}
