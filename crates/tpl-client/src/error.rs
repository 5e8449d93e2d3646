//! Error types for the template API client
//!
//! [`ApiError`] is `Clone` so a failure can be stored in view state and shown
//! next to the control that triggered it.

use std::path::PathBuf;
use tpl_sdk::Response;

/// Failure of a remote call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Server answered with a non-success status
    #[error("{body}")]
    Response {
        /// HTTP status code
        status: u16,
        /// Decoded error body
        body: Response,
    },

    /// Request never produced a response (network, DNS, TLS, ...)
    #[error("request failed: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server error with only a message
    #[inline]
    #[must_use]
    pub fn response(status: u16, message: impl Into<String>) -> Self {
        Self::Response {
            status,
            body: Response::message(message),
        }
    }

    /// HTTP status, when the server answered
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided detail, when present
    #[inline]
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Response { body, .. } => body.detail.as_deref(),
            _ => None,
        }
    }

    /// Check if the server reported the entity missing
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`ClientConfig`](crate::ClientConfig)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value failed validation
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// HTTP client could not be built
    #[error("http client: {0}")]
    Client(String),
}
