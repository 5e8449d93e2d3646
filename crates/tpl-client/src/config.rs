//! Client configuration
//!
//! Resolved in layers: defaults, then an optional TOML file, then the
//! environment, then explicit builder calls.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`ClientConfig::base_url`]
pub const ENV_URL: &str = "TPL_URL";

/// Environment variable overriding [`ClientConfig::session_token`]
pub const ENV_SESSION_TOKEN: &str = "TPL_SESSION_TOKEN";

/// Connection settings for a platform deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Deployment root, e.g. `https://dev.example.com`
    pub base_url: String,
    /// Session token sent with every request
    pub session_token: Option<String>,
    /// Per-request transport timeout in seconds, unbounded when absent
    pub timeout_secs: Option<u64>,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl ClientConfig {
    /// Default configuration pointed at `base_url`
    #[inline]
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// With session token
    #[inline]
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// With transport timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// With user agent
    #[inline]
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Parse from TOML text; missing keys keep their defaults
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML or unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` on malformed TOML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Overlay values from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(url) = get(ENV_URL) {
            self.base_url = url;
        }
        if let Some(token) = get(ENV_SESSION_TOKEN) {
            self.session_token = Some(token);
        }
        self
    }

    /// Transport timeout as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// - `ConfigError::Invalid` for an empty or non-HTTP base URL, a zero
    ///   timeout, or an empty session token
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: format!("expected an http(s) URL, got {url:?}"),
            });
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        if self.session_token.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Invalid {
                field: "session_token",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            session_token: None,
            timeout_secs: None,
            user_agent: format!("tplctl/{}", crate::VERSION),
        }
    }
}
