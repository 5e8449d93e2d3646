//! Error body returned by the platform API

use serde::{Deserialize, Serialize};

/// Standard error response body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Short, user-facing message
    pub message: String,
    /// Additional detail, usually the underlying error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Per-field validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<Vec<ValidationError>>,
}

impl Response {
    /// Response carrying only a message
    #[inline]
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// With detail
    #[inline]
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Validation failures, empty when none
    #[inline]
    #[must_use]
    pub fn validations(&self) -> &[ValidationError] {
        self.validations.as_deref().unwrap_or_default()
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validation failure for one request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Offending field
    pub field: String,
    /// Why it was rejected
    pub detail: String,
}
