//! Controller configuration

use serde::{Deserialize, Serialize};

/// Message shown after a successful delete unless overridden
pub const DEFAULT_DELETE_SUCCESS_MESSAGE: &str = "Template successfully deleted.";

/// Template page controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Success notification text for a completed delete
    pub delete_success_message: String,
}

impl ControllerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With delete success message
    #[inline]
    #[must_use]
    pub fn with_delete_success_message(mut self, message: impl Into<String>) -> Self {
        self.delete_success_message = message.into();
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            delete_success_message: DEFAULT_DELETE_SUCCESS_MESSAGE.to_string(),
        }
    }
}
