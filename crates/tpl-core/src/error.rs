//! Error types for the template page controller
//!
//! API failures never surface here: fetch failures become the `Failed` state
//! and delete failures are stored in the view state. What remains is wiring
//! mistakes and cancellation.

/// Controller error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// A template-keyed call was made before the template was fetched
    #[error("template not loaded")]
    TemplateNotLoaded,

    /// Work was abandoned because the cancellation token fired
    #[error("operation cancelled")]
    Cancelled,
}

impl ControllerError {
    /// Check if the error indicates incorrect wiring rather than a runtime condition
    #[inline]
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::TemplateNotLoaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(ControllerError::TemplateNotLoaded.is_programming_error());
        assert!(!ControllerError::Cancelled.is_programming_error());
    }

    #[test]
    fn display() {
        assert_eq!(ControllerError::TemplateNotLoaded.to_string(), "template not loaded");
        assert_eq!(ControllerError::Cancelled.to_string(), "operation cancelled");
    }
}
