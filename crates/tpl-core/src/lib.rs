//! Template page controller
//!
//! Owns the lifecycle of one template's page-level data:
//! - Fetches the template by organization and name
//! - Fetches its active version, resources, versions, and DAU series concurrently
//! - Settles in `Loaded`, or `Failed` with the error that stopped it
//! - Runs the confirm-then-delete flow and notifies on success
//!
//! The machine in [`machine`] is pure and returns effects; the
//! [`TemplatePageController`] executes them against a [`tpl_client::TemplateApi`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tpl_client::{ClientConfig, HttpTemplateApi, TracingNotifier};
//! use tpl_core::{ControllerConfig, PageEvent, PageStatus, TemplatePageController};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(HttpTemplateApi::new(ClientConfig::new("https://dev.example.com"))?);
//! let mut page = TemplatePageController::new(
//!     api,
//!     Arc::new(TracingNotifier),
//!     "org1",
//!     "docker",
//!     &ControllerConfig::new(),
//! );
//!
//! if page.load().await? == PageStatus::Loaded {
//!     page.send(PageEvent::Delete).await?;
//!     page.send(PageEvent::ConfirmDelete).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod machine;
pub mod services;
pub mod state;

// Re-exports for convenience
pub use config::{ControllerConfig, DEFAULT_DELETE_SUCCESS_MESSAGE};
pub use context::TemplateViewState;
pub use controller::{PageSnapshot, TemplatePageController};
pub use error::ControllerError;
pub use machine::{Completion, Effect, Input, PageEvent, TemplateMachine};
pub use state::{DetailBranch, DetailProgress, FetchFailure, FetchStage, PageState, PageStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a template page
    pub use crate::{
        ControllerConfig, ControllerError, PageEvent, PageState, PageStatus,
        TemplatePageController, TemplateViewState,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
