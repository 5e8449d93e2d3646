//! Template API client
//!
//! The collaborator surface the template page controller is written against:
//! - [`TemplateApi`]: one async method per remote call
//! - [`Notifier`]: fire-and-forget success messages
//! - [`HttpTemplateApi`]: `reqwest` binding to the platform's `/api/v2` routes
//! - [`ClientConfig`]: deployment URL, session token, transport settings
//!
//! # Example
//!
//! ```rust,ignore
//! use tpl_client::{ClientConfig, HttpTemplateApi, TemplateApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://dev.example.com").with_session_token("s3cr3t");
//! let api = HttpTemplateApi::new(config)?;
//!
//! let template = api.fetch_template("org1", "docker").await?;
//! let versions = api.fetch_template_versions(&template).await?;
//! println!("{} has {} versions", template.name, versions.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod notify;

// Re-exports for convenience
pub use api::TemplateApi;
pub use config::{ClientConfig, ENV_SESSION_TOKEN, ENV_URL};
pub use error::{ApiError, ConfigError};
pub use http::{HttpTemplateApi, SESSION_TOKEN_HEADER};
pub use notify::{Notifier, TracingNotifier};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
