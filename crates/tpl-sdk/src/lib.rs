//! Template API entity model
//!
//! Serde mirrors of the JSON entities the template page moves around:
//! - **Template**: a named, versioned workspace blueprint
//! - **TemplateVersion**: an immutable snapshot of a template's definition
//! - **WorkspaceResource**: infrastructure produced by provisioning a version
//! - **TemplateDausResponse**: daily-active-user series for a template
//! - **Response**: the platform's error body
//!
//! # Example
//!
//! ```rust
//! use tpl_sdk::Template;
//!
//! let json = r#"{
//!     "id": "t1",
//!     "created_at": "2022-07-01T00:00:00Z",
//!     "updated_at": "2022-07-01T00:00:00Z",
//!     "organization_id": "org1",
//!     "name": "docker",
//!     "provisioner": "terraform",
//!     "active_version_id": "v1",
//!     "workspace_owner_count": 2,
//!     "description": "",
//!     "icon": "",
//!     "max_ttl_ms": 0,
//!     "min_autostart_interval_ms": 0,
//!     "created_by_id": "u1",
//!     "created_by_name": "admin"
//! }"#;
//!
//! let template: Template = serde_json::from_str(json).unwrap();
//! assert_eq!(template.active_version_id, "v1");
//! ```

#![warn(missing_docs)]

pub mod resource;
pub mod response;
pub mod template;

// Re-exports
pub use resource::{
    DerpRegion, WorkspaceAgent, WorkspaceAgentStatus, WorkspaceApp, WorkspaceResource,
    WorkspaceResourceMetadata, WorkspaceTransition,
};
pub use response::{Response, ValidationError};
pub use template::{
    DauEntry, ProvisionerJob, ProvisionerJobStatus, ProvisionerType, Template,
    TemplateDausResponse, TemplateVersion,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
