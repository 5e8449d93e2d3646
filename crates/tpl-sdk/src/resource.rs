//! Workspace resources produced by provisioning a template version

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Infrastructure object (compute, storage, ...) declared by a template version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceResource {
    /// Server-assigned identifier
    pub id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Provisioner job that produced the resource
    pub job_id: String,
    /// Build transition the resource exists for
    pub workspace_transition: WorkspaceTransition,
    /// Provider resource type, e.g. `docker_container`
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource name from the template source
    pub name: String,
    /// Agents running on this resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<WorkspaceAgent>>,
    /// Key/value metadata attached by the template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<WorkspaceResourceMetadata>>,
}

impl WorkspaceResource {
    /// Agents on this resource, empty when none are declared
    #[inline]
    #[must_use]
    pub fn agents(&self) -> &[WorkspaceAgent] {
        self.agents.as_deref().unwrap_or_default()
    }

    /// Metadata entries safe to display
    pub fn visible_metadata(&self) -> impl Iterator<Item = &WorkspaceResourceMetadata> {
        self.metadata
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|m| !m.sensitive)
    }
}

/// Workspace build transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceTransition {
    /// Workspace started
    #[default]
    Start,
    /// Workspace stopped
    Stop,
    /// Workspace deleted
    Delete,
}

/// Agent process running inside a workspace resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceAgent {
    /// Server-assigned identifier
    pub id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// First successful connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_connected_at: Option<DateTime<Utc>>,
    /// Most recent connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_connected_at: Option<DateTime<Utc>>,
    /// Most recent disconnection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disconnected_at: Option<DateTime<Utc>>,
    /// Connection status
    pub status: WorkspaceAgentStatus,
    /// Agent name
    pub name: String,
    /// Resource hosting the agent
    pub resource_id: String,
    /// Cloud instance identity, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    /// CPU architecture
    pub architecture: String,
    /// Environment passed to the agent
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    /// Operating system
    pub operating_system: String,
    /// Script run on agent start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_script: Option<String>,
    /// Working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    /// Agent build version
    pub version: String,
    /// Applications exposed through the agent
    #[serde(default)]
    pub apps: Vec<WorkspaceApp>,
    /// Relay latency by region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<HashMap<String, DerpRegion>>,
}

/// Agent connection status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceAgentStatus {
    /// Waiting for the first connection
    #[default]
    Connecting,
    /// Connected
    Connected,
    /// Connection lost
    Disconnected,
}

/// Application exposed through an agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceApp {
    /// Server-assigned identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Command launched for the app
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Icon URL or path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Relay region latency sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerpRegion {
    /// Whether the agent prefers this region
    pub preferred: bool,
    /// Round-trip latency in milliseconds
    pub latency_ms: f64,
}

/// Key/value metadata attached to a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceResourceMetadata {
    /// Key
    pub key: String,
    /// Value
    pub value: String,
    /// Whether the value must be hidden from display
    pub sensitive: bool,
}
